use serde::Serialize;

use crate::domain::email::Email;

/// Outcome of recording one email.
#[derive(Debug, Default, Serialize)]
pub struct RecordedEmail {
    /// `false` when the message id was already recorded for the account.
    pub inserted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    pub followups_created: usize,
    pub followups_completed: usize,
}
