use serde::Deserialize;

use crate::domain::email::{EmailDirection, NewEmail};
use crate::domain::types::{EmailAccountId, EmailAddress, MessageId, OrganizationId};
use crate::forms::{FormError, non_blank, parse_datetime};

/// Email reported by a client or the mail sync service.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEmailForm {
    pub email_account_id: i32,
    pub message_id: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    pub direction: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub from: String,
    #[serde(default)]
    pub to: Vec<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    pub sent_at: String,
}

impl RecordEmailForm {
    /// Builds the email record; the contact link is resolved later.
    pub fn into_domain(self, organization_id: OrganizationId) -> Result<NewEmail, FormError> {
        let to_addresses = self
            .to
            .into_iter()
            .map(EmailAddress::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| FormError::InvalidEmail)?;

        Ok(NewEmail {
            organization_id,
            email_account_id: EmailAccountId::new(self.email_account_id)
                .map_err(|err| FormError::field("email_account_id", err))?,
            contact_id: None,
            message_id: MessageId::new(self.message_id)
                .map_err(|err| FormError::field("message_id", err))?,
            thread_id: non_blank(self.thread_id),
            direction: self
                .direction
                .trim()
                .to_lowercase()
                .parse::<EmailDirection>()
                .map_err(|err| FormError::field("direction", err))?,
            subject: non_blank(self.subject),
            from_address: EmailAddress::new(self.from).map_err(|_| FormError::InvalidEmail)?,
            to_addresses,
            snippet: non_blank(self.snippet).map(|s| ammonia::clean(&s)),
            sent_at: parse_datetime(&self.sent_at)?,
        })
    }
}
