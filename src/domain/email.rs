//! Ledger of sent and received emails used for follow-up detection.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::followup::{Followup, NewFollowup};
use crate::domain::types::{
    ContactId, EmailAccountId, EmailAddress, EmailId, MessageId, OrganizationId,
    TypeConstraintError,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailDirection {
    Inbound,
    Outbound,
}

impl EmailDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailDirection::Inbound => "inbound",
            EmailDirection::Outbound => "outbound",
        }
    }
}

impl Display for EmailDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailDirection {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(EmailDirection::Inbound),
            "outbound" => Ok(EmailDirection::Outbound),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown direction `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Email {
    pub id: EmailId,
    pub organization_id: OrganizationId,
    pub email_account_id: EmailAccountId,
    pub contact_id: Option<ContactId>,
    pub message_id: MessageId,
    pub thread_id: Option<String>,
    pub direction: EmailDirection,
    pub subject: Option<String>,
    pub from_address: EmailAddress,
    pub to_addresses: Vec<EmailAddress>,
    pub snippet: Option<String>,
    pub sent_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewEmail {
    pub organization_id: OrganizationId,
    pub email_account_id: EmailAccountId,
    pub contact_id: Option<ContactId>,
    pub message_id: MessageId,
    pub thread_id: Option<String>,
    pub direction: EmailDirection,
    pub subject: Option<String>,
    pub from_address: EmailAddress,
    pub to_addresses: Vec<EmailAddress>,
    pub snippet: Option<String>,
    pub sent_at: NaiveDateTime,
}

impl NewEmail {
    /// Addresses on the other side of the conversation.
    pub fn counterparts(&self) -> Vec<&EmailAddress> {
        match self.direction {
            EmailDirection::Outbound => self.to_addresses.iter().collect(),
            EmailDirection::Inbound => vec![&self.from_address],
        }
    }
}

/// Follow-up change written in the same transaction as a new email.
#[derive(Clone, Debug, PartialEq)]
pub enum FollowupDetection {
    /// Nothing to change for this email.
    Skip,
    /// Opens the follow-up, linked to the stored email.
    Open(NewFollowup),
    /// Completes every open follow-up of the thread because the contact replied.
    CloseThread {
        thread_id: String,
        replied_at: NaiveDateTime,
    },
}

/// Rows written while recording one email.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedChanges {
    pub email: Email,
    pub opened: Vec<Followup>,
    pub completed: Vec<Followup>,
}

/// Joins recipients for storage in a single text column.
pub fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(EmailAddress::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses a stored recipient list, rejecting malformed entries.
pub fn split_addresses(raw: &str) -> Result<Vec<EmailAddress>, TypeConstraintError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(EmailAddress::new)
        .collect()
}
