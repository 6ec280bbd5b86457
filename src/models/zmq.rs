//! Messages exchanged with the mail sync and notification services over ZeroMQ.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::email::{EmailDirection, NewEmail};
use crate::domain::types::{
    EmailAccountId, EmailAddress, MessageId, OrganizationId, TypeConstraintError,
};

/// Email observed by a sync service, also accepted by `POST /api/v1/emails`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ZmqEmailMessage {
    pub organization_id: i32,
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
    pub sent_at: NaiveDateTime,
}

impl TryFrom<ZmqEmailMessage> for NewEmail {
    type Error = TypeConstraintError;

    fn try_from(msg: ZmqEmailMessage) -> Result<Self, Self::Error> {
        let to_addresses = msg
            .to
            .into_iter()
            .map(EmailAddress::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(NewEmail {
            organization_id: OrganizationId::new(msg.organization_id)?,
            email_account_id: EmailAccountId::new(msg.email_account_id)?,
            contact_id: None,
            message_id: MessageId::new(msg.message_id)?,
            thread_id: msg.thread_id.filter(|t| !t.trim().is_empty()),
            direction: msg.direction.trim().to_lowercase().parse::<EmailDirection>()?,
            subject: msg.subject.filter(|s| !s.trim().is_empty()),
            from_address: EmailAddress::new(msg.from)?,
            to_addresses,
            snippet: msg.snippet.map(|s| ammonia::clean(&s)),
            sent_at: msg.sent_at,
        })
    }
}

/// Requests published by the follow-up worker.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ZmqNotification {
    Reminder {
        organization_id: i32,
        user_id: String,
        followup_id: i32,
        subject: String,
        due_at: NaiveDateTime,
    },
    AutoReply {
        organization_id: i32,
        user_id: String,
        followup_id: i32,
        to: Option<String>,
        subject: String,
        body: String,
    },
    SyncRequest {
        organization_id: i32,
        email_account_id: i32,
        email: String,
        provider: String,
    },
}

impl ZmqNotification {
    /// Subscription topic prefix for the message.
    pub fn topic(&self) -> &'static str {
        match self {
            ZmqNotification::Reminder { .. } => "reminder",
            ZmqNotification::AutoReply { .. } => "auto_reply",
            ZmqNotification::SyncRequest { .. } => "sync",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_message_accepts_minimal_payload() {
        let raw = r#"{
            "organization_id": 1,
            "email_account_id": 2,
            "message_id": "<a@b>",
            "direction": "inbound",
            "from": "client@example.com",
            "sent_at": "2026-03-10T10:00:00"
        }"#;
        let msg: ZmqEmailMessage = serde_json::from_str(raw).unwrap();
        assert!(msg.to.is_empty());
        assert_eq!(msg.thread_id, None);

        let email = NewEmail::try_from(msg).unwrap();
        assert_eq!(email.direction, EmailDirection::Inbound);
        assert_eq!(email.counterparts()[0].as_str(), "client@example.com");
    }

    #[test]
    fn notifications_are_tagged() {
        let msg = ZmqNotification::SyncRequest {
            organization_id: 1,
            email_account_id: 2,
            email: "me@example.com".to_string(),
            provider: "gmail".to_string(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "sync_request");
        assert_eq!(msg.topic(), "sync");
    }
}
