use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::followup::{FollowupDraft, FollowupPriority, UpdateFollowup};
use crate::domain::types::{Confidence, ContactId, EmailId, EmailSubject, SanitizedText};
use crate::forms::{FormError, non_blank, parse_datetime};

#[derive(Debug, Deserialize)]
pub struct FollowupForm {
    pub subject: String,
    #[serde(default)]
    pub notes: Option<String>,
    /// Defaults to the owner's follow-up delay when omitted.
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub contact_id: Option<i32>,
    #[serde(default)]
    pub email_id: Option<i32>,
}

pub struct FollowupPayload {
    pub subject: EmailSubject,
    pub notes: Option<String>,
    pub due_at: Option<NaiveDateTime>,
    pub priority: FollowupPriority,
    pub contact_id: Option<ContactId>,
    pub email_id: Option<EmailId>,
}

fn parse_priority(raw: Option<String>) -> Result<FollowupPriority, FormError> {
    non_blank(raw)
        .map(|p| p.parse::<FollowupPriority>())
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|err| FormError::field("priority", err))
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    non_blank(notes).map(|n| ammonia::clean(&n))
}

impl TryFrom<FollowupForm> for FollowupPayload {
    type Error = FormError;

    fn try_from(form: FollowupForm) -> Result<Self, Self::Error> {
        Ok(Self {
            subject: EmailSubject::new(form.subject)
                .map_err(|err| FormError::field("subject", err))?,
            notes: clean_notes(form.notes),
            due_at: non_blank(form.due_at)
                .map(|raw| parse_datetime(&raw))
                .transpose()?,
            priority: parse_priority(form.priority)?,
            contact_id: form
                .contact_id
                .map(ContactId::new)
                .transpose()
                .map_err(|err| FormError::field("contact_id", err))?,
            email_id: form
                .email_id
                .map(EmailId::new)
                .transpose()
                .map_err(|err| FormError::field("email_id", err))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFollowupForm {
    pub subject: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub due_at: String,
    #[serde(default)]
    pub priority: Option<String>,
}

impl TryFrom<UpdateFollowupForm> for UpdateFollowup {
    type Error = FormError;

    fn try_from(form: UpdateFollowupForm) -> Result<Self, Self::Error> {
        Ok(Self {
            subject: EmailSubject::new(form.subject)
                .map_err(|err| FormError::field("subject", err))?,
            notes: clean_notes(form.notes),
            priority: parse_priority(form.priority)?,
            due_at: parse_datetime(&form.due_at)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SnoozeForm {
    pub until: String,
}

impl SnoozeForm {
    pub fn until(&self) -> Result<NaiveDateTime, FormError> {
        parse_datetime(&self.until)
    }
}

/// Draft produced by the external assistant.
#[derive(Debug, Deserialize)]
pub struct DraftForm {
    pub body: String,
    pub confidence: f64,
}

impl TryFrom<DraftForm> for FollowupDraft {
    type Error = FormError;

    fn try_from(form: DraftForm) -> Result<Self, Self::Error> {
        Ok(Self {
            body: SanitizedText::new(form.body).map_err(|err| FormError::field("body", err))?,
            confidence: Confidence::new(form.confidence)
                .map_err(|err| FormError::field("confidence", err))?,
        })
    }
}
