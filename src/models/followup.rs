//! Diesel models for follow-ups.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::followup::{
    Followup as DomainFollowup, FollowupDraft, NewFollowup as DomainNewFollowup,
    UpdateFollowup as DomainUpdateFollowup,
};
use crate::domain::types::{
    Confidence, ContactId, EmailId, EmailSubject, FollowupId, OrganizationId, SanitizedText,
    TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::followups)]
pub struct Followup {
    pub id: i32,
    pub organization_id: i32,
    pub owner_user_id: String,
    pub contact_id: Option<i32>,
    pub email_id: Option<i32>,
    pub subject: String,
    pub notes: Option<String>,
    pub due_at: NaiveDateTime,
    pub priority: String,
    pub state: String,
    pub completion_reason: Option<String>,
    pub snooze_count: i32,
    pub reminded_at: Option<NaiveDateTime>,
    pub draft_body: Option<String>,
    pub draft_confidence: Option<f64>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::followups)]
pub struct NewFollowup<'a> {
    pub organization_id: i32,
    pub owner_user_id: &'a str,
    pub contact_id: Option<i32>,
    pub email_id: Option<i32>,
    pub subject: &'a str,
    pub notes: Option<&'a str>,
    pub due_at: NaiveDateTime,
    pub priority: &'a str,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::followups)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateFollowup<'a> {
    pub subject: &'a str,
    pub notes: Option<&'a str>,
    pub priority: &'a str,
    pub due_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Full lifecycle snapshot written back after a state transition.
#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::followups)]
#[diesel(treat_none_as_null = true)]
pub struct FollowupLifecycle<'a> {
    pub due_at: NaiveDateTime,
    pub state: &'a str,
    pub completion_reason: Option<&'a str>,
    pub snooze_count: i32,
    pub reminded_at: Option<NaiveDateTime>,
    pub draft_body: Option<&'a str>,
    pub draft_confidence: Option<f64>,
    pub completed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Followup> for DomainFollowup {
    type Error = TypeConstraintError;

    fn try_from(row: Followup) -> Result<Self, Self::Error> {
        let draft = match (row.draft_body, row.draft_confidence) {
            (Some(body), Some(confidence)) => Some(FollowupDraft {
                body: SanitizedText::new(body)?,
                confidence: Confidence::new(confidence)?,
            }),
            _ => None,
        };
        Ok(Self {
            id: FollowupId::new(row.id)?,
            organization_id: OrganizationId::new(row.organization_id)?,
            owner_user_id: UserId::new(row.owner_user_id)?,
            contact_id: row.contact_id.map(ContactId::new).transpose()?,
            email_id: row.email_id.map(EmailId::new).transpose()?,
            subject: EmailSubject::new(row.subject)?,
            notes: row.notes,
            due_at: row.due_at,
            priority: row.priority.parse()?,
            state: row.state.parse()?,
            completion_reason: row
                .completion_reason
                .map(|reason| reason.parse())
                .transpose()?,
            snooze_count: row.snooze_count,
            reminded_at: row.reminded_at,
            draft,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewFollowup> for NewFollowup<'a> {
    fn from(followup: &'a DomainNewFollowup) -> Self {
        Self {
            organization_id: followup.organization_id.get(),
            owner_user_id: followup.owner_user_id.as_str(),
            contact_id: followup.contact_id.map(ContactId::get),
            email_id: followup.email_id.map(EmailId::get),
            subject: followup.subject.as_str(),
            notes: followup.notes.as_deref(),
            due_at: followup.due_at,
            priority: followup.priority.as_str(),
        }
    }
}

impl<'a> UpdateFollowup<'a> {
    pub fn new(followup: &'a DomainUpdateFollowup, now: NaiveDateTime) -> Self {
        Self {
            subject: followup.subject.as_str(),
            notes: followup.notes.as_deref(),
            priority: followup.priority.as_str(),
            due_at: followup.due_at,
            updated_at: now,
        }
    }
}

impl<'a> From<&'a DomainFollowup> for FollowupLifecycle<'a> {
    fn from(followup: &'a DomainFollowup) -> Self {
        Self {
            due_at: followup.due_at,
            state: followup.state.as_str(),
            completion_reason: followup.completion_reason.as_ref().map(|r| r.as_str()),
            snooze_count: followup.snooze_count,
            reminded_at: followup.reminded_at,
            draft_body: followup.draft.as_ref().map(|d| d.body.as_str()),
            draft_confidence: followup.draft.as_ref().map(|d| d.confidence.get()),
            completed_at: followup.completed_at,
            updated_at: followup.updated_at,
        }
    }
}
