//! Transparency records for automated actions and assistant memories.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::followup::Followup;
use crate::domain::types::{
    ActivityId, Confidence, MemoryId, OrganizationId, SanitizedText, TypeConstraintError, UserId,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    FollowupCreated,
    FollowupAutoCompleted,
    DraftGenerated,
    ReminderSent,
    AutoReplySent,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::FollowupCreated => "followup_created",
            ActivityKind::FollowupAutoCompleted => "followup_auto_completed",
            ActivityKind::DraftGenerated => "draft_generated",
            ActivityKind::ReminderSent => "reminder_sent",
            ActivityKind::AutoReplySent => "auto_reply_sent",
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "followup_created" => Ok(ActivityKind::FollowupCreated),
            "followup_auto_completed" => Ok(ActivityKind::FollowupAutoCompleted),
            "draft_generated" => Ok(ActivityKind::DraftGenerated),
            "reminder_sent" => Ok(ActivityKind::ReminderSent),
            "auto_reply_sent" => Ok(ActivityKind::AutoReplySent),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown activity kind `{other}`"
            ))),
        }
    }
}

/// Timeline entry describing something done on the user's behalf.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AiActivity {
    pub id: ActivityId,
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub kind: ActivityKind,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub summary: String,
    pub confidence: Option<Confidence>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAiActivity {
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub kind: ActivityKind,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub summary: String,
    pub confidence: Option<Confidence>,
}

impl NewAiActivity {
    /// Activity about a follow-up record.
    #[must_use]
    pub fn for_followup(
        organization_id: OrganizationId,
        user_id: Option<UserId>,
        kind: ActivityKind,
        followup_id: i32,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            organization_id,
            user_id,
            kind,
            entity_type: "followup".to_string(),
            entity_id: Some(followup_id),
            summary: summary.into(),
            confidence: None,
        }
    }

    /// Follow-up opened after an outgoing email.
    pub fn followup_scheduled(followup: &Followup) -> Self {
        Self::for_followup(
            followup.organization_id,
            Some(followup.owner_user_id.clone()),
            ActivityKind::FollowupCreated,
            followup.id.get(),
            format!(
                "Follow-up \"{}\" scheduled for {} after an outgoing email",
                followup.subject,
                followup.due_at.format("%Y-%m-%d %H:%M")
            ),
        )
    }

    /// Follow-up closed because the contact replied.
    pub fn followup_replied(followup: &Followup) -> Self {
        Self::for_followup(
            followup.organization_id,
            Some(followup.owner_user_id.clone()),
            ActivityKind::FollowupAutoCompleted,
            followup.id.get(),
            format!("Follow-up \"{}\" closed after a reply", followup.subject),
        )
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: Confidence) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// Fact the assistant keeps about a user's work.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AiMemory {
    pub id: MemoryId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub content: SanitizedText,
    pub source: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewAiMemory {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub content: SanitizedText,
    pub source: Option<String>,
}
