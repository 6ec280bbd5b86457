//! Follow-up reminders attached to outgoing conversations.
//!
//! A follow-up is stored with one of three lifecycle states (`open`,
//! `completed`, `cancelled`). The status shown to users adds time-derived
//! stages for open records: `pending` until the due window starts, `due`
//! inside the window and `overdue` once `due_at` has passed.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::preferences::UserPreferences;
use crate::domain::types::{
    Confidence, ContactId, EmailId, EmailSubject, FollowupId, OrganizationId, SanitizedText,
    TypeConstraintError, UserId,
};

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        "unknown {} `{other}`",
                        stringify!($name)
                    ))),
                }
            }
        }
    };
}

#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum FollowupPriority {
    Low,
    #[default]
    Normal,
    High,
}

string_enum!(FollowupPriority { Low => "low", Normal => "normal", High => "high" });

/// Persisted lifecycle state.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FollowupState {
    Open,
    Completed,
    Cancelled,
}

string_enum!(FollowupState {
    Open => "open",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    Manual,
    Replied,
    AutoReplied,
}

string_enum!(CompletionReason {
    Manual => "manual",
    Replied => "replied",
    AutoReplied => "auto_replied",
});

/// Status presented to users, derived from the state and the clock.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FollowupStatus {
    Pending,
    Due,
    Overdue,
    Completed,
    Cancelled,
}

string_enum!(FollowupStatus {
    Pending => "pending",
    Due => "due",
    Overdue => "overdue",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl FollowupStatus {
    pub const ALL: [FollowupStatus; 5] = [
        FollowupStatus::Pending,
        FollowupStatus::Due,
        FollowupStatus::Overdue,
        FollowupStatus::Completed,
        FollowupStatus::Cancelled,
    ];

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            FollowupStatus::Pending | FollowupStatus::Due | FollowupStatus::Overdue
        )
    }
}

/// Derives the user-facing status.
///
/// `due_window` is how long before `due_at` a follow-up counts as due.
pub fn derive_status(
    state: FollowupState,
    due_at: NaiveDateTime,
    now: NaiveDateTime,
    due_window: Duration,
) -> FollowupStatus {
    match state {
        FollowupState::Completed => FollowupStatus::Completed,
        FollowupState::Cancelled => FollowupStatus::Cancelled,
        FollowupState::Open if due_at < now => FollowupStatus::Overdue,
        FollowupState::Open if due_at <= now + due_window => FollowupStatus::Due,
        FollowupState::Open => FollowupStatus::Pending,
    }
}

/// Errors raised by lifecycle transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FollowupError {
    #[error("follow-up is already {0}")]
    Closed(FollowupState),
    #[error("follow-up is already open")]
    AlreadyOpen,
    #[error("snooze target must be in the future")]
    SnoozeInPast,
}

/// AI-generated reply proposal attached to a follow-up.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FollowupDraft {
    pub body: SanitizedText,
    pub confidence: Confidence,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Followup {
    pub id: FollowupId,
    pub organization_id: OrganizationId,
    pub owner_user_id: UserId,
    pub contact_id: Option<ContactId>,
    pub email_id: Option<EmailId>,
    pub subject: EmailSubject,
    pub notes: Option<String>,
    pub due_at: NaiveDateTime,
    pub priority: FollowupPriority,
    pub state: FollowupState,
    pub completion_reason: Option<CompletionReason>,
    pub snooze_count: i32,
    pub reminded_at: Option<NaiveDateTime>,
    pub draft: Option<FollowupDraft>,
    pub completed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Followup {
    pub fn is_open(&self) -> bool {
        self.state == FollowupState::Open
    }

    pub fn status_at(&self, now: NaiveDateTime, due_window: Duration) -> FollowupStatus {
        derive_status(self.state, self.due_at, now, due_window)
    }

    /// Open follow-ups that entered the due window and were not reminded yet.
    pub fn needs_reminder(&self, now: NaiveDateTime, due_window: Duration) -> bool {
        self.reminded_at.is_none()
            && matches!(
                self.status_at(now, due_window),
                FollowupStatus::Due | FollowupStatus::Overdue
            )
    }

    /// Whether the attached draft may be sent without a human in the loop.
    pub fn is_auto_reply_eligible(&self, now: NaiveDateTime, prefs: &UserPreferences) -> bool {
        if !prefs.auto_reply_enabled || !prefs.ai_drafts_enabled {
            return false;
        }
        let Some(draft) = &self.draft else {
            return false;
        };
        draft.confidence >= prefs.auto_reply_threshold
            && matches!(
                self.status_at(now, prefs.due_window()),
                FollowupStatus::Due | FollowupStatus::Overdue
            )
    }

    fn ensure_open(&self) -> Result<(), FollowupError> {
        match self.state {
            FollowupState::Open => Ok(()),
            closed => Err(FollowupError::Closed(closed)),
        }
    }

    pub fn complete(
        &mut self,
        reason: CompletionReason,
        now: NaiveDateTime,
    ) -> Result<(), FollowupError> {
        self.ensure_open()?;
        self.state = FollowupState::Completed;
        self.completion_reason = Some(reason);
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: NaiveDateTime) -> Result<(), FollowupError> {
        self.ensure_open()?;
        self.state = FollowupState::Cancelled;
        self.completion_reason = None;
        self.completed_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn reopen(&mut self, now: NaiveDateTime) -> Result<(), FollowupError> {
        if self.is_open() {
            return Err(FollowupError::AlreadyOpen);
        }
        self.state = FollowupState::Open;
        self.completion_reason = None;
        self.completed_at = None;
        self.reminded_at = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn snooze(&mut self, until: NaiveDateTime, now: NaiveDateTime) -> Result<(), FollowupError> {
        self.ensure_open()?;
        if until <= now {
            return Err(FollowupError::SnoozeInPast);
        }
        self.due_at = until;
        self.snooze_count += 1;
        self.reminded_at = None;
        self.updated_at = now;
        Ok(())
    }

    pub fn attach_draft(
        &mut self,
        draft: FollowupDraft,
        now: NaiveDateTime,
    ) -> Result<(), FollowupError> {
        self.ensure_open()?;
        self.draft = Some(draft);
        self.updated_at = now;
        Ok(())
    }

    pub fn mark_reminded(&mut self, now: NaiveDateTime) {
        self.reminded_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewFollowup {
    pub organization_id: OrganizationId,
    pub owner_user_id: UserId,
    pub contact_id: Option<ContactId>,
    pub email_id: Option<EmailId>,
    pub subject: EmailSubject,
    pub notes: Option<String>,
    pub due_at: NaiveDateTime,
    pub priority: FollowupPriority,
}

/// Editable content of a follow-up; lifecycle changes go through [`Followup`].
#[derive(Clone, Debug, PartialEq)]
pub struct UpdateFollowup {
    pub subject: EmailSubject,
    pub notes: Option<String>,
    pub priority: FollowupPriority,
    pub due_at: NaiveDateTime,
}

/// Number of follow-ups per derived status.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct StatusSummary {
    pub pending: usize,
    pub due: usize,
    pub overdue: usize,
    pub completed: usize,
    pub cancelled: usize,
}

impl StatusSummary {
    pub fn record(&mut self, status: FollowupStatus) {
        match status {
            FollowupStatus::Pending => self.pending += 1,
            FollowupStatus::Due => self.due += 1,
            FollowupStatus::Overdue => self.overdue += 1,
            FollowupStatus::Completed => self.completed += 1,
            FollowupStatus::Cancelled => self.cancelled += 1,
        }
    }

    pub fn open(&self) -> usize {
        self.pending + self.due + self.overdue
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    pub(crate) fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub(crate) fn sample_followup(due_at: NaiveDateTime) -> Followup {
        let now = Utc::now().naive_utc();
        Followup {
            id: FollowupId::new(1).unwrap(),
            organization_id: OrganizationId::new(1).unwrap(),
            owner_user_id: UserId::new("owner").unwrap(),
            contact_id: None,
            email_id: None,
            subject: EmailSubject::new("Quote").unwrap(),
            notes: None,
            due_at,
            priority: FollowupPriority::Normal,
            state: FollowupState::Open,
            completion_reason: None,
            snooze_count: 0,
            reminded_at: None,
            draft: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_follows_the_clock_for_open_records() {
        let window = Duration::hours(4);
        let now = at(10);

        assert_eq!(
            derive_status(FollowupState::Open, at(20), now, window),
            FollowupStatus::Pending
        );
        assert_eq!(
            derive_status(FollowupState::Open, at(14), now, window),
            FollowupStatus::Due
        );
        assert_eq!(
            derive_status(FollowupState::Open, at(10), now, window),
            FollowupStatus::Due
        );
        assert_eq!(
            derive_status(FollowupState::Open, at(9), now, window),
            FollowupStatus::Overdue
        );
    }

    #[test]
    fn terminal_states_ignore_the_clock() {
        let window = Duration::hours(4);
        assert_eq!(
            derive_status(FollowupState::Completed, at(1), at(10), window),
            FollowupStatus::Completed
        );
        assert_eq!(
            derive_status(FollowupState::Cancelled, at(20), at(10), window),
            FollowupStatus::Cancelled
        );
    }

    #[test]
    fn closed_followups_reject_transitions() {
        let mut followup = sample_followup(at(12));
        followup.complete(CompletionReason::Manual, at(10)).unwrap();
        assert_eq!(followup.completion_reason, Some(CompletionReason::Manual));

        assert_eq!(
            followup.cancel(at(11)),
            Err(FollowupError::Closed(FollowupState::Completed))
        );
        assert_eq!(
            followup.snooze(at(20), at(11)),
            Err(FollowupError::Closed(FollowupState::Completed))
        );

        followup.reopen(at(11)).unwrap();
        assert!(followup.is_open());
        assert_eq!(followup.completed_at, None);
        assert_eq!(followup.reopen(at(11)), Err(FollowupError::AlreadyOpen));
    }

    #[test]
    fn snooze_moves_due_date_and_resets_reminder() {
        let mut followup = sample_followup(at(9));
        followup.mark_reminded(at(9));

        assert_eq!(
            followup.snooze(at(8), at(10)),
            Err(FollowupError::SnoozeInPast)
        );

        followup.snooze(at(18), at(10)).unwrap();
        assert_eq!(followup.due_at, at(18));
        assert_eq!(followup.snooze_count, 1);
        assert_eq!(followup.reminded_at, None);
    }

    #[test]
    fn reminders_fire_once_inside_the_window() {
        let window = Duration::hours(2);
        let mut followup = sample_followup(at(11));

        assert!(!followup.needs_reminder(at(8), window));
        assert!(followup.needs_reminder(at(10), window));

        followup.mark_reminded(at(10));
        assert!(!followup.needs_reminder(at(12), window));
    }

    #[test]
    fn auto_reply_requires_confident_draft_and_opt_in() {
        let mut prefs = UserPreferences::defaults(UserId::new("owner").unwrap());
        let mut followup = sample_followup(at(9));
        let now = at(10);

        assert!(!followup.is_auto_reply_eligible(now, &prefs));

        followup
            .attach_draft(
                FollowupDraft {
                    body: SanitizedText::new("Just checking in").unwrap(),
                    confidence: Confidence::new(0.9).unwrap(),
                },
                now,
            )
            .unwrap();
        assert!(!followup.is_auto_reply_eligible(now, &prefs));

        prefs.auto_reply_enabled = true;
        assert!(followup.is_auto_reply_eligible(now, &prefs));

        prefs.auto_reply_threshold = Confidence::new(0.95).unwrap();
        assert!(!followup.is_auto_reply_eligible(now, &prefs));

        // Still pending: due beyond the owner's window.
        prefs.auto_reply_threshold = Confidence::new(0.5).unwrap();
        followup.due_at = now + prefs.due_window() + Duration::hours(1);
        assert_eq!(followup.status_at(now, prefs.due_window()), FollowupStatus::Pending);
        assert!(!followup.is_auto_reply_eligible(now, &prefs));
    }

    #[test]
    fn summary_counts_open_records() {
        let mut summary = StatusSummary::default();
        for status in FollowupStatus::ALL {
            summary.record(status);
        }
        summary.record(FollowupStatus::Overdue);
        assert_eq!(summary.overdue, 2);
        assert_eq!(summary.open(), 4);
    }

    #[test]
    fn enums_parse_their_storage_form() {
        assert_eq!(
            "auto_replied".parse::<CompletionReason>(),
            Ok(CompletionReason::AutoReplied)
        );
        assert_eq!("HIGH".parse::<FollowupPriority>(), Ok(FollowupPriority::High));
        assert!("later".parse::<FollowupState>().is_err());
    }
}
