//! Mailboxes connected by team members for sending and syncing email.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAccountId, EmailAddress, OrganizationId, TypeConstraintError, UserId,
};

pub const MIN_SYNC_INTERVAL_MINUTES: i32 = 5;
pub const MAX_SYNC_INTERVAL_MINUTES: i32 = 1440;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailProvider {
    Gmail,
    Outlook,
    Imap,
}

impl EmailProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailProvider::Gmail => "gmail",
            EmailProvider::Outlook => "outlook",
            EmailProvider::Imap => "imap",
        }
    }
}

impl Display for EmailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailProvider {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gmail" => Ok(EmailProvider::Gmail),
            "outlook" => Ok(EmailProvider::Outlook),
            "imap" => Ok(EmailProvider::Imap),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown provider `{other}`"
            ))),
        }
    }
}

/// Checks the polling interval against the supported bounds.
pub fn validate_sync_interval(minutes: i32) -> Result<i32, TypeConstraintError> {
    if (MIN_SYNC_INTERVAL_MINUTES..=MAX_SYNC_INTERVAL_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(TypeConstraintError::InvalidValue(format!(
            "sync interval must be between {MIN_SYNC_INTERVAL_MINUTES} and {MAX_SYNC_INTERVAL_MINUTES} minutes"
        )))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EmailAccount {
    pub id: EmailAccountId,
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub provider: EmailProvider,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
    pub last_synced_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

impl EmailAccount {
    /// True when the account has auto-sync on and its interval elapsed.
    pub fn is_sync_due(&self, now: NaiveDateTime) -> bool {
        if !self.is_active || !self.auto_sync {
            return false;
        }
        match self.last_synced_at {
            None => true,
            Some(last) => last + Duration::minutes(i64::from(self.sync_interval_minutes)) <= now,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NewEmailAccount {
    pub organization_id: OrganizationId,
    pub user_id: UserId,
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub provider: EmailProvider,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
}

#[derive(Clone, Debug)]
pub struct UpdateEmailAccount {
    pub display_name: Option<String>,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(last_synced_at: Option<NaiveDateTime>) -> EmailAccount {
        EmailAccount {
            id: EmailAccountId::new(1).unwrap(),
            organization_id: OrganizationId::new(1).unwrap(),
            user_id: UserId::new("u1").unwrap(),
            email: EmailAddress::new("me@example.com").unwrap(),
            display_name: None,
            provider: EmailProvider::Gmail,
            auto_sync: true,
            sync_interval_minutes: 15,
            is_active: true,
            last_synced_at,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn sync_due_respects_interval() {
        let now = Utc::now().naive_utc();
        assert!(account(None).is_sync_due(now));
        assert!(account(Some(now - Duration::minutes(20))).is_sync_due(now));
        assert!(!account(Some(now - Duration::minutes(5))).is_sync_due(now));

        let mut paused = account(None);
        paused.auto_sync = false;
        assert!(!paused.is_sync_due(now));
    }

    #[test]
    fn sync_interval_bounds() {
        assert!(validate_sync_interval(4).is_err());
        assert_eq!(validate_sync_interval(60), Ok(60));
        assert!(validate_sync_interval(1441).is_err());
    }
}
