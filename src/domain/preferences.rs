//! Per-user preferences, including follow-up automation and AI controls.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{Confidence, OrganizationId, TypeConstraintError, UserId};

pub const DEFAULT_FOLLOWUP_DAYS: i32 = 3;
pub const DEFAULT_DUE_WINDOW_HOURS: i32 = 24;
pub const DEFAULT_AUTO_REPLY_THRESHOLD: f64 = 0.85;
pub const MAX_FOLLOWUP_DAYS: i32 = 90;
pub const MAX_DUE_WINDOW_HOURS: i32 = 168;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown theme `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserPreferences {
    pub user_id: UserId,
    pub theme: Theme,
    pub timezone: String,
    pub default_followup_days: i32,
    pub auto_followup: bool,
    pub due_window_hours: i32,
    pub notifications_enabled: bool,
    pub ai_drafts_enabled: bool,
    pub auto_reply_enabled: bool,
    pub auto_reply_threshold: Confidence,
    pub active_organization_id: Option<OrganizationId>,
    pub updated_at: Option<NaiveDateTime>,
}

impl UserPreferences {
    /// Preferences used for users that never saved any.
    pub fn defaults(user_id: UserId) -> Self {
        Self {
            user_id,
            theme: Theme::System,
            timezone: "UTC".to_string(),
            default_followup_days: DEFAULT_FOLLOWUP_DAYS,
            auto_followup: true,
            due_window_hours: DEFAULT_DUE_WINDOW_HOURS,
            notifications_enabled: true,
            ai_drafts_enabled: true,
            auto_reply_enabled: false,
            auto_reply_threshold: Confidence::clamped(DEFAULT_AUTO_REPLY_THRESHOLD),
            active_organization_id: None,
            updated_at: None,
        }
    }

    /// Checks numeric ranges and the timezone label.
    pub fn validate(&self) -> Result<(), TypeConstraintError> {
        if !(1..=MAX_FOLLOWUP_DAYS).contains(&self.default_followup_days) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "default_followup_days must be between 1 and {MAX_FOLLOWUP_DAYS}"
            )));
        }
        if !(1..=MAX_DUE_WINDOW_HOURS).contains(&self.due_window_hours) {
            return Err(TypeConstraintError::InvalidValue(format!(
                "due_window_hours must be between 1 and {MAX_DUE_WINDOW_HOURS}"
            )));
        }
        if self.timezone.trim().is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(())
    }

    pub fn due_window(&self) -> Duration {
        Duration::hours(i64::from(self.due_window_hours))
    }

    pub fn followup_delay(&self) -> Duration {
        Duration::days(i64::from(self.default_followup_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let prefs = UserPreferences::defaults(UserId::new("u1").unwrap());
        assert!(prefs.validate().is_ok());
        assert_eq!(prefs.followup_delay(), Duration::days(3));
        assert_eq!(prefs.due_window(), Duration::hours(24));
        assert!(!prefs.auto_reply_enabled);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut prefs = UserPreferences::defaults(UserId::new("u1").unwrap());
        prefs.default_followup_days = 0;
        assert!(prefs.validate().is_err());

        prefs.default_followup_days = 5;
        prefs.due_window_hours = 500;
        assert!(prefs.validate().is_err());

        prefs.due_window_hours = 12;
        prefs.timezone = " ".to_string();
        assert!(prefs.validate().is_err());
    }
}
