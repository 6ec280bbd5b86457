use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::preferences::UserPreferences as DomainUserPreferences;
use crate::domain::types::{Confidence, OrganizationId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::user_preferences)]
#[diesel(primary_key(user_id))]
#[diesel(treat_none_as_null = true)]
pub struct UserPreferences {
    pub user_id: String,
    pub theme: String,
    pub timezone: String,
    pub default_followup_days: i32,
    pub auto_followup: bool,
    pub due_window_hours: i32,
    pub notifications_enabled: bool,
    pub ai_drafts_enabled: bool,
    pub auto_reply_enabled: bool,
    pub auto_reply_threshold: f64,
    pub active_organization_id: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserPreferences> for DomainUserPreferences {
    type Error = TypeConstraintError;

    fn try_from(row: UserPreferences) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(row.user_id)?,
            theme: row.theme.parse()?,
            timezone: row.timezone,
            default_followup_days: row.default_followup_days,
            auto_followup: row.auto_followup,
            due_window_hours: row.due_window_hours,
            notifications_enabled: row.notifications_enabled,
            ai_drafts_enabled: row.ai_drafts_enabled,
            auto_reply_enabled: row.auto_reply_enabled,
            auto_reply_threshold: Confidence::new(row.auto_reply_threshold)?,
            active_organization_id: row.active_organization_id.map(OrganizationId::new).transpose()?,
            updated_at: Some(row.updated_at),
        })
    }
}

impl UserPreferences {
    pub fn from_domain(prefs: &DomainUserPreferences, now: NaiveDateTime) -> Self {
        Self {
            user_id: prefs.user_id.as_str().to_string(),
            theme: prefs.theme.as_str().to_string(),
            timezone: prefs.timezone.trim().to_string(),
            default_followup_days: prefs.default_followup_days,
            auto_followup: prefs.auto_followup,
            due_window_hours: prefs.due_window_hours,
            notifications_enabled: prefs.notifications_enabled,
            ai_drafts_enabled: prefs.ai_drafts_enabled,
            auto_reply_enabled: prefs.auto_reply_enabled,
            auto_reply_threshold: prefs.auto_reply_threshold.get(),
            active_organization_id: prefs.active_organization_id.map(OrganizationId::get),
            updated_at: now,
        }
    }
}
