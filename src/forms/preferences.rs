//! Preference updates from the settings page and the JSON API.

use serde::Deserialize;

use crate::domain::preferences::{Theme, UserPreferences};
use crate::domain::types::Confidence;
use crate::forms::FormError;

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub theme: Option<String>,
    pub timezone: Option<String>,
    pub default_followup_days: Option<i32>,
    pub auto_followup: Option<bool>,
    pub due_window_hours: Option<i32>,
    pub notifications_enabled: Option<bool>,
    pub ai_drafts_enabled: Option<bool>,
    pub auto_reply_enabled: Option<bool>,
    pub auto_reply_threshold: Option<f64>,
}

impl PreferencesUpdate {
    pub fn apply(self, prefs: &mut UserPreferences) -> Result<(), FormError> {
        if let Some(theme) = self.theme {
            prefs.theme = theme
                .trim()
                .parse::<Theme>()
                .map_err(|err| FormError::field("theme", err))?;
        }
        if let Some(timezone) = self.timezone {
            prefs.timezone = timezone.trim().to_string();
        }
        if let Some(days) = self.default_followup_days {
            prefs.default_followup_days = days;
        }
        if let Some(enabled) = self.auto_followup {
            prefs.auto_followup = enabled;
        }
        if let Some(hours) = self.due_window_hours {
            prefs.due_window_hours = hours;
        }
        if let Some(enabled) = self.notifications_enabled {
            prefs.notifications_enabled = enabled;
        }
        if let Some(enabled) = self.ai_drafts_enabled {
            prefs.ai_drafts_enabled = enabled;
        }
        if let Some(enabled) = self.auto_reply_enabled {
            prefs.auto_reply_enabled = enabled;
        }
        if let Some(threshold) = self.auto_reply_threshold {
            prefs.auto_reply_threshold = Confidence::new(threshold)
                .map_err(|err| FormError::field("auto_reply_threshold", err))?;
        }
        prefs
            .validate()
            .map_err(|err| FormError::field("preferences", err))
    }
}

/// General preferences section of the settings page.
///
/// Unchecked checkboxes are not submitted, hence the optional strings.
#[derive(Debug, Deserialize)]
pub struct PreferencesForm {
    pub theme: String,
    pub timezone: String,
    pub default_followup_days: i32,
    pub due_window_hours: i32,
    #[serde(default)]
    pub auto_followup: Option<String>,
    #[serde(default)]
    pub notifications_enabled: Option<String>,
}

impl From<PreferencesForm> for PreferencesUpdate {
    fn from(form: PreferencesForm) -> Self {
        Self {
            theme: Some(form.theme),
            timezone: Some(form.timezone),
            default_followup_days: Some(form.default_followup_days),
            due_window_hours: Some(form.due_window_hours),
            auto_followup: Some(form.auto_followup.is_some()),
            notifications_enabled: Some(form.notifications_enabled.is_some()),
            ..Default::default()
        }
    }
}

/// AI control panel section of the settings page.
#[derive(Debug, Deserialize)]
pub struct AiSettingsForm {
    #[serde(default)]
    pub ai_drafts_enabled: Option<String>,
    #[serde(default)]
    pub auto_reply_enabled: Option<String>,
    pub auto_reply_threshold: f64,
}

impl From<AiSettingsForm> for PreferencesUpdate {
    fn from(form: AiSettingsForm) -> Self {
        Self {
            ai_drafts_enabled: Some(form.ai_drafts_enabled.is_some()),
            auto_reply_enabled: Some(form.auto_reply_enabled.is_some()),
            auto_reply_threshold: Some(form.auto_reply_threshold),
            ..Default::default()
        }
    }
}

/// JSON body of the AI control panel endpoint.
#[derive(Debug, Deserialize)]
pub struct AiSettingsPayload {
    pub ai_drafts_enabled: Option<bool>,
    pub auto_reply_enabled: Option<bool>,
    pub auto_reply_threshold: Option<f64>,
}

impl From<AiSettingsPayload> for PreferencesUpdate {
    fn from(payload: AiSettingsPayload) -> Self {
        Self {
            ai_drafts_enabled: payload.ai_drafts_enabled,
            auto_reply_enabled: payload.auto_reply_enabled,
            auto_reply_threshold: payload.auto_reply_threshold,
            ..Default::default()
        }
    }
}
