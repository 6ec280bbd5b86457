use serde::Serialize;

use crate::domain::preferences::UserPreferences;
use crate::domain::types::Confidence;

/// AI-related switches shown in the control panel.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AiSettings {
    pub ai_drafts_enabled: bool,
    pub auto_reply_enabled: bool,
    pub auto_reply_threshold: Confidence,
}

impl From<&UserPreferences> for AiSettings {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            ai_drafts_enabled: prefs.ai_drafts_enabled,
            auto_reply_enabled: prefs.auto_reply_enabled,
            auto_reply_threshold: prefs.auto_reply_threshold,
        }
    }
}
