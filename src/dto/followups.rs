use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::followup::{Followup, FollowupStatus};
use crate::domain::smart_folder::SmartFolder;

/// Follow-up together with the status derived for the viewer's clock.
#[derive(Debug, Clone, Serialize)]
pub struct FollowupView {
    #[serde(flatten)]
    pub followup: Followup,
    pub status: FollowupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
}

impl FollowupView {
    pub fn new(followup: Followup, now: NaiveDateTime, due_window: chrono::Duration) -> Self {
        let status = followup.status_at(now, due_window);
        Self {
            followup,
            status,
            contact_email: None,
        }
    }

    pub fn with_contact_email(mut self, email: Option<String>) -> Self {
        self.contact_email = email;
        self
    }
}

/// Smart folder with the number of follow-ups it currently matches.
#[derive(Debug, Clone, Serialize)]
pub struct FolderCount {
    pub folder: SmartFolder,
    pub count: usize,
}
