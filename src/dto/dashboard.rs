use serde::Serialize;

use crate::domain::email_account::EmailAccount;
use crate::domain::followup::StatusSummary;
use crate::domain::member::{Member, MemberRole};
use crate::domain::organization::Organization;
use crate::domain::preferences::UserPreferences;
use crate::dto::followups::{FollowupView, FolderCount};

/// Data required to render the main dashboard template.
#[derive(Debug, Serialize)]
pub struct IndexPageData {
    pub summary: StatusSummary,
    /// Open follow-ups, soonest due first.
    pub upcoming: Vec<FollowupView>,
    pub folders: Vec<FolderCount>,
}

/// Data required to render the settings template.
#[derive(Debug, Serialize)]
pub struct SettingsPageData {
    pub organization: Organization,
    pub role: MemberRole,
    pub members: Vec<Member>,
    pub preferences: UserPreferences,
    pub email_accounts: Vec<EmailAccount>,
}
