//! Page data for the HTML dashboard and settings screens.

use chrono::NaiveDateTime;

use crate::auth::AuthenticatedUser;
use crate::domain::followup::StatusSummary;
use crate::domain::member::MemberRole;
use crate::dto::dashboard::{IndexPageData, SettingsPageData};
use crate::dto::followups::{FolderCount, FollowupView};
use crate::repository::{
    EmailAccountReader, FollowupReader, MemberReader, OrganizationReader, PreferencesReader,
    SmartFolderReader,
};
use crate::services::preferences::load_preferences;
use crate::services::smart_folders::{load_rows, matching};
use crate::services::{ServiceError, ServiceResult, ensure_member, ensure_role};

pub const UPCOMING_LIMIT: usize = 10;

pub fn load_index_page<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<IndexPageData>
where
    R: MemberReader + FollowupReader + SmartFolderReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let window = load_preferences(repo, &user.user_id()?)?.due_window();
    let rows = load_rows(repo, organization_id)?;

    let mut summary = StatusSummary::default();
    for (followup, _) in &rows {
        summary.record(followup.status_at(now, window));
    }

    let upcoming = rows
        .iter()
        .filter(|(followup, _)| followup.is_open())
        .take(UPCOMING_LIMIT)
        .map(|(followup, contact_email)| {
            FollowupView::new(followup.clone(), now, window)
                .with_contact_email(contact_email.as_ref().map(|e| e.as_str().to_string()))
        })
        .collect();

    let folders = repo
        .list_smart_folders(organization_id)
        .map_err(|err| {
            log::error!("Failed to list smart folders: {err}");
            err
        })?
        .into_iter()
        .map(|folder| {
            let count = matching(&folder.rules, &rows, now, window).count();
            FolderCount { folder, count }
        })
        .collect();

    Ok(IndexPageData {
        summary,
        upcoming,
        folders,
    })
}

pub fn load_settings_page<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SettingsPageData>
where
    R: OrganizationReader + MemberReader + PreferencesReader + EmailAccountReader + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Member)?;
    let organization_id = caller.organization_id;
    let user_id = user.user_id()?;

    let organization = repo
        .get_organization_by_id(organization_id)?
        .ok_or(ServiceError::NotFound)?;
    let members = repo.list_members(organization_id).map_err(|err| {
        log::error!("Failed to list members: {err}");
        err
    })?;
    let email_accounts = repo.list_email_accounts(organization_id, &user_id)?;

    Ok(SettingsPageData {
        organization,
        role: caller.role,
        members,
        preferences: load_preferences(repo, &user_id)?,
        email_accounts,
    })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::followup::CompletionReason;
    use crate::domain::smart_folder::{FolderRules, SmartFolder};
    use crate::domain::types::{FolderName, SmartFolderId, UserId};
    use crate::services::test_support::{
        at, followup, member, mock_for, org, organization, user,
    };

    #[test]
    fn index_lists_open_followups_and_folder_counts() {
        let mut done = followup(1, "member-1", at(8, 9));
        done.complete(CompletionReason::Manual, at(8, 10)).unwrap();

        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_preferences().returning(|_| Ok(None));
        repo.expect_list_followups_with_contact_email()
            .times(1)
            .returning(move |_| {
                Ok(vec![
                    (done.clone(), None),
                    (followup(2, "member-1", at(9, 9)), None),
                    (followup(3, "member-1", at(20, 9)), None),
                ])
            });
        repo.expect_list_smart_folders().returning(|_| {
            let now = Utc::now().naive_utc();
            Ok(FolderRules::seeded_folders()
                .into_iter()
                .enumerate()
                .map(|(i, (name, rules))| SmartFolder {
                    id: SmartFolderId::new(i as i32 + 1).unwrap(),
                    organization_id: org(),
                    user_id: UserId::new("member-1").unwrap(),
                    name: FolderName::new(name).unwrap(),
                    rules,
                    created_at: now,
                    updated_at: now,
                })
                .collect())
        });

        let page = load_index_page(&repo, &user(MemberRole::Member), at(10, 8)).unwrap();

        assert_eq!(page.summary.completed, 1);
        assert_eq!(page.summary.open(), 2);
        let upcoming: Vec<i32> = page.upcoming.iter().map(|v| v.followup.id.get()).collect();
        assert_eq!(upcoming, vec![2, 3]);
        assert_eq!(page.folders[0].folder.name.as_str(), "Overdue");
        assert_eq!(page.folders[0].count, 1);
        assert_eq!(page.folders[1].count, 0);
    }

    #[test]
    fn settings_page_collects_team_and_preferences() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_organization_by_id()
            .returning(|id| Ok(Some(organization(id.get()))));
        repo.expect_list_members()
            .returning(|_| Ok(vec![member(1, MemberRole::Owner), member(2, MemberRole::Member)]));
        repo.expect_list_email_accounts().returning(|_, _| Ok(vec![]));
        repo.expect_get_preferences().returning(|_| Ok(None));

        let page = load_settings_page(&repo, &user(MemberRole::Admin)).unwrap();

        assert_eq!(page.role, MemberRole::Admin);
        assert_eq!(page.members.len(), 2);
        assert_eq!(page.preferences.user_id.as_str(), "admin-1");
    }
}
