//! Saved follow-up filters. Rules are evaluated in memory against the
//! organization's follow-ups so every condition sees the derived status.

use chrono::{Duration, NaiveDateTime};

use crate::auth::AuthenticatedUser;
use crate::domain::followup::Followup;
use crate::domain::member::MemberRole;
use crate::domain::smart_folder::{
    FolderRules, FollowupFacts, NewSmartFolder, SmartFolder, UpdateSmartFolder,
};
use crate::domain::types::{EmailAddress, OrganizationId, SmartFolderId};
use crate::dto::followups::{FolderCount, FollowupView};
use crate::forms::smart_folders::{SmartFolderForm, SmartFolderPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{
    FollowupReader, MemberReader, PreferencesReader, SmartFolderReader, SmartFolderWriter,
};
use crate::services::preferences::load_preferences;
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub(crate) type FollowupRow = (Followup, Option<EmailAddress>);

pub(crate) fn matching<'a>(
    rules: &'a FolderRules,
    rows: &'a [FollowupRow],
    now: NaiveDateTime,
    window: Duration,
) -> impl Iterator<Item = &'a FollowupRow> + 'a {
    rows.iter().filter(move |(followup, contact_email)| {
        let facts = FollowupFacts {
            followup,
            status: followup.status_at(now, window),
            contact_email: contact_email.as_ref().map(EmailAddress::as_str),
        };
        rules.matches(&facts, now)
    })
}

pub(crate) fn load_rows<R>(repo: &R, organization_id: OrganizationId) -> ServiceResult<Vec<FollowupRow>>
where
    R: FollowupReader + ?Sized,
{
    repo.list_followups_with_contact_email(organization_id)
        .map_err(|err| {
            log::error!("Failed to load follow-ups for folders: {err}");
            err.into()
        })
}

fn load_folder<R>(
    repo: &R,
    organization_id: OrganizationId,
    folder_id: i32,
) -> ServiceResult<SmartFolder>
where
    R: SmartFolderReader + ?Sized,
{
    let folder_id = SmartFolderId::new(folder_id)?;
    repo.get_smart_folder_by_id(organization_id, folder_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_smart_folders<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<SmartFolder>>
where
    R: MemberReader + SmartFolderReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.list_smart_folders(organization_id).map_err(|err| {
        log::error!("Failed to list smart folders: {err}");
        err.into()
    })
}

/// Every folder of the organization with its current number of matches.
pub fn folder_counts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<Vec<FolderCount>>
where
    R: MemberReader + SmartFolderReader + FollowupReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let window = load_preferences(repo, &user.user_id()?)?.due_window();
    let folders = list_smart_folders(repo, user)?;
    let rows = load_rows(repo, organization_id)?;

    Ok(folders
        .into_iter()
        .map(|folder| {
            let count = matching(&folder.rules, &rows, now, window).count();
            FolderCount { folder, count }
        })
        .collect())
}

pub fn get_smart_folder<R>(repo: &R, user: &AuthenticatedUser, folder_id: i32) -> ServiceResult<SmartFolder>
where
    R: MemberReader + SmartFolderReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    load_folder(repo, organization_id, folder_id)
}

pub fn create_smart_folder<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SmartFolderForm,
) -> ServiceResult<SmartFolder>
where
    R: MemberReader + SmartFolderWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let payload = SmartFolderPayload::try_from(form)?;

    let folder = repo
        .create_smart_folder(&NewSmartFolder {
            organization_id,
            user_id: user.user_id()?,
            name: payload.name,
            rules: payload.rules,
        })
        .map_err(|err| {
            log::error!("Failed to create smart folder: {err}");
            err
        })?;
    Ok(folder)
}

pub fn update_smart_folder<R>(
    repo: &R,
    user: &AuthenticatedUser,
    folder_id: i32,
    form: SmartFolderForm,
) -> ServiceResult<SmartFolder>
where
    R: MemberReader + SmartFolderWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let folder_id = SmartFolderId::new(folder_id)?;
    let payload = SmartFolderPayload::try_from(form)?;

    let folder = repo
        .update_smart_folder(
            organization_id,
            folder_id,
            &UpdateSmartFolder {
                name: payload.name,
                rules: payload.rules,
            },
        )
        .map_err(|err| {
            log::error!("Failed to update smart folder: {err}");
            err
        })?;
    Ok(folder)
}

pub fn delete_smart_folder<R>(repo: &R, user: &AuthenticatedUser, folder_id: i32) -> ServiceResult<()>
where
    R: MemberReader + SmartFolderWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let folder_id = SmartFolderId::new(folder_id)?;

    repo.delete_smart_folder(organization_id, folder_id)
        .map_err(|err| {
            log::error!("Failed to delete smart folder: {err}");
            err
        })?;
    Ok(())
}

/// One page of follow-ups matching the folder's rules, ordered by due date.
pub fn evaluate_smart_folder<R>(
    repo: &R,
    user: &AuthenticatedUser,
    folder_id: i32,
    page: Option<usize>,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<FollowupView>>
where
    R: MemberReader + SmartFolderReader + FollowupReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let folder = load_folder(repo, organization_id, folder_id)?;
    let window = load_preferences(repo, &user.user_id()?)?.due_window();
    let rows = load_rows(repo, organization_id)?;
    let page = normalize_page(page);

    let matches: Vec<&FollowupRow> = matching(&folder.rules, &rows, now, window).collect();
    let total = matches.len();
    let items = matches
        .into_iter()
        .skip((page - 1) * DEFAULT_ITEMS_PER_PAGE)
        .take(DEFAULT_ITEMS_PER_PAGE)
        .map(|(followup, contact_email)| {
            FollowupView::new(followup.clone(), now, window)
                .with_contact_email(contact_email.as_ref().map(|e| e.as_str().to_string()))
        })
        .collect();
    Ok(Paginated::new(items, page, total, DEFAULT_ITEMS_PER_PAGE))
}
