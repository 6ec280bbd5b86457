//! AI transparency: the activity timeline, the memory browser and the
//! control panel for assistant behaviour.

use crate::auth::AuthenticatedUser;
use crate::domain::ai::{ActivityKind, AiActivity, AiMemory};
use crate::domain::member::MemberRole;
use crate::domain::types::MemoryId;
use crate::dto::ai::AiSettings;
use crate::dto::queries::{ActivityListParams, MemoryListParams, search_term};
use crate::forms::FormError;
use crate::forms::ai::MemoryForm;
use crate::forms::preferences::PreferencesUpdate;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{
    ActivityListQuery, ActivityReader, MemberReader, MemoryListQuery, MemoryReader, MemoryWriter,
    PreferencesReader, PreferencesWriter,
};
use crate::services::preferences::{get_preferences, update_preferences};
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Timeline of the organization, newest first.
pub fn list_activities<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ActivityListParams,
) -> ServiceResult<Paginated<AiActivity>>
where
    R: MemberReader + ActivityReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let page = normalize_page(params.page);

    let mut query = ActivityListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(kind) = params.kind.filter(|k| !k.trim().is_empty()) {
        let kind = kind
            .trim()
            .parse::<ActivityKind>()
            .map_err(|err| FormError::field("kind", err))?;
        query = query.kind(kind);
    }

    let (total, activities) = repo.list_activities(query).map_err(|err| {
        log::error!("Failed to list activities: {err}");
        err
    })?;
    Ok(Paginated::new(activities, page, total, DEFAULT_ITEMS_PER_PAGE))
}

/// Memories of the caller; other members' memories are never listed.
pub fn list_memories<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: MemoryListParams,
) -> ServiceResult<Paginated<AiMemory>>
where
    R: MemberReader + MemoryReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let page = normalize_page(params.page);

    let mut query =
        MemoryListQuery::new(organization_id, user.user_id()?).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search_term(params.search) {
        query = query.search(term);
    }

    let (total, memories) = repo.list_memories(query).map_err(|err| {
        log::error!("Failed to list memories: {err}");
        err
    })?;
    Ok(Paginated::new(memories, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn create_memory<R>(repo: &R, user: &AuthenticatedUser, form: MemoryForm) -> ServiceResult<AiMemory>
where
    R: MemberReader + MemoryWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let memory = form.into_domain(organization_id, user.user_id()?)?;

    let memory = repo.create_memory(&memory).map_err(|err| {
        log::error!("Failed to create memory: {err}");
        err
    })?;
    Ok(memory)
}

pub fn delete_memory<R>(repo: &R, user: &AuthenticatedUser, memory_id: i32) -> ServiceResult<()>
where
    R: MemberReader + MemoryReader + MemoryWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let user_id = user.user_id()?;
    let memory = repo
        .get_memory_by_id(organization_id, MemoryId::new(memory_id)?)?
        .filter(|memory| memory.user_id == user_id)
        .ok_or(ServiceError::NotFound)?;

    repo.delete_memory(organization_id, memory.id)
        .map_err(|err| {
            log::error!("Failed to delete memory: {err}");
            err
        })?;
    Ok(())
}

pub fn get_ai_settings<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<AiSettings>
where
    R: PreferencesReader + ?Sized,
{
    Ok(AiSettings::from(&get_preferences(repo, user)?))
}

pub fn update_ai_settings<R>(
    repo: &R,
    user: &AuthenticatedUser,
    update: impl Into<PreferencesUpdate>,
) -> ServiceResult<AiSettings>
where
    R: PreferencesReader + PreferencesWriter + ?Sized,
{
    let preferences = update_preferences(repo, user, update.into())?;
    log::info!(
        "AI settings of {} changed: drafts={}, auto_reply={}",
        preferences.user_id,
        preferences.ai_drafts_enabled,
        preferences.auto_reply_enabled
    );
    Ok(AiSettings::from(&preferences))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::types::{Confidence, SanitizedText, UserId};
    use crate::forms::preferences::AiSettingsPayload;
    use crate::services::test_support::{mock_for, org, user};

    fn memory(id: i32, owner: &str) -> AiMemory {
        AiMemory {
            id: MemoryId::new(id).unwrap(),
            organization_id: org(),
            user_id: UserId::new(owner).unwrap(),
            content: SanitizedText::new("Prefers calls on Mondays").unwrap(),
            source: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn activities_filter_by_kind() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_list_activities()
            .withf(|query| query.kind == Some(ActivityKind::ReminderSent))
            .times(1)
            .returning(|_| Ok((0, vec![])));

        let page = list_activities(
            &repo,
            &user(MemberRole::Member),
            ActivityListParams {
                kind: Some("reminder_sent".to_string()),
                page: None,
            },
        )
        .unwrap();

        assert_eq!(page.total, 0);
    }

    #[test]
    fn unknown_activity_kind_is_a_form_error() {
        let repo = mock_for(MemberRole::Member);

        let result = list_activities(
            &repo,
            &user(MemberRole::Member),
            ActivityListParams {
                kind: Some("magic".to_string()),
                page: None,
            },
        );

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn memories_are_listed_for_the_caller_only() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_list_memories()
            .withf(|query| query.user_id.as_str() == "member-1" && query.search.as_deref() == Some("calls"))
            .times(1)
            .returning(|_| Ok((1, vec![memory(1, "member-1")])));

        let page = list_memories(
            &repo,
            &user(MemberRole::Member),
            MemoryListParams {
                search: Some("calls".to_string()),
                page: None,
            },
        )
        .unwrap();

        assert_eq!(page.items.len(), 1);
    }

    #[test]
    fn deleting_someone_elses_memory_is_not_found() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_memory_by_id()
            .returning(|_, id| Ok(Some(memory(id.get(), "admin-1"))));
        repo.expect_delete_memory().times(0);

        let result = delete_memory(&repo, &user(MemberRole::Member), 1);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn own_memory_is_deleted() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_memory_by_id()
            .returning(|_, id| Ok(Some(memory(id.get(), "member-1"))));
        repo.expect_delete_memory().times(1).returning(|_, _| Ok(()));

        assert!(delete_memory(&repo, &user(MemberRole::Member), 1).is_ok());
    }

    #[test]
    fn ai_settings_update_keeps_other_preferences() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_preferences().returning(|_| Ok(None));
        repo.expect_save_preferences()
            .withf(|prefs| prefs.auto_reply_enabled && prefs.default_followup_days == 3)
            .times(1)
            .returning(|prefs| Ok(prefs.clone()));

        let settings = update_ai_settings(
            &repo,
            &user(MemberRole::Member),
            AiSettingsPayload {
                ai_drafts_enabled: None,
                auto_reply_enabled: Some(true),
                auto_reply_threshold: Some(0.9),
            },
        )
        .unwrap();

        assert!(settings.auto_reply_enabled);
        assert!(settings.ai_drafts_enabled);
        assert_eq!(settings.auto_reply_threshold, Confidence::new(0.9).unwrap());
    }
}
