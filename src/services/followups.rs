//! Follow-up workflows: listing with derived statuses and lifecycle changes.
//!
//! Statuses are derived with the viewer's due window, so two members may see
//! the same follow-up as `pending` and `due`.

use chrono::{Duration, NaiveDateTime};

use crate::auth::AuthenticatedUser;
use crate::domain::ai::{ActivityKind, NewAiActivity};
use crate::domain::followup::{
    CompletionReason, Followup, FollowupDraft, FollowupError, FollowupStatus, NewFollowup,
    StatusSummary, UpdateFollowup,
};
use crate::domain::member::MemberRole;
use crate::domain::types::{ContactId, FollowupId, OrganizationId};
use crate::dto::followups::FollowupView;
use crate::dto::queries::FollowupListParams;
use crate::forms::FormError;
use crate::forms::followups::{DraftForm, FollowupForm, FollowupPayload, UpdateFollowupForm};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{
    ActivityWriter, ContactReader, FollowupListQuery, FollowupReader, FollowupWriter, MemberReader,
    PreferencesReader,
};
use crate::services::preferences::load_preferences;
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Due window of the signed-in user.
fn viewer_window<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Duration>
where
    R: PreferencesReader + ?Sized,
{
    Ok(load_preferences(repo, &user.user_id()?)?.due_window())
}

fn load_followup<R>(
    repo: &R,
    organization_id: OrganizationId,
    followup_id: i32,
) -> ServiceResult<Followup>
where
    R: FollowupReader + ?Sized,
{
    let followup_id = FollowupId::new(followup_id)?;
    repo.get_followup_by_id(organization_id, followup_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn list_followups<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: FollowupListParams,
    now: NaiveDateTime,
) -> ServiceResult<Paginated<FollowupView>>
where
    R: MemberReader + FollowupReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let window = viewer_window(repo, user)?;
    let page = normalize_page(params.page);

    let mut query = FollowupListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(raw) = params.status.filter(|s| !s.trim().is_empty()) {
        let status = raw
            .parse::<FollowupStatus>()
            .map_err(|err| FormError::field("status", err))?;
        query = query.status(status, now, window);
    }
    if let Some(contact_id) = params.contact_id {
        query = query.contact(ContactId::new(contact_id)?);
    }
    if params.mine {
        query = query.owner(user.user_id()?);
    }

    let (total, followups) = repo.list_followups(query).map_err(|err| {
        log::error!("Failed to list follow-ups: {err}");
        err
    })?;
    let views = followups
        .into_iter()
        .map(|followup| FollowupView::new(followup, now, window))
        .collect();
    Ok(Paginated::new(views, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let followup = load_followup(repo, organization_id, followup_id)?;
    Ok(FollowupView::new(followup, now, viewer_window(repo, user)?))
}

/// Creates a follow-up owned by the caller.
///
/// Without an explicit due date it falls due after the caller's default delay.
pub fn create_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: FollowupForm,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupWriter + ContactReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let payload = FollowupPayload::try_from(form)?;
    let owner_user_id = user.user_id()?;
    let preferences = load_preferences(repo, &owner_user_id)?;

    if let Some(contact_id) = payload.contact_id
        && repo.get_contact_by_id(organization_id, contact_id)?.is_none()
    {
        return Err(FormError::field("contact_id", "unknown contact").into());
    }

    let followup = repo
        .create_followup(&NewFollowup {
            organization_id,
            owner_user_id,
            contact_id: payload.contact_id,
            email_id: payload.email_id,
            subject: payload.subject,
            notes: payload.notes,
            due_at: payload.due_at.unwrap_or(now + preferences.followup_delay()),
            priority: payload.priority,
        })
        .map_err(|err| {
            log::error!("Failed to create follow-up: {err}");
            err
        })?;
    Ok(FollowupView::new(followup, now, preferences.due_window()))
}

/// Edits subject, notes, priority and due date of an open follow-up.
pub fn update_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    form: UpdateFollowupForm,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let updates = UpdateFollowup::try_from(form)?;
    let current = load_followup(repo, organization_id, followup_id)?;
    if !current.is_open() {
        return Err(FollowupError::Closed(current.state).into());
    }

    let followup = repo
        .update_followup(organization_id, current.id, &updates)
        .map_err(|err| {
            log::error!("Failed to update follow-up: {err}");
            err
        })?;
    Ok(FollowupView::new(followup, now, viewer_window(repo, user)?))
}

/// Loads a follow-up, applies a lifecycle transition and persists it.
fn transition<R, F>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    now: NaiveDateTime,
    change: F,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
    F: FnOnce(&mut Followup) -> Result<(), FollowupError>,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let mut followup = load_followup(repo, organization_id, followup_id)?;
    change(&mut followup)?;

    let followup = repo.save_followup_state(&followup).map_err(|err| {
        log::error!("Failed to save follow-up {}: {err}", followup.id);
        err
    })?;
    Ok(FollowupView::new(followup, now, viewer_window(repo, user)?))
}

pub fn snooze_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    until: NaiveDateTime,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
{
    transition(repo, user, followup_id, now, |f| f.snooze(until, now))
}

pub fn complete_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
{
    transition(repo, user, followup_id, now, |f| {
        f.complete(CompletionReason::Manual, now)
    })
}

pub fn cancel_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
{
    transition(repo, user, followup_id, now, |f| f.cancel(now))
}

pub fn reopen_followup<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ?Sized,
{
    transition(repo, user, followup_id, now, |f| f.reopen(now))
}

/// Attaches an assistant draft unless the follow-up owner turned drafts off.
pub fn attach_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    followup_id: i32,
    form: DraftForm,
    now: NaiveDateTime,
) -> ServiceResult<FollowupView>
where
    R: MemberReader + FollowupReader + FollowupWriter + PreferencesReader + ActivityWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let draft = FollowupDraft::try_from(form)?;
    let current = load_followup(repo, organization_id, followup_id)?;

    let owner_preferences = load_preferences(repo, &current.owner_user_id)?;
    if !owner_preferences.ai_drafts_enabled {
        return Err(ServiceError::Form(
            "AI drafts are disabled for the owner of this follow-up".to_string(),
        ));
    }

    let confidence = draft.confidence;
    let view = transition(repo, user, followup_id, now, |f| f.attach_draft(draft, now))?;

    repo.create_activity(
        &NewAiActivity::for_followup(
            organization_id,
            Some(view.followup.owner_user_id.clone()),
            ActivityKind::DraftGenerated,
            view.followup.id.get(),
            format!("Draft reply prepared for \"{}\"", view.followup.subject),
        )
        .with_confidence(confidence),
    )?;
    Ok(view)
}

pub fn delete_followup<R>(repo: &R, user: &AuthenticatedUser, followup_id: i32) -> ServiceResult<()>
where
    R: MemberReader + FollowupWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let followup_id = FollowupId::new(followup_id)?;

    repo.delete_followup(organization_id, followup_id)
        .map_err(|err| {
            log::error!("Failed to delete follow-up: {err}");
            err
        })?;
    Ok(())
}

/// Counts the organization's follow-ups per derived status.
pub fn status_summary<R>(
    repo: &R,
    user: &AuthenticatedUser,
    now: NaiveDateTime,
) -> ServiceResult<StatusSummary>
where
    R: MemberReader + FollowupReader + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let window = viewer_window(repo, user)?;

    let followups = repo
        .list_followups_with_contact_email(organization_id)
        .map_err(|err| {
            log::error!("Failed to load follow-ups: {err}");
            err
        })?;

    let mut summary = StatusSummary::default();
    for (followup, _) in &followups {
        summary.record(followup.status_at(now, window));
    }
    Ok(summary)
}
