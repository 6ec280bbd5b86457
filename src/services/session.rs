//! Session enrichment performed at sign-in and on organization switches.
//!
//! The external identity provider only knows who the user is. Before a token
//! is stored in the session cookie it is enriched with the active
//! organization, the member role and the organization's branding.

use chrono::Utc;

use crate::auth::{AuthenticatedUser, TOKEN_LIFETIME_DAYS};
use crate::domain::member::Member;
use crate::domain::organization::Organization;
use crate::domain::types::OrganizationId;
use crate::dto::session::{OrganizationMembership, SessionView};
use crate::repository::{
    MemberReader, MemberWriter, OrganizationReader, PreferencesReader, PreferencesWriter,
};
use crate::services::preferences::load_preferences;
use crate::services::{ServiceError, ServiceResult};

/// Copies the organization context of `membership` into the claims.
pub(crate) fn apply_membership(
    user: &mut AuthenticatedUser,
    membership: Option<(&Organization, &Member)>,
) {
    match membership {
        Some((organization, member)) => {
            user.organization_id = Some(organization.id.get());
            user.role = Some(member.role);
            user.branding = Some(organization.branding());
            if user.name.trim().is_empty()
                && let Some(name) = &member.name
            {
                user.name = name.as_str().to_string();
            }
        }
        None => user.clear_organization(),
    }
}

/// Claims pending invitations and resolves the active organization.
///
/// The preferred organization wins while the user is still a member of it;
/// otherwise the earliest membership is used.
pub fn enrich_session<R>(repo: &R, mut user: AuthenticatedUser) -> ServiceResult<AuthenticatedUser>
where
    R: MemberWriter + OrganizationReader + PreferencesReader + ?Sized,
{
    let user_id = user.user_id()?;
    let email = user.email_address()?;

    let claimed = repo.claim_invitations(&user_id, &email).map_err(|err| {
        log::error!("Failed to claim invitations: {err}");
        err
    })?;
    if claimed > 0 {
        log::info!("User {user_id} joined {claimed} organization(s) by invitation");
    }

    let memberships = repo.list_organizations_for_user(&user_id).map_err(|err| {
        log::error!("Failed to list organizations: {err}");
        err
    })?;
    let preferred = repo
        .get_preferences(&user_id)?
        .and_then(|prefs| prefs.active_organization_id);

    let active = preferred
        .and_then(|id| memberships.iter().find(|(org, _)| org.id == id))
        .or_else(|| memberships.first());

    apply_membership(&mut user, active.map(|(org, member)| (org, member)));
    user.set_expiration(TOKEN_LIFETIME_DAYS);
    Ok(user)
}

/// Makes `organization_id` the active organization and remembers the choice.
pub fn switch_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
    organization_id: i32,
) -> ServiceResult<AuthenticatedUser>
where
    R: MemberReader + OrganizationReader + PreferencesReader + PreferencesWriter + ?Sized,
{
    let user_id = user.user_id()?;
    let organization_id = OrganizationId::new(organization_id)?;

    let member = repo
        .get_member_for_user(organization_id, &user_id)?
        .ok_or(ServiceError::Unauthorized)?;
    let organization = repo
        .get_organization_by_id(organization_id)?
        .ok_or(ServiceError::NotFound)?;

    remember_active_organization(repo, user, organization_id)?;

    let mut user = user.clone();
    apply_membership(&mut user, Some((&organization, &member)));
    user.set_expiration(TOKEN_LIFETIME_DAYS);
    Ok(user)
}

pub(crate) fn remember_active_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
    organization_id: OrganizationId,
) -> ServiceResult<()>
where
    R: PreferencesReader + PreferencesWriter + ?Sized,
{
    let user_id = user.user_id()?;
    let mut preferences = load_preferences(repo, &user_id)?;
    preferences.active_organization_id = Some(organization_id);
    preferences.updated_at = Some(Utc::now().naive_utc());
    repo.save_preferences(&preferences).map_err(|err| {
        log::error!("Failed to remember the active organization: {err}");
        err
    })?;
    Ok(())
}

/// Organizations the user belongs to with their role in each.
pub fn list_memberships<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Vec<OrganizationMembership>>
where
    R: OrganizationReader + ?Sized,
{
    let user_id = user.user_id()?;
    let memberships = repo.list_organizations_for_user(&user_id).map_err(|err| {
        log::error!("Failed to list organizations: {err}");
        err
    })?;
    Ok(memberships
        .into_iter()
        .map(|(organization, member)| OrganizationMembership {
            organization,
            role: member.role,
        })
        .collect())
}

pub fn session_view<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<SessionView>
where
    R: OrganizationReader + ?Sized,
{
    Ok(SessionView {
        user: user.clone(),
        organizations: list_memberships(repo, user)?,
    })
}
