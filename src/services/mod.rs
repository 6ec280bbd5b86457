//! Business workflows shared by the HTML routes, the JSON API and the worker.
//!
//! Services are generic over the repository traits so they can be exercised
//! against [`crate::repository::mock::MockRepository`] in tests.

use crate::auth::AuthenticatedUser;
use crate::domain::member::{Member, MemberRole};
use crate::domain::types::OrganizationId;
use crate::repository::MemberReader;

pub mod catalog;
pub mod contacts;
pub mod dashboard;
pub mod email_accounts;
pub mod emails;
pub mod errors;
pub mod followups;
pub mod members;
pub mod organizations;
pub mod preferences;
pub mod session;
pub mod smart_folders;
pub mod sweep;
pub mod transparency;

pub use errors::{ServiceError, ServiceResult};

/// Loads the caller's membership in the active organization of the session.
///
/// The role stored on the member row decides; the session claims only pick
/// the organization. Removed members and insufficient roles are rejected.
pub fn ensure_member<R>(
    repo: &R,
    user: &AuthenticatedUser,
    required: MemberRole,
) -> ServiceResult<Member>
where
    R: MemberReader + ?Sized,
{
    let organization_id = user.organization().ok_or(ServiceError::Unauthorized)?;
    let user_id = user.user_id().map_err(|_| ServiceError::Unauthorized)?;

    let member = repo
        .get_member_for_user(organization_id, &user_id)
        .map_err(|err| {
            log::error!("Failed to load membership of {user_id}: {err}");
            err
        })?
        .ok_or(ServiceError::Unauthorized)?;

    if !member.role.at_least(required) {
        return Err(ServiceError::Unauthorized);
    }
    Ok(member)
}

/// Returns the caller's active organization when their role is at least `required`.
pub fn ensure_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    required: MemberRole,
) -> ServiceResult<OrganizationId>
where
    R: MemberReader + ?Sized,
{
    ensure_member(repo, user, required).map(|member| member.organization_id)
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime, Utc};

    use crate::auth::AuthenticatedUser;
    use crate::domain::followup::{Followup, FollowupPriority, FollowupState};
    use crate::domain::member::{Member, MemberRole};
    use crate::domain::organization::Organization;
    use crate::domain::types::{
        EmailAddress, EmailSubject, FollowupId, MemberId, OrganizationId, OrganizationName,
        UserId,
    };
    use crate::repository::mock::MockRepository;

    pub const ORG: i32 = 7;

    pub fn org() -> OrganizationId {
        OrganizationId::new(ORG).unwrap()
    }

    pub fn user(role: MemberRole) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: format!("{role}-1"),
            email: format!("{role}@example.com"),
            name: "Test User".to_string(),
            organization_id: Some(ORG),
            role: Some(role),
            branding: None,
            exp: 0,
        }
    }

    pub fn user_without_organization() -> AuthenticatedUser {
        AuthenticatedUser {
            organization_id: None,
            role: None,
            ..user(MemberRole::Member)
        }
    }

    pub fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    pub fn organization(id: i32) -> Organization {
        let now = Utc::now().naive_utc();
        Organization {
            id: OrganizationId::new(id).unwrap(),
            name: OrganizationName::new(format!("Org {id}")).unwrap(),
            logo_url: None,
            primary_color: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn member(id: i32, role: MemberRole) -> Member {
        Member {
            id: MemberId::new(id).unwrap(),
            organization_id: org(),
            user_id: Some(UserId::new(format!("user-{id}")).unwrap()),
            email: EmailAddress::new(format!("user{id}@example.com")).unwrap(),
            name: None,
            role,
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Mock whose membership lookup finds the caller with `role`.
    pub fn mock_for(role: MemberRole) -> MockRepository {
        let mut repo = MockRepository::new();
        repo.expect_get_member_for_user()
            .returning(move |organization_id, user_id| {
                Ok(Some(Member {
                    organization_id,
                    user_id: Some(user_id.clone()),
                    ..member(1, role)
                }))
            });
        repo
    }

    pub fn followup(id: i32, owner: &str, due_at: NaiveDateTime) -> Followup {
        let now = Utc::now().naive_utc();
        Followup {
            id: FollowupId::new(id).unwrap(),
            organization_id: org(),
            owner_user_id: UserId::new(owner).unwrap(),
            contact_id: None,
            email_id: None,
            subject: EmailSubject::new(format!("Follow-up {id}")).unwrap(),
            notes: None,
            due_at,
            priority: FollowupPriority::Normal,
            state: FollowupState::Open,
            completion_reason: None,
            snooze_count: 0,
            reminded_at: None,
            draft: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
