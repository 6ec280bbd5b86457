//! Team management inside the active organization.

use crate::auth::AuthenticatedUser;
use crate::domain::member::{Member, MemberRole, NewMember};
use crate::domain::types::{MemberId, OrganizationId};
use crate::forms::members::{AddMemberForm, AddMemberPayload, ChangeRoleForm};
use crate::repository::{MemberReader, MemberWriter};
use crate::services::{ServiceError, ServiceResult, ensure_member, ensure_role};

const LAST_OWNER: &str = "an organization must keep at least one owner";

pub fn list_members<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<Member>>
where
    R: MemberReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.list_members(organization_id).map_err(|err| {
        log::error!("Failed to list members: {err}");
        err.into()
    })
}

/// Invites `email` into the organization. The invitation is claimed when
/// the invited user signs in.
pub fn add_member<R>(repo: &R, user: &AuthenticatedUser, form: AddMemberForm) -> ServiceResult<Member>
where
    R: MemberReader + MemberWriter + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Admin)?;
    let organization_id = caller.organization_id;
    let payload = AddMemberPayload::try_from(form)?;

    if payload.role == MemberRole::Owner && caller.role != MemberRole::Owner {
        return Err(ServiceError::Unauthorized);
    }

    let member = repo
        .create_member(&NewMember::invite(
            organization_id,
            payload.email,
            payload.name,
            payload.role,
        ))
        .map_err(|err| {
            log::error!("Failed to add member: {err}");
            err
        })?;
    log::info!(
        "Member {} invited to organization {organization_id} as {}",
        member.email,
        member.role
    );
    Ok(member)
}

fn load_member<R>(repo: &R, organization_id: OrganizationId, member_id: i32) -> ServiceResult<Member>
where
    R: MemberReader + ?Sized,
{
    let member_id = MemberId::new(member_id)?;
    repo.get_member_by_id(organization_id, member_id)?
        .ok_or(ServiceError::NotFound)
}

/// Fails when `member` is the only owner left.
fn ensure_not_last_owner<R>(repo: &R, member: &Member) -> ServiceResult<()>
where
    R: MemberReader + ?Sized,
{
    if member.role == MemberRole::Owner && repo.count_owners(member.organization_id)? <= 1 {
        return Err(ServiceError::Conflict(LAST_OWNER.to_string()));
    }
    Ok(())
}

pub fn change_member_role<R>(
    repo: &R,
    user: &AuthenticatedUser,
    member_id: i32,
    form: ChangeRoleForm,
) -> ServiceResult<Member>
where
    R: MemberReader + MemberWriter + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Admin)?;
    let organization_id = caller.organization_id;
    let role = MemberRole::try_from(form)?;
    let member = load_member(repo, organization_id, member_id)?;

    let touches_owner = member.role == MemberRole::Owner || role == MemberRole::Owner;
    if touches_owner && caller.role != MemberRole::Owner {
        return Err(ServiceError::Unauthorized);
    }
    if member.role == role {
        return Ok(member);
    }
    ensure_not_last_owner(repo, &member)?;

    let updated = repo
        .update_member_role(organization_id, member.id, role)
        .map_err(|err| {
            log::error!("Failed to change member role: {err}");
            err
        })?;
    log::info!(
        "Member {} of organization {organization_id} is now {role}",
        updated.id
    );
    Ok(updated)
}

pub fn remove_member<R>(repo: &R, user: &AuthenticatedUser, member_id: i32) -> ServiceResult<()>
where
    R: MemberReader + MemberWriter + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Admin)?;
    let organization_id = caller.organization_id;
    let member = load_member(repo, organization_id, member_id)?;

    if member.role == MemberRole::Owner && caller.role != MemberRole::Owner {
        return Err(ServiceError::Unauthorized);
    }
    ensure_not_last_owner(repo, &member)?;

    repo.delete_member(organization_id, member.id)
        .map_err(|err| {
            log::error!("Failed to remove member: {err}");
            err
        })?;
    log::info!("Member {} removed from organization {organization_id}", member.id);
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{member, mock_for, org, user};

    fn add_form(role: &str) -> AddMemberForm {
        AddMemberForm {
            email: "new@example.com".to_string(),
            name: Some("New Person".to_string()),
            role: role.to_string(),
        }
    }

    fn role_form(role: &str) -> ChangeRoleForm {
        ChangeRoleForm {
            role: role.to_string(),
        }
    }

    #[test]
    fn members_cannot_invite() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_create_member().times(0);

        let result = add_member(&repo, &user(MemberRole::Member), add_form("member"));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admins_cannot_grant_owner() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_create_member().times(0);

        let result = add_member(&repo, &user(MemberRole::Admin), add_form("owner"));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_invites_pending_member() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_create_member()
            .withf(|new| {
                new.organization_id == org()
                    && new.user_id.is_none()
                    && new.email.as_str() == "new@example.com"
                    && new.role == MemberRole::Admin
            })
            .times(1)
            .returning(|new| {
                let mut invited = member(5, new.role);
                invited.user_id = None;
                invited.email = new.email.clone();
                Ok(invited)
            });

        let invited = add_member(&repo, &user(MemberRole::Admin), add_form("admin")).unwrap();

        assert!(invited.is_pending());
    }

    #[test]
    fn duplicate_invite_is_a_conflict() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_create_member()
            .returning(|_| Err(RepositoryError::Conflict("member already exists".into())));

        let result = add_member(&repo, &user(MemberRole::Owner), add_form("member"));

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn last_owner_cannot_be_demoted() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_get_member_by_id()
            .returning(|_, id| Ok(Some(member(id.get(), MemberRole::Owner))));
        repo.expect_count_owners().returning(|_| Ok(1));
        repo.expect_update_member_role().times(0);

        let result = change_member_role(&repo, &user(MemberRole::Owner), 2, role_form("admin"));

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn owner_demotes_one_of_several_owners() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_get_member_by_id()
            .returning(|_, id| Ok(Some(member(id.get(), MemberRole::Owner))));
        repo.expect_count_owners().returning(|_| Ok(2));
        repo.expect_update_member_role()
            .withf(|_, id, role| id.get() == 2 && *role == MemberRole::Member)
            .times(1)
            .returning(|_, id, role| Ok(member(id.get(), role)));

        let updated =
            change_member_role(&repo, &user(MemberRole::Owner), 2, role_form("member")).unwrap();

        assert_eq!(updated.role, MemberRole::Member);
    }

    #[test]
    fn admins_cannot_touch_owners() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_member_by_id()
            .returning(|_, id| Ok(Some(member(id.get(), MemberRole::Owner))));
        repo.expect_update_member_role().times(0);
        repo.expect_delete_member().times(0);

        let demote = change_member_role(&repo, &user(MemberRole::Admin), 2, role_form("member"));
        let remove = remove_member(&repo, &user(MemberRole::Admin), 2);

        assert!(matches!(demote, Err(ServiceError::Unauthorized)));
        assert!(matches!(remove, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn admin_removes_member() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_member_by_id()
            .returning(|_, id| Ok(Some(member(id.get(), MemberRole::Member))));
        repo.expect_delete_member()
            .withf(|organization_id, id| *organization_id == org() && id.get() == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        assert!(remove_member(&repo, &user(MemberRole::Admin), 3).is_ok());
    }

    #[test]
    fn removing_unknown_member_is_not_found() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_get_member_by_id().returning(|_, _| Ok(None));

        let result = remove_member(&repo, &user(MemberRole::Owner), 42);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn stale_owner_claims_do_not_grant_owner_rights() {
        // Demoted to admin after the session was issued.
        let repo = mock_for(MemberRole::Admin);

        let result = add_member(&repo, &user(MemberRole::Owner), add_form("owner"));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn removed_member_cannot_manage_the_team() {
        let mut repo = MockRepository::new();
        repo.expect_get_member_for_user().returning(|_, _| Ok(None));
        repo.expect_create_member().times(0);
        repo.expect_delete_member().times(0);

        let invite = add_member(&repo, &user(MemberRole::Owner), add_form("member"));
        let remove = remove_member(&repo, &user(MemberRole::Owner), 2);

        assert!(matches!(invite, Err(ServiceError::Unauthorized)));
        assert!(matches!(remove, Err(ServiceError::Unauthorized)));
    }
}
