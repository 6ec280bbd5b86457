//! Organization lifecycle: creation, branding and deletion.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::auth::{AuthenticatedUser, TOKEN_LIFETIME_DAYS};
use crate::domain::member::{Member, MemberRole};
use crate::domain::organization::{Organization, OrganizationOwner};
use crate::domain::smart_folder::FolderRules;
use crate::domain::types::{FolderName, PersonName, WebUrl};
use crate::dto::session::ReissuedSession;
use crate::forms::organizations::{LogoPayload, OrganizationForm, OrganizationPayload};
use crate::repository::{
    MemberReader, MemberWriter, OrganizationReader, OrganizationWriter, PreferencesReader,
    PreferencesWriter,
};
use crate::services::session::{apply_membership, enrich_session, remember_active_organization};
use crate::services::{ServiceError, ServiceResult, ensure_member, ensure_role};

const LOGO_URL_PREFIX: &str = "/uploads/logos/";

fn seeded_folders() -> ServiceResult<Vec<(FolderName, FolderRules)>> {
    FolderRules::seeded_folders()
        .into_iter()
        .map(|(name, rules)| Ok((FolderName::new(name)?, rules)))
        .collect()
}

/// Creates an organization owned by the caller and switches the session to it.
pub fn create_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: OrganizationForm,
) -> ServiceResult<ReissuedSession<Organization>>
where
    R: OrganizationWriter + MemberReader + PreferencesReader + PreferencesWriter + ?Sized,
{
    let payload = OrganizationPayload::try_from(form)?;
    let owner = OrganizationOwner {
        user_id: user.user_id()?,
        email: user.email_address()?,
        name: PersonName::new(user.name.as_str()).ok(),
    };

    let organization = repo
        .create_organization(&payload.into_new(), &owner, &seeded_folders()?)
        .map_err(|err| {
            log::error!("Failed to create organization: {err}");
            err
        })?;
    log::info!(
        "Organization {} created by {}",
        organization.id,
        owner.user_id
    );

    remember_active_organization(repo, user, organization.id)?;
    let member = repo
        .get_member_for_user(organization.id, &owner.user_id)?
        .ok_or_else(|| ServiceError::Internal("owner membership missing".to_string()))?;

    let mut user = user.clone();
    apply_membership(&mut user, Some((&organization, &member)));
    user.set_expiration(TOKEN_LIFETIME_DAYS);

    Ok(ReissuedSession {
        user,
        value: organization,
    })
}

pub fn get_current_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
) -> ServiceResult<Organization>
where
    R: MemberReader + OrganizationReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    repo.get_organization_by_id(organization_id)
        .map_err(|err| {
            log::error!("Failed to load organization: {err}");
            err
        })?
        .ok_or(ServiceError::NotFound)
}

/// Refreshes the branding and role carried by the session after a change.
fn reissue(
    user: &AuthenticatedUser,
    caller: &Member,
    organization: Organization,
) -> ReissuedSession<Organization> {
    let mut user = user.clone();
    user.role = Some(caller.role);
    user.branding = Some(organization.branding());
    ReissuedSession {
        user,
        value: organization,
    }
}

pub fn update_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: OrganizationForm,
) -> ServiceResult<ReissuedSession<Organization>>
where
    R: MemberReader + OrganizationWriter + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Admin)?;
    let payload = OrganizationPayload::try_from(form)?;

    let organization = repo
        .update_organization(caller.organization_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update organization: {err}");
            err
        })?;

    Ok(reissue(user, &caller, organization))
}

/// Removes a logo file stored by [`upload_logo`]. Urls pointing elsewhere are
/// left alone.
fn remove_stored_logo(upload_dir: &str, logo_url: &WebUrl) {
    let Some(file_name) = logo_url.as_str().strip_prefix(LOGO_URL_PREFIX) else {
        return;
    };
    if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
        return;
    }
    if let Err(err) = fs::remove_file(Path::new(upload_dir).join("logos").join(file_name)) {
        log::warn!("Failed to remove logo {file_name}: {err}");
    }
}

/// Stores the uploaded logo under `{upload_dir}/logos/` and links it. The
/// previous logo file is removed once the new one is linked.
pub fn upload_logo<R>(
    repo: &R,
    user: &AuthenticatedUser,
    logo: LogoPayload,
    upload_dir: &str,
) -> ServiceResult<ReissuedSession<Organization>>
where
    R: MemberReader + OrganizationReader + OrganizationWriter + ?Sized,
{
    let caller = ensure_member(repo, user, MemberRole::Admin)?;
    let organization_id = caller.organization_id;
    let previous = repo
        .get_organization_by_id(organization_id)?
        .ok_or(ServiceError::NotFound)?
        .logo_url;

    let directory = Path::new(upload_dir).join("logos");
    fs::create_dir_all(&directory).map_err(|err| {
        log::error!("Failed to create logo directory: {err}");
        ServiceError::Internal(err.to_string())
    })?;

    let file_name = format!("{organization_id}-{}.{}", Uuid::new_v4(), logo.extension);
    fs::copy(&logo.source, directory.join(&file_name)).map_err(|err| {
        log::error!("Failed to store logo: {err}");
        ServiceError::Internal(err.to_string())
    })?;

    let logo_url = WebUrl::new(format!("{LOGO_URL_PREFIX}{file_name}"))?;
    let organization = match repo.set_organization_logo(organization_id, &logo_url) {
        Ok(organization) => organization,
        Err(err) => {
            log::error!("Failed to save logo url: {err}");
            remove_stored_logo(upload_dir, &logo_url);
            return Err(err.into());
        }
    };
    if let Some(previous) = previous.filter(|previous| *previous != logo_url) {
        remove_stored_logo(upload_dir, &previous);
    }

    Ok(reissue(user, &caller, organization))
}

pub fn get_logo<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<WebUrl>
where
    R: MemberReader + OrganizationReader + ?Sized,
{
    get_current_organization(repo, user)?
        .logo_url
        .ok_or(ServiceError::NotFound)
}

/// Deletes the active organization together with its stored logo and falls
/// back to another membership.
pub fn delete_organization<R>(
    repo: &R,
    user: &AuthenticatedUser,
    upload_dir: &str,
) -> ServiceResult<AuthenticatedUser>
where
    R: MemberReader + OrganizationWriter + OrganizationReader + MemberWriter + PreferencesReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Owner)?;
    let logo_url = repo
        .get_organization_by_id(organization_id)?
        .and_then(|organization| organization.logo_url);

    repo.delete_organization(organization_id).map_err(|err| {
        log::error!("Failed to delete organization: {err}");
        err
    })?;
    log::info!("Organization {organization_id} deleted by {}", user.sub);
    if let Some(logo_url) = logo_url {
        remove_stored_logo(upload_dir, &logo_url);
    }

    let mut user = user.clone();
    user.clear_organization();
    enrich_session(repo, user)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::member::MemberRole;
    use crate::repository::mock::MockRepository;
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{
        member, mock_for, org, organization, user, user_without_organization,
    };

    fn form(name: &str) -> OrganizationForm {
        OrganizationForm {
            name: name.to_string(),
            primary_color: Some("#123456".to_string()),
        }
    }

    #[test]
    fn create_seeds_folders_and_makes_caller_owner() {
        let mut repo = MockRepository::new();
        repo.expect_create_organization()
            .withf(|new_org, owner, folders| {
                new_org.name.as_str() == "Acme"
                    && owner.user_id.as_str() == "member-1"
                    && folders.len() == 3
                    && folders[0].0.as_str() == "Overdue"
            })
            .times(1)
            .returning(|_, _, _| Ok(organization(5)));
        repo.expect_get_preferences().returning(|_| Ok(None));
        repo.expect_save_preferences()
            .times(1)
            .returning(|prefs| Ok(prefs.clone()));
        repo.expect_get_member_for_user()
            .returning(|_, _| Ok(Some(member(1, MemberRole::Owner))));

        let session = create_organization(&repo, &user_without_organization(), form("Acme"))
            .unwrap();

        assert_eq!(session.user.organization_id, Some(5));
        assert_eq!(session.user.role, Some(MemberRole::Owner));
        assert_eq!(session.value.id.get(), 5);
    }

    #[test]
    fn create_rejects_blank_name() {
        let mut repo = MockRepository::new();
        repo.expect_create_organization().times(0);

        let result = create_organization(&repo, &user_without_organization(), form("  "));

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn update_requires_admin() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_update_organization().times(0);

        let result = update_organization(&repo, &user(MemberRole::Member), form("Acme"));

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn update_refreshes_branding() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_update_organization()
            .withf(|id, updates| *id == org() && updates.name.as_str() == "Renamed")
            .times(1)
            .returning(|id, _| {
                let mut organization = organization(id.get());
                organization.name = crate::domain::types::OrganizationName::new("Renamed")?;
                Ok(organization)
            });

        let session = update_organization(&repo, &user(MemberRole::Admin), form("Renamed")).unwrap();

        assert_eq!(session.user.branding.unwrap().name, "Renamed");
    }

    #[test]
    fn logo_lookup_reports_missing_logo() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_organization_by_id()
            .returning(|id| Ok(Some(organization(id.get()))));

        let result = get_logo(&repo, &user(MemberRole::Member));

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn upload_logo_copies_file_and_links_it() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload.png");
        std::fs::write(&source, b"png").unwrap();

        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_organization_by_id()
            .returning(|id| Ok(Some(organization(id.get()))));
        repo.expect_set_organization_logo()
            .withf(|_, url| url.as_str().starts_with("/uploads/logos/7-") && url.as_str().ends_with(".png"))
            .times(1)
            .returning(|id, url| {
                let mut organization = organization(id.get());
                organization.logo_url = Some(url.clone());
                Ok(organization)
            });

        let session = upload_logo(
            &repo,
            &user(MemberRole::Admin),
            LogoPayload {
                source,
                extension: "png",
            },
            dir.path().to_str().unwrap(),
        )
        .unwrap();

        let stored = std::fs::read_dir(dir.path().join("logos")).unwrap().count();
        assert_eq!(stored, 1);
        assert!(session.user.branding.unwrap().logo_url.is_some());
    }

    #[test]
    fn only_owners_delete() {
        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_delete_organization().times(0);

        let result = delete_organization(&repo, &user(MemberRole::Admin), "uploads");

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn delete_falls_back_to_next_membership() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_get_organization_by_id()
            .returning(|id| Ok(Some(organization(id.get()))));
        repo.expect_delete_organization()
            .withf(|id| *id == org())
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_claim_invitations().returning(|_, _| Ok(0));
        repo.expect_list_organizations_for_user()
            .returning(|_| Ok(vec![(organization(9), member(3, MemberRole::Member))]));
        repo.expect_get_preferences().returning(|_| Ok(None));

        let user = delete_organization(&repo, &user(MemberRole::Owner), "uploads").unwrap();

        assert_eq!(user.organization_id, Some(9));
    }

    #[test]
    fn replacing_logo_removes_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let logos = dir.path().join("logos");
        std::fs::create_dir_all(&logos).unwrap();
        std::fs::write(logos.join("7-old.png"), b"old").unwrap();
        let source = dir.path().join("upload.png");
        std::fs::write(&source, b"new").unwrap();

        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_organization_by_id().returning(|id| {
            let mut organization = organization(id.get());
            organization.logo_url = Some(WebUrl::new("/uploads/logos/7-old.png")?);
            Ok(Some(organization))
        });
        repo.expect_set_organization_logo().returning(|id, url| {
            let mut organization = organization(id.get());
            organization.logo_url = Some(url.clone());
            Ok(organization)
        });

        upload_logo(
            &repo,
            &user(MemberRole::Admin),
            LogoPayload {
                source,
                extension: "png",
            },
            dir.path().to_str().unwrap(),
        )
        .unwrap();

        assert!(!logos.join("7-old.png").exists());
        assert_eq!(std::fs::read_dir(&logos).unwrap().count(), 1);
    }

    #[test]
    fn failed_logo_link_leaves_no_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("upload.png");
        std::fs::write(&source, b"png").unwrap();

        let mut repo = mock_for(MemberRole::Admin);
        repo.expect_get_organization_by_id()
            .returning(|id| Ok(Some(organization(id.get()))));
        repo.expect_set_organization_logo()
            .returning(|_, _| Err(RepositoryError::Unexpected("disk full".into())));

        let result = upload_logo(
            &repo,
            &user(MemberRole::Admin),
            LogoPayload {
                source,
                extension: "png",
            },
            dir.path().to_str().unwrap(),
        );

        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path().join("logos")).unwrap().count(), 0);
    }

    #[test]
    fn foreign_logo_urls_are_never_removed() {
        let dir = tempfile::tempdir().unwrap();
        let outside = dir.path().join("keep.png");
        std::fs::write(&outside, b"keep").unwrap();

        remove_stored_logo(
            dir.path().join("logos").to_str().unwrap(),
            &WebUrl::new("/uploads/logos/../../keep.png").unwrap(),
        );
        remove_stored_logo(
            dir.path().to_str().unwrap(),
            &WebUrl::new("https://cdn.example.com/keep.png").unwrap(),
        );

        assert!(outside.exists());
    }
}
