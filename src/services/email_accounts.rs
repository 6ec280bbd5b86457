//! Mailboxes owned by the signed-in user. Other members' accounts stay hidden.

use chrono::Utc;

use crate::auth::AuthenticatedUser;
use crate::domain::email_account::{EmailAccount, UpdateEmailAccount};
use crate::domain::member::MemberRole;
use crate::domain::types::{EmailAccountId, OrganizationId, UserId};
use crate::forms::email_accounts::{NewEmailAccountForm, UpdateEmailAccountForm};
use crate::repository::{EmailAccountReader, EmailAccountWriter, MemberReader};
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub fn list_email_accounts<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Vec<EmailAccount>>
where
    R: MemberReader + EmailAccountReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let user_id = user.user_id()?;
    repo.list_email_accounts(organization_id, &user_id)
        .map_err(|err| {
            log::error!("Failed to list email accounts: {err}");
            err.into()
        })
}

/// Loads an account of the caller; accounts of other users look missing.
pub(crate) fn load_own_account<R>(
    repo: &R,
    organization_id: OrganizationId,
    user_id: &UserId,
    account_id: EmailAccountId,
) -> ServiceResult<EmailAccount>
where
    R: EmailAccountReader + ?Sized,
{
    repo.get_email_account_by_id(organization_id, account_id)?
        .filter(|account| &account.user_id == user_id)
        .ok_or(ServiceError::NotFound)
}

pub fn create_email_account<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: NewEmailAccountForm,
) -> ServiceResult<EmailAccount>
where
    R: MemberReader + EmailAccountWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let new_account = form.into_domain(organization_id, user.user_id()?)?;

    let account = repo.create_email_account(&new_account).map_err(|err| {
        log::error!("Failed to create email account: {err}");
        err
    })?;
    log::info!("Email account {} connected by {}", account.email, account.user_id);
    Ok(account)
}

pub fn update_email_account<R>(
    repo: &R,
    user: &AuthenticatedUser,
    account_id: i32,
    form: UpdateEmailAccountForm,
) -> ServiceResult<EmailAccount>
where
    R: MemberReader + EmailAccountReader + EmailAccountWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let updates = UpdateEmailAccount::try_from(form)?;
    let account = load_own_account(
        repo,
        organization_id,
        &user.user_id()?,
        EmailAccountId::new(account_id)?,
    )?;

    let account = repo
        .update_email_account(organization_id, account.id, &updates)
        .map_err(|err| {
            log::error!("Failed to update email account: {err}");
            err
        })?;
    Ok(account)
}

pub fn delete_email_account<R>(repo: &R, user: &AuthenticatedUser, account_id: i32) -> ServiceResult<()>
where
    R: MemberReader + EmailAccountReader + EmailAccountWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let account = load_own_account(
        repo,
        organization_id,
        &user.user_id()?,
        EmailAccountId::new(account_id)?,
    )?;

    repo.delete_email_account(organization_id, account.id)
        .map_err(|err| {
            log::error!("Failed to delete email account: {err}");
            err
        })?;
    log::info!("Email account {} disconnected", account.email);
    Ok(())
}

/// Records that the mailbox was synchronized just now.
pub fn mark_synced<R>(repo: &R, user: &AuthenticatedUser, account_id: i32) -> ServiceResult<EmailAccount>
where
    R: MemberReader + EmailAccountReader + EmailAccountWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let account = load_own_account(
        repo,
        organization_id,
        &user.user_id()?,
        EmailAccountId::new(account_id)?,
    )?;

    let account = repo
        .mark_email_account_synced(organization_id, account.id, Utc::now().naive_utc())
        .map_err(|err| {
            log::error!("Failed to mark email account synced: {err}");
            err
        })?;
    Ok(account)
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod tests {
    use super::*;
    use crate::domain::email_account::EmailProvider;
    use crate::domain::types::EmailAddress;
    use crate::repository::errors::RepositoryError;
    use crate::services::test_support::{mock_for, org, user};

    pub(crate) fn account(id: i32, owner: &str) -> EmailAccount {
        EmailAccount {
            id: EmailAccountId::new(id).unwrap(),
            organization_id: org(),
            user_id: UserId::new(owner).unwrap(),
            email: EmailAddress::new(format!("box{id}@example.com")).unwrap(),
            display_name: None,
            provider: EmailProvider::Gmail,
            auto_sync: true,
            sync_interval_minutes: 15,
            is_active: true,
            last_synced_at: None,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn update_form() -> UpdateEmailAccountForm {
        UpdateEmailAccountForm {
            display_name: Some("Sales".to_string()),
            auto_sync: false,
            sync_interval_minutes: 30,
            is_active: true,
        }
    }

    #[test]
    fn create_assigns_caller_as_owner() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_create_email_account()
            .withf(|new| new.user_id.as_str() == "member-1" && new.provider == EmailProvider::Outlook)
            .times(1)
            .returning(|new| {
                let mut created = account(1, new.user_id.as_str());
                created.provider = new.provider;
                Ok(created)
            });

        let created = create_email_account(
            &repo,
            &user(MemberRole::Member),
            NewEmailAccountForm {
                email: "me@example.com".to_string(),
                display_name: None,
                provider: "outlook".to_string(),
                auto_sync: true,
                sync_interval_minutes: 15,
            },
        )
        .unwrap();

        assert_eq!(created.provider, EmailProvider::Outlook);
    }

    #[test]
    fn duplicate_account_is_a_conflict() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_create_email_account()
            .returning(|_| Err(RepositoryError::Conflict("email account already exists".into())));

        let result = create_email_account(
            &repo,
            &user(MemberRole::Member),
            NewEmailAccountForm {
                email: "me@example.com".to_string(),
                display_name: None,
                provider: "imap".to_string(),
                auto_sync: true,
                sync_interval_minutes: 15,
            },
        );

        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn accounts_of_other_users_are_hidden() {
        let mut repo = mock_for(MemberRole::Owner);
        repo.expect_get_email_account_by_id()
            .returning(|_, id| Ok(Some(account(id.get(), "someone-else"))));
        repo.expect_update_email_account().times(0);
        repo.expect_delete_email_account().times(0);

        let user = user(MemberRole::Owner);
        assert!(matches!(
            update_email_account(&repo, &user, 1, update_form()),
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            delete_email_account(&repo, &user, 1),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn owner_updates_settings() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_email_account_by_id()
            .returning(|_, id| Ok(Some(account(id.get(), "member-1"))));
        repo.expect_update_email_account()
            .withf(|_, _, updates| !updates.auto_sync && updates.sync_interval_minutes == 30)
            .times(1)
            .returning(|_, id, updates| {
                let mut updated = account(id.get(), "member-1");
                updated.auto_sync = updates.auto_sync;
                Ok(updated)
            });

        let updated =
            update_email_account(&repo, &user(MemberRole::Member), 1, update_form()).unwrap();

        assert!(!updated.auto_sync);
    }

    #[test]
    fn interval_out_of_range_is_rejected() {
        let repo = mock_for(MemberRole::Member);
        let mut form = update_form();
        form.sync_interval_minutes = 2;

        let result = update_email_account(&repo, &user(MemberRole::Member), 1, form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn mark_synced_stamps_account() {
        let mut repo = mock_for(MemberRole::Member);
        repo.expect_get_email_account_by_id()
            .returning(|_, id| Ok(Some(account(id.get(), "member-1"))));
        repo.expect_mark_email_account_synced()
            .times(1)
            .returning(|_, id, at| {
                let mut synced = account(id.get(), "member-1");
                synced.last_synced_at = Some(at);
                Ok(synced)
            });

        let synced = mark_synced(&repo, &user(MemberRole::Member), 1).unwrap();

        assert!(synced.last_synced_at.is_some());
    }
}
