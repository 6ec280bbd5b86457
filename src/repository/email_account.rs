use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::email_account::{EmailAccount, NewEmailAccount, UpdateEmailAccount};
use crate::domain::types::{EmailAccountId, OrganizationId, UserId};
use crate::models::email_account::{
    EmailAccount as DbEmailAccount, NewEmailAccount as DbNewEmailAccount,
    UpdateEmailAccount as DbUpdateEmailAccount,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, EmailAccountReader, EmailAccountWriter};
use crate::schema::email_accounts;

impl EmailAccountReader for DieselRepository {
    fn get_email_account_by_id(
        &self,
        organization_id: OrganizationId,
        id: EmailAccountId,
    ) -> RepositoryResult<Option<EmailAccount>> {
        let mut conn = self.conn()?;
        let account = email_accounts::table
            .filter(email_accounts::id.eq(id.get()))
            .filter(email_accounts::organization_id.eq(organization_id.get()))
            .first::<DbEmailAccount>(&mut conn)
            .optional()?;

        Ok(account.map(EmailAccount::try_from).transpose()?)
    }

    fn list_email_accounts(
        &self,
        organization_id: OrganizationId,
        user_id: &UserId,
    ) -> RepositoryResult<Vec<EmailAccount>> {
        let mut conn = self.conn()?;
        let accounts = email_accounts::table
            .filter(email_accounts::organization_id.eq(organization_id.get()))
            .filter(email_accounts::user_id.eq(user_id.as_str()))
            .order(email_accounts::id.asc())
            .load::<DbEmailAccount>(&mut conn)?;

        Ok(accounts
            .into_iter()
            .map(EmailAccount::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn list_auto_sync_accounts(&self) -> RepositoryResult<Vec<EmailAccount>> {
        let mut conn = self.conn()?;
        let accounts = email_accounts::table
            .filter(email_accounts::is_active.eq(true))
            .filter(email_accounts::auto_sync.eq(true))
            .order(email_accounts::id.asc())
            .load::<DbEmailAccount>(&mut conn)?;

        Ok(accounts
            .into_iter()
            .map(EmailAccount::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl EmailAccountWriter for DieselRepository {
    fn create_email_account(&self, account: &NewEmailAccount) -> RepositoryResult<EmailAccount> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(email_accounts::table)
            .values(DbNewEmailAccount::from(account))
            .get_result::<DbEmailAccount>(&mut conn)?;

        Ok(EmailAccount::try_from(created)?)
    }

    fn update_email_account(
        &self,
        organization_id: OrganizationId,
        id: EmailAccountId,
        updates: &UpdateEmailAccount,
    ) -> RepositoryResult<EmailAccount> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            email_accounts::table
                .filter(email_accounts::id.eq(id.get()))
                .filter(email_accounts::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateEmailAccount::from(updates))
        .get_result::<DbEmailAccount>(&mut conn)?;

        Ok(EmailAccount::try_from(updated)?)
    }

    fn delete_email_account(
        &self,
        organization_id: OrganizationId,
        id: EmailAccountId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            email_accounts::table
                .filter(email_accounts::id.eq(id.get()))
                .filter(email_accounts::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn mark_email_account_synced(
        &self,
        organization_id: OrganizationId,
        id: EmailAccountId,
        synced_at: NaiveDateTime,
    ) -> RepositoryResult<EmailAccount> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            email_accounts::table
                .filter(email_accounts::id.eq(id.get()))
                .filter(email_accounts::organization_id.eq(organization_id.get())),
        )
        .set(email_accounts::last_synced_at.eq(Some(synced_at)))
        .get_result::<DbEmailAccount>(&mut conn)?;

        Ok(EmailAccount::try_from(updated)?)
    }
}
