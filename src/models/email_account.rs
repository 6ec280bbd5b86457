use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::email_account::{
    EmailAccount as DomainEmailAccount, NewEmailAccount as DomainNewEmailAccount,
    UpdateEmailAccount as DomainUpdateEmailAccount,
};
use crate::domain::types::{
    EmailAccountId, EmailAddress, OrganizationId, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::email_accounts)]
pub struct EmailAccount {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub provider: String,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
    pub last_synced_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::email_accounts)]
pub struct NewEmailAccount<'a> {
    pub organization_id: i32,
    pub user_id: &'a str,
    pub email: &'a str,
    pub display_name: Option<&'a str>,
    pub provider: &'a str,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::email_accounts)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateEmailAccount<'a> {
    pub display_name: Option<&'a str>,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    pub is_active: bool,
}

impl TryFrom<EmailAccount> for DomainEmailAccount {
    type Error = TypeConstraintError;

    fn try_from(account: EmailAccount) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmailAccountId::new(account.id)?,
            organization_id: OrganizationId::new(account.organization_id)?,
            user_id: UserId::new(account.user_id)?,
            email: EmailAddress::new(account.email)?,
            display_name: account.display_name,
            provider: account.provider.parse()?,
            auto_sync: account.auto_sync,
            sync_interval_minutes: account.sync_interval_minutes,
            is_active: account.is_active,
            last_synced_at: account.last_synced_at,
            created_at: account.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewEmailAccount> for NewEmailAccount<'a> {
    fn from(account: &'a DomainNewEmailAccount) -> Self {
        Self {
            organization_id: account.organization_id.get(),
            user_id: account.user_id.as_str(),
            email: account.email.as_str(),
            display_name: account.display_name.as_deref(),
            provider: account.provider.as_str(),
            auto_sync: account.auto_sync,
            sync_interval_minutes: account.sync_interval_minutes,
        }
    }
}

impl<'a> From<&'a DomainUpdateEmailAccount> for UpdateEmailAccount<'a> {
    fn from(account: &'a DomainUpdateEmailAccount) -> Self {
        Self {
            display_name: account.display_name.as_deref(),
            auto_sync: account.auto_sync,
            sync_interval_minutes: account.sync_interval_minutes,
            is_active: account.is_active,
        }
    }
}
