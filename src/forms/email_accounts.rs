use serde::Deserialize;

use crate::domain::email_account::{
    EmailProvider, NewEmailAccount, UpdateEmailAccount, validate_sync_interval,
};
use crate::domain::types::{EmailAddress, OrganizationId, UserId};
use crate::forms::{FormError, non_blank};

fn default_sync_interval() -> i32 {
    15
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct NewEmailAccountForm {
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub provider: String,
    #[serde(default = "default_true")]
    pub auto_sync: bool,
    #[serde(default = "default_sync_interval")]
    pub sync_interval_minutes: i32,
}

impl NewEmailAccountForm {
    pub fn into_domain(
        self,
        organization_id: OrganizationId,
        user_id: UserId,
    ) -> Result<NewEmailAccount, FormError> {
        Ok(NewEmailAccount {
            organization_id,
            user_id,
            email: EmailAddress::new(self.email).map_err(|_| FormError::InvalidEmail)?,
            display_name: non_blank(self.display_name),
            provider: self
                .provider
                .parse::<EmailProvider>()
                .map_err(|err| FormError::field("provider", err))?,
            auto_sync: self.auto_sync,
            sync_interval_minutes: validate_sync_interval(self.sync_interval_minutes)
                .map_err(|err| FormError::field("sync_interval_minutes", err))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmailAccountForm {
    #[serde(default)]
    pub display_name: Option<String>,
    pub auto_sync: bool,
    pub sync_interval_minutes: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl TryFrom<UpdateEmailAccountForm> for UpdateEmailAccount {
    type Error = FormError;

    fn try_from(form: UpdateEmailAccountForm) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: non_blank(form.display_name),
            auto_sync: form.auto_sync,
            sync_interval_minutes: validate_sync_interval(form.sync_interval_minutes)
                .map_err(|err| FormError::field("sync_interval_minutes", err))?,
            is_active: form.is_active,
        })
    }
}
