//! Organizations are the tenants every other record hangs off.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAddress, HexColor, OrganizationId, OrganizationName, PersonName, UserId, WebUrl,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: OrganizationName,
    pub logo_url: Option<WebUrl>,
    pub primary_color: Option<HexColor>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Organization {
    /// Branding snapshot carried inside the session token.
    pub fn branding(&self) -> Branding {
        Branding {
            name: self.name.as_str().to_string(),
            logo_url: self.logo_url.as_ref().map(|url| url.as_str().to_string()),
            primary_color: self.primary_color.as_ref().map(|c| c.as_str().to_string()),
        }
    }
}

/// Presentation attributes of an organization as exposed to the UI.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Branding {
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewOrganization {
    pub name: OrganizationName,
    pub primary_color: Option<HexColor>,
}

impl NewOrganization {
    #[must_use]
    pub fn new(name: OrganizationName, primary_color: Option<HexColor>) -> Self {
        Self {
            name,
            primary_color,
        }
    }
}

/// User that becomes the first owner of a new organization.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganizationOwner {
    pub user_id: UserId,
    pub email: EmailAddress,
    pub name: Option<PersonName>,
}

#[derive(Clone, Debug)]
pub struct UpdateOrganization {
    pub name: OrganizationName,
    pub primary_color: Option<HexColor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn branding_copies_presentation_fields() {
        let now = Utc::now().naive_utc();
        let organization = Organization {
            id: OrganizationId::new(1).unwrap(),
            name: OrganizationName::new("Acme").unwrap(),
            logo_url: Some(WebUrl::new("/uploads/logos/1.png").unwrap()),
            primary_color: Some(HexColor::new("#FF0000").unwrap()),
            created_at: now,
            updated_at: now,
        };

        let branding = organization.branding();

        assert_eq!(branding.name, "Acme");
        assert_eq!(branding.logo_url.as_deref(), Some("/uploads/logos/1.png"));
        assert_eq!(branding.primary_color.as_deref(), Some("#ff0000"));
    }
}
