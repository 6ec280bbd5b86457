use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::organization::{
    NewOrganization as DomainNewOrganization, Organization as DomainOrganization,
    UpdateOrganization as DomainUpdateOrganization,
};
use crate::domain::types::{
    HexColor, OrganizationId, OrganizationName, TypeConstraintError, WebUrl,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::organizations)]
/// Diesel model for [`crate::domain::organization::Organization`].
pub struct Organization {
    pub id: i32,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::organizations)]
pub struct NewOrganization<'a> {
    pub name: &'a str,
    pub primary_color: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::organizations)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateOrganization<'a> {
    pub name: &'a str,
    pub primary_color: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Organization> for DomainOrganization {
    type Error = TypeConstraintError;

    fn try_from(org: Organization) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrganizationId::new(org.id)?,
            name: OrganizationName::new(org.name)?,
            logo_url: org.logo_url.map(WebUrl::new).transpose()?,
            primary_color: org.primary_color.map(HexColor::new).transpose()?,
            created_at: org.created_at,
            updated_at: org.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewOrganization> for NewOrganization<'a> {
    fn from(org: &'a DomainNewOrganization) -> Self {
        Self {
            name: org.name.as_str(),
            primary_color: org.primary_color.as_ref().map(HexColor::as_str),
        }
    }
}

impl<'a> UpdateOrganization<'a> {
    pub fn new(org: &'a DomainUpdateOrganization, now: NaiveDateTime) -> Self {
        Self {
            name: org.name.as_str(),
            primary_color: org.primary_color.as_ref().map(HexColor::as_str),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn rejects_rows_with_broken_branding() {
        let now = Utc::now().naive_utc();
        let row = Organization {
            id: 1,
            name: "Acme".to_string(),
            logo_url: None,
            primary_color: Some("red".to_string()),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(
            DomainOrganization::try_from(row),
            Err(TypeConstraintError::InvalidColor)
        );
    }
}
