//! Diesel models representing organization memberships.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::member::{Member as DomainMember, NewMember as DomainNewMember};
use crate::domain::types::{
    EmailAddress, MemberId, OrganizationId, PersonName, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::organization_members)]
pub struct Member {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub role: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::organization_members)]
pub struct NewMember<'a> {
    pub organization_id: i32,
    pub user_id: Option<&'a str>,
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub role: &'a str,
}

impl TryFrom<Member> for DomainMember {
    type Error = TypeConstraintError;

    fn try_from(member: Member) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MemberId::new(member.id)?,
            organization_id: OrganizationId::new(member.organization_id)?,
            user_id: member.user_id.map(UserId::new).transpose()?,
            email: EmailAddress::new(member.email)?,
            name: member
                .name
                .filter(|name| !name.trim().is_empty())
                .map(PersonName::new)
                .transpose()?,
            role: member.role.parse()?,
            created_at: member.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewMember> for NewMember<'a> {
    fn from(member: &'a DomainNewMember) -> Self {
        Self {
            organization_id: member.organization_id.get(),
            user_id: member.user_id.as_ref().map(UserId::as_str),
            email: member.email.as_str(),
            name: member.name.as_ref().map(PersonName::as_str),
            role: member.role.as_str(),
        }
    }
}
