use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::contact::{
    Contact as DomainContact, NewContact as DomainNewContact, UpdateContact as DomainUpdateContact,
};
use crate::domain::types::{
    ContactId, ContactName, EmailAddress, OrganizationId, PhoneNumber, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::contacts)]
/// Diesel model for [`crate::domain::contact::Contact`].
pub struct Contact {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::contacts)]
/// Insertable form of [`Contact`].
pub struct NewContact<'a> {
    pub organization_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::contacts)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Contact`] record.
pub struct UpdateContact<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub company: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<Contact> for DomainContact {
    type Error = TypeConstraintError;

    fn try_from(contact: Contact) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ContactId::new(contact.id)?,
            organization_id: OrganizationId::new(contact.organization_id)?,
            name: ContactName::new(contact.name)?,
            email: contact.email.map(EmailAddress::new).transpose()?,
            phone: contact.phone.map(PhoneNumber::new).transpose()?,
            company: contact.company,
            notes: contact.notes,
            created_at: contact.created_at,
            updated_at: contact.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewContact> for NewContact<'a> {
    fn from(contact: &'a DomainNewContact) -> Self {
        Self {
            organization_id: contact.organization_id.get(),
            name: contact.name.as_str(),
            email: contact.email.as_ref().map(EmailAddress::as_str),
            phone: contact.phone.as_ref().map(PhoneNumber::as_str),
            company: contact.company.as_deref(),
            notes: contact.notes.as_deref(),
        }
    }
}

impl<'a> UpdateContact<'a> {
    pub fn new(contact: &'a DomainUpdateContact, now: NaiveDateTime) -> Self {
        Self {
            name: contact.name.as_str(),
            email: contact.email.as_ref().map(EmailAddress::as_str),
            phone: contact.phone.as_ref().map(PhoneNumber::as_str),
            company: contact.company.as_deref(),
            notes: contact.notes.as_deref(),
            updated_at: now,
        }
    }
}
