use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::email::{
    Email as DomainEmail, NewEmail as DomainNewEmail, join_addresses, split_addresses,
};
use crate::domain::types::{
    ContactId, EmailAccountId, EmailAddress, EmailId, MessageId, OrganizationId,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::emails)]
pub struct Email {
    pub id: i32,
    pub organization_id: i32,
    pub email_account_id: i32,
    pub contact_id: Option<i32>,
    pub message_id: String,
    pub thread_id: Option<String>,
    pub direction: String,
    pub subject: Option<String>,
    pub from_address: String,
    pub to_addresses: String,
    pub snippet: Option<String>,
    pub sent_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::emails)]
pub struct NewEmail<'a> {
    pub organization_id: i32,
    pub email_account_id: i32,
    pub contact_id: Option<i32>,
    pub message_id: &'a str,
    pub thread_id: Option<&'a str>,
    pub direction: &'a str,
    pub subject: Option<&'a str>,
    pub from_address: &'a str,
    pub to_addresses: String,
    pub snippet: Option<&'a str>,
    pub sent_at: NaiveDateTime,
}

impl TryFrom<Email> for DomainEmail {
    type Error = TypeConstraintError;

    fn try_from(email: Email) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmailId::new(email.id)?,
            organization_id: OrganizationId::new(email.organization_id)?,
            email_account_id: EmailAccountId::new(email.email_account_id)?,
            contact_id: email.contact_id.map(ContactId::new).transpose()?,
            message_id: MessageId::new(email.message_id)?,
            thread_id: email.thread_id,
            direction: email.direction.parse()?,
            subject: email.subject,
            from_address: EmailAddress::new(email.from_address)?,
            to_addresses: split_addresses(&email.to_addresses)?,
            snippet: email.snippet,
            sent_at: email.sent_at,
            created_at: email.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewEmail> for NewEmail<'a> {
    fn from(email: &'a DomainNewEmail) -> Self {
        Self {
            organization_id: email.organization_id.get(),
            email_account_id: email.email_account_id.get(),
            contact_id: email.contact_id.map(ContactId::get),
            message_id: email.message_id.as_str(),
            thread_id: email.thread_id.as_deref(),
            direction: email.direction.as_str(),
            subject: email.subject.as_deref(),
            from_address: email.from_address.as_str(),
            to_addresses: join_addresses(&email.to_addresses),
            snippet: email.snippet.as_deref(),
            sent_at: email.sent_at,
        }
    }
}
