use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::contact::{Contact, NewContact, UpdateContact};
use crate::domain::types::{ContactId, EmailAddress, OrganizationId};
use crate::models::contact::{
    Contact as DbContact, NewContact as DbNewContact, UpdateContact as DbUpdateContact,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ContactListQuery, ContactReader, ContactWriter, DieselRepository};
use crate::schema::contacts;

fn filtered(query: &ContactListQuery) -> contacts::BoxedQuery<'static, Sqlite> {
    let mut items = contacts::table
        .filter(contacts::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{term}%");
        items = items.filter(
            contacts::name
                .like(pattern.clone())
                .or(contacts::email.like(pattern.clone()))
                .or(contacts::phone.like(pattern.clone()))
                .or(contacts::company.like(pattern)),
        );
    }

    items
}

impl ContactReader for DieselRepository {
    fn get_contact_by_id(
        &self,
        organization_id: OrganizationId,
        id: ContactId,
    ) -> RepositoryResult<Option<Contact>> {
        let mut conn = self.conn()?;
        let contact = contacts::table
            .filter(contacts::id.eq(id.get()))
            .filter(contacts::organization_id.eq(organization_id.get()))
            .first::<DbContact>(&mut conn)
            .optional()?;

        Ok(contact.map(Contact::try_from).transpose()?)
    }

    fn get_contact_by_email(
        &self,
        organization_id: OrganizationId,
        email: &EmailAddress,
    ) -> RepositoryResult<Option<Contact>> {
        let mut conn = self.conn()?;
        let contact = contacts::table
            .filter(contacts::organization_id.eq(organization_id.get()))
            .filter(contacts::email.eq(email.as_str()))
            .first::<DbContact>(&mut conn)
            .optional()?;

        Ok(contact.map(Contact::try_from).transpose()?)
    }

    fn list_contacts(&self, query: ContactListQuery) -> RepositoryResult<(usize, Vec<Contact>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((contacts::name.asc(), contacts::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbContact>(&mut conn)?
            .into_iter()
            .map(Contact::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

impl ContactWriter for DieselRepository {
    fn create_contact(&self, contact: &NewContact) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(contacts::table)
            .values(DbNewContact::from(contact))
            .get_result::<DbContact>(&mut conn)?;

        Ok(Contact::try_from(created)?)
    }

    fn import_contacts(&self, new_contacts: &[NewContact]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let insertables: Vec<DbNewContact> = new_contacts.iter().map(DbNewContact::from).collect();

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let inserted = diesel::insert_into(contacts::table)
                .values(&insertables)
                .execute(conn)?;
            Ok(inserted)
        })
    }

    fn update_contact(
        &self,
        organization_id: OrganizationId,
        id: ContactId,
        updates: &UpdateContact,
    ) -> RepositoryResult<Contact> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = diesel::update(
            contacts::table
                .filter(contacts::id.eq(id.get()))
                .filter(contacts::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateContact::new(updates, now))
        .get_result::<DbContact>(&mut conn)?;

        Ok(Contact::try_from(updated)?)
    }

    fn delete_contact(&self, organization_id: OrganizationId, id: ContactId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            contacts::table
                .filter(contacts::id.eq(id.get()))
                .filter(contacts::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
