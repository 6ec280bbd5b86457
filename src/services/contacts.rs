use std::io::Read;

use crate::auth::AuthenticatedUser;
use crate::domain::contact::Contact;
use crate::domain::member::MemberRole;
use crate::domain::types::ContactId;
use crate::dto::queries::{ContactListParams, search_term};
use crate::forms::contacts::{ContactForm, ContactPayload, parse_contacts_csv};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{ContactListQuery, ContactReader, ContactWriter, MemberReader};
use crate::services::{ServiceError, ServiceResult, ensure_role};

pub fn list_contacts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: ContactListParams,
) -> ServiceResult<Paginated<Contact>>
where
    R: MemberReader + ContactReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let page = normalize_page(params.page);

    let mut query = ContactListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(term) = search_term(params.search) {
        query = query.search(term);
    }

    let (total, contacts) = repo.list_contacts(query).map_err(|err| {
        log::error!("Failed to list contacts: {err}");
        err
    })?;
    Ok(Paginated::new(contacts, page, total, DEFAULT_ITEMS_PER_PAGE))
}

pub fn get_contact<R>(repo: &R, user: &AuthenticatedUser, contact_id: i32) -> ServiceResult<Contact>
where
    R: MemberReader + ContactReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let contact_id = ContactId::new(contact_id)?;
    repo.get_contact_by_id(organization_id, contact_id)?
        .ok_or(ServiceError::NotFound)
}

pub fn create_contact<R>(repo: &R, user: &AuthenticatedUser, form: ContactForm) -> ServiceResult<Contact>
where
    R: MemberReader + ContactWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let payload = ContactPayload::try_from(form)?;

    let contact = repo
        .create_contact(&payload.into_new(organization_id))
        .map_err(|err| {
            log::error!("Failed to create contact: {err}");
            err
        })?;
    Ok(contact)
}

pub fn update_contact<R>(
    repo: &R,
    user: &AuthenticatedUser,
    contact_id: i32,
    form: ContactForm,
) -> ServiceResult<Contact>
where
    R: MemberReader + ContactWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let contact_id = ContactId::new(contact_id)?;
    let payload = ContactPayload::try_from(form)?;

    let contact = repo
        .update_contact(organization_id, contact_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update contact: {err}");
            err
        })?;
    Ok(contact)
}

pub fn delete_contact<R>(repo: &R, user: &AuthenticatedUser, contact_id: i32) -> ServiceResult<()>
where
    R: MemberReader + ContactWriter + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let contact_id = ContactId::new(contact_id)?;

    repo.delete_contact(organization_id, contact_id)
        .map_err(|err| {
            log::error!("Failed to delete contact: {err}");
            err
        })?;
    Ok(())
}

/// Imports a CSV upload; either every row is stored or none is.
pub fn import_contacts<R, F>(repo: &R, user: &AuthenticatedUser, csv: F) -> ServiceResult<usize>
where
    R: MemberReader + ContactWriter + ?Sized,
    F: Read,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let contacts = parse_contacts_csv(csv, organization_id)?;

    let imported = repo.import_contacts(&contacts).map_err(|err| {
        log::error!("Failed to import contacts: {err}");
        err
    })?;
    log::info!("Imported {imported} contacts into organization {organization_id}");
    Ok(imported)
}
