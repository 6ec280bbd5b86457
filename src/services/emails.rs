//! Email ledger and the follow-up detection that runs on every new message.
//!
//! Outbound mail opens a follow-up for the mailbox owner when they enabled
//! automatic follow-ups. An inbound reply in the same thread closes every
//! open follow-up of that thread.

use chrono::NaiveDateTime;

use crate::auth::AuthenticatedUser;
use crate::domain::email::{Email, EmailDirection, FollowupDetection, NewEmail};
use crate::domain::email_account::EmailAccount;
use crate::domain::followup::{FollowupPriority, NewFollowup};
use crate::domain::member::MemberRole;
use crate::domain::types::{ContactId, EmailAccountId, EmailSubject};
use crate::dto::emails::RecordedEmail;
use crate::dto::queries::EmailListParams;
use crate::forms::emails::RecordEmailForm;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated, normalize_page};
use crate::repository::{
    ContactReader, EmailAccountReader, EmailListQuery, EmailReader, EmailWriter, MemberReader,
    PreferencesReader,
};
use crate::services::email_accounts::load_own_account;
use crate::services::preferences::load_preferences;
use crate::services::{ServiceError, ServiceResult, ensure_role};

/// Finds the first contact matching one of the counterpart addresses.
fn link_contact<R>(repo: &R, email: &NewEmail) -> ServiceResult<Option<ContactId>>
where
    R: ContactReader + ?Sized,
{
    for address in email.counterparts() {
        if let Some(contact) = repo.get_contact_by_email(email.organization_id, address)? {
            return Ok(Some(contact.id));
        }
    }
    Ok(None)
}

fn followup_subject(email: &NewEmail) -> ServiceResult<EmailSubject> {
    let subject = match &email.subject {
        Some(subject) => subject.clone(),
        None => match email.to_addresses.first() {
            Some(recipient) => format!("Follow up with {recipient}"),
            None => "Follow up".to_string(),
        },
    };
    Ok(EmailSubject::new(subject)?)
}

/// Outbound mail opens a follow-up when the owner wants one; a reply in a
/// thread closes its open follow-ups.
fn detect_followups<R>(
    repo: &R,
    account: &EmailAccount,
    email: &NewEmail,
    now: NaiveDateTime,
) -> ServiceResult<FollowupDetection>
where
    R: PreferencesReader + ?Sized,
{
    match (email.direction, email.thread_id.as_deref()) {
        (EmailDirection::Outbound, _) => {
            let preferences = load_preferences(repo, &account.user_id)?;
            if !preferences.auto_followup {
                return Ok(FollowupDetection::Skip);
            }
            Ok(FollowupDetection::Open(NewFollowup {
                organization_id: email.organization_id,
                owner_user_id: account.user_id.clone(),
                contact_id: email.contact_id,
                email_id: None,
                subject: followup_subject(email)?,
                notes: None,
                due_at: email.sent_at + preferences.followup_delay(),
                priority: FollowupPriority::default(),
            }))
        }
        (EmailDirection::Inbound, Some(thread_id)) => Ok(FollowupDetection::CloseThread {
            thread_id: thread_id.to_string(),
            replied_at: now,
        }),
        (EmailDirection::Inbound, None) => Ok(FollowupDetection::Skip),
    }
}

/// Records an email and runs follow-up detection on it. The email and its
/// follow-up changes are stored together or not at all.
///
/// Shared by the JSON API and the worker's message subscriber.
pub fn record_email<R>(repo: &R, mut email: NewEmail, now: NaiveDateTime) -> ServiceResult<RecordedEmail>
where
    R: EmailAccountReader + ContactReader + EmailWriter + PreferencesReader + ?Sized,
{
    let account = repo
        .get_email_account_by_id(email.organization_id, email.email_account_id)?
        .ok_or(ServiceError::NotFound)?;

    if email.contact_id.is_none() {
        email.contact_id = link_contact(repo, &email)?;
    }
    let detection = detect_followups(repo, &account, &email, now)?;

    let Some(changes) = repo.record_email(&email, &detection).map_err(|err| {
        log::error!("Failed to record email {}: {err}", email.message_id);
        err
    })?
    else {
        log::info!(
            "Email {} already recorded for account {}",
            email.message_id,
            email.email_account_id
        );
        return Ok(RecordedEmail::default());
    };

    for followup in &changes.opened {
        log::info!("Follow-up {} created for email {}", followup.id, changes.email.id);
    }
    for followup in &changes.completed {
        log::info!("Follow-up {} completed by a reply", followup.id);
    }
    Ok(RecordedEmail {
        inserted: true,
        followups_created: changes.opened.len(),
        followups_completed: changes.completed.len(),
        email: Some(changes.email),
    })
}

/// Records an email reported by the signed-in user for one of their accounts.
pub fn record_email_for_user<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: RecordEmailForm,
    now: NaiveDateTime,
) -> ServiceResult<RecordedEmail>
where
    R: MemberReader
        + EmailAccountReader
        + ContactReader
        + EmailWriter
        + PreferencesReader
        + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let email = form.into_domain(organization_id)?;
    load_own_account(repo, organization_id, &user.user_id()?, email.email_account_id)?;

    record_email(repo, email, now)
}

pub fn list_emails<R>(
    repo: &R,
    user: &AuthenticatedUser,
    params: EmailListParams,
) -> ServiceResult<Paginated<Email>>
where
    R: MemberReader + EmailReader + ?Sized,
{
    let organization_id = ensure_role(repo, user, MemberRole::Member)?;
    let page = normalize_page(params.page);

    let mut query = EmailListQuery::new(organization_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);
    if let Some(account_id) = params.account_id {
        query = query.account(EmailAccountId::new(account_id)?);
    }
    if let Some(contact_id) = params.contact_id {
        query = query.contact(ContactId::new(contact_id)?);
    }

    let (total, emails) = repo.list_emails(query).map_err(|err| {
        log::error!("Failed to list emails: {err}");
        err
    })?;
    Ok(Paginated::new(emails, page, total, DEFAULT_ITEMS_PER_PAGE))
}
