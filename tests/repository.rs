use std::sync::Mutex;

use chrono::{Duration, NaiveDateTime, Utc};

use outreach_crm::auth::AuthenticatedUser;
use outreach_crm::domain::email::{EmailDirection, FollowupDetection, NewEmail};
use outreach_crm::domain::followup::{
    CompletionReason, FollowupPriority, FollowupState, NewFollowup,
};
use outreach_crm::domain::member::MemberRole;
use outreach_crm::domain::smart_folder::FolderRules;
use outreach_crm::domain::types::{
    ContactId, EmailAccountId, EmailAddress, EmailSubject, MessageId, UserId,
};
use outreach_crm::dto::queries::ContactListParams;
use outreach_crm::forms::contacts::ContactForm;
use outreach_crm::forms::email_accounts::NewEmailAccountForm;
use outreach_crm::forms::emails::RecordEmailForm;
use outreach_crm::forms::followups::FollowupForm;
use outreach_crm::forms::members::{AddMemberForm, ChangeRoleForm};
use outreach_crm::forms::organizations::{LogoPayload, OrganizationForm};
use outreach_crm::models::zmq::ZmqNotification;
use outreach_crm::repository::{
    ContactReader, DieselRepository, EmailAccountReader, EmailReader, EmailWriter,
    FollowupReader, OrganizationReader,
};
use outreach_crm::services::sweep::{NotificationPublisher, run_sweep};
use outreach_crm::services::{
    ServiceError, ServiceResult, contacts, email_accounts, emails, followups, members,
    organizations, session, smart_folders,
};

mod common;

#[derive(Default)]
struct RecordingPublisher {
    sent: Mutex<Vec<ZmqNotification>>,
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, notification: &ZmqNotification) -> ServiceResult<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

fn contact_form(name: &str, email: &str) -> ContactForm {
    ContactForm {
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
        company: Some("Acme".to_string()),
        notes: None,
    }
}

fn with_organization(
    repo: &DieselRepository,
    sub: &str,
    email: &str,
    name: &str,
) -> AuthenticatedUser {
    let user = common::user(sub, email);
    organizations::create_organization(
        repo,
        &user,
        OrganizationForm {
            name: name.to_string(),
            primary_color: Some("#336699".to_string()),
        },
    )
    .unwrap()
    .user
}

fn email_account(repo: &DieselRepository, user: &AuthenticatedUser) -> i32 {
    email_accounts::create_email_account(
        repo,
        user,
        NewEmailAccountForm {
            email: user.email.clone(),
            display_name: None,
            provider: "imap".to_string(),
            auto_sync: true,
            sync_interval_minutes: 15,
        },
    )
    .unwrap()
    .id
    .get()
}

#[test]
fn test_organization_creation_seeds_owner_and_folders() {
    let test_db = common::TestDb::new("test_organization_creation.db");
    let repo = test_db.repo();

    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    assert_eq!(owner.role, Some(MemberRole::Owner));
    let organization_id = owner.organization().unwrap();

    let organization = repo.get_organization_by_id(organization_id).unwrap().unwrap();
    assert_eq!(organization.name.as_str(), "Acme");
    assert_eq!(
        owner.branding.as_ref().and_then(|b| b.primary_color.as_deref()),
        Some("#336699")
    );

    let folders = smart_folders::list_smart_folders(&repo, &owner).unwrap();
    assert_eq!(folders.len(), FolderRules::seeded_folders().len());

    let team = members::list_members(&repo, &owner).unwrap();
    assert_eq!(team.len(), 1);
    assert_eq!(team[0].role, MemberRole::Owner);

    // Signing in again lands in the same organization.
    let again = session::enrich_session(&repo, common::user("owner-1", "owner@acme.com")).unwrap();
    assert_eq!(again.organization_id, Some(organization_id.get()));
    assert_eq!(again.role, Some(MemberRole::Owner));
}

#[test]
fn test_last_owner_cannot_step_down() {
    let test_db = common::TestDb::new("test_last_owner.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let member_id = members::list_members(&repo, &owner).unwrap()[0].id.get();

    let result = members::change_member_role(
        &repo,
        &owner,
        member_id,
        ChangeRoleForm {
            role: "admin".to_string(),
        },
    );
    assert!(matches!(result, Err(ServiceError::Conflict(_))));

    let result = members::remove_member(&repo, &owner, member_id);
    assert!(matches!(result, Err(ServiceError::Conflict(_))));
}

#[test]
fn test_invitations_are_claimed_on_sign_in() {
    let test_db = common::TestDb::new("test_invitations.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");

    let invited = members::add_member(
        &repo,
        &owner,
        AddMemberForm {
            email: "bob@acme.com".to_string(),
            name: Some("Bob".to_string()),
            role: "member".to_string(),
        },
    )
    .unwrap();
    assert!(invited.user_id.is_none());

    let duplicate = members::add_member(
        &repo,
        &owner,
        AddMemberForm {
            email: "bob@acme.com".to_string(),
            name: None,
            role: "admin".to_string(),
        },
    );
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    let bob = session::enrich_session(&repo, common::user("bob-1", "bob@acme.com")).unwrap();
    assert_eq!(bob.organization_id, owner.organization_id);
    assert_eq!(bob.role, Some(MemberRole::Member));
    assert_eq!(bob.name, "Bob");

    // Members cannot manage the team.
    let result = members::add_member(
        &repo,
        &bob,
        AddMemberForm {
            email: "eve@acme.com".to_string(),
            name: None,
            role: "member".to_string(),
        },
    );
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

fn invite(repo: &DieselRepository, owner: &AuthenticatedUser, email: &str, role: &str) -> i32 {
    members::add_member(
        repo,
        owner,
        AddMemberForm {
            email: email.to_string(),
            name: None,
            role: role.to_string(),
        },
    )
    .unwrap()
    .id
    .get()
}

#[test]
fn test_removed_member_loses_access_with_old_session() {
    let test_db = common::TestDb::new("test_removed_member.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let bob_id = invite(&repo, &owner, "bob@acme.com", "admin");

    let bob = session::enrich_session(&repo, common::user("bob-1", "bob@acme.com")).unwrap();
    assert_eq!(bob.role, Some(MemberRole::Admin));
    assert!(contacts::create_contact(&repo, &bob, contact_form("Alice", "alice@example.com")).is_ok());

    members::remove_member(&repo, &owner, bob_id).unwrap();

    // Bob still holds a session issued while he was an admin.
    let listed = contacts::list_contacts(&repo, &bob, ContactListParams::default());
    assert!(matches!(listed, Err(ServiceError::Unauthorized)));
    let created = contacts::create_contact(&repo, &bob, contact_form("Carol", "carol@example.com"));
    assert!(matches!(created, Err(ServiceError::Unauthorized)));
    let invited = members::add_member(
        &repo,
        &bob,
        AddMemberForm {
            email: "eve@acme.com".to_string(),
            name: None,
            role: "admin".to_string(),
        },
    );
    assert!(matches!(invited, Err(ServiceError::Unauthorized)));

    let team = members::list_members(&repo, &owner).unwrap();
    assert_eq!(team.len(), 1);
}

#[test]
fn test_demoted_admin_loses_admin_rights() {
    let test_db = common::TestDb::new("test_demoted_admin.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let bob_id = invite(&repo, &owner, "bob@acme.com", "admin");
    let bob = session::enrich_session(&repo, common::user("bob-1", "bob@acme.com")).unwrap();

    members::change_member_role(
        &repo,
        &owner,
        bob_id,
        ChangeRoleForm {
            role: "member".to_string(),
        },
    )
    .unwrap();

    let promoted = members::change_member_role(
        &repo,
        &bob,
        bob_id,
        ChangeRoleForm {
            role: "admin".to_string(),
        },
    );
    assert!(matches!(promoted, Err(ServiceError::Unauthorized)));
    // Plain member access keeps working.
    assert!(contacts::list_contacts(&repo, &bob, ContactListParams::default()).is_ok());
}

#[test]
fn test_contacts_are_unique_searchable_and_isolated() {
    let test_db = common::TestDb::new("test_contacts.db");
    let repo = test_db.repo();
    let acme = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let globex = with_organization(&repo, "owner-2", "owner@globex.com", "Globex");

    let alice = contacts::create_contact(&repo, &acme, contact_form("Alice", "alice@example.com"))
        .unwrap();
    contacts::create_contact(&repo, &acme, contact_form("Bob", "bob@example.com")).unwrap();

    let duplicate =
        contacts::create_contact(&repo, &acme, contact_form("Alice Again", "ALICE@example.com"));
    assert!(matches!(duplicate, Err(ServiceError::Conflict(_))));

    // The same address is fine in another organization.
    contacts::create_contact(&repo, &globex, contact_form("Alice", "alice@example.com")).unwrap();

    let found = contacts::list_contacts(
        &repo,
        &acme,
        ContactListParams {
            search: Some("ali".to_string()),
            page: None,
        },
    )
    .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].id, alice.id);

    let foreign = contacts::get_contact(&repo, &globex, alice.id.get());
    assert!(matches!(foreign, Err(ServiceError::NotFound)));
    let foreign = contacts::delete_contact(&repo, &globex, alice.id.get());
    assert!(matches!(foreign, Err(ServiceError::NotFound)));

    let csv = "name,email,company\nCarol,carol@example.com,Initech\nDave,,\n";
    assert_eq!(contacts::import_contacts(&repo, &acme, csv.as_bytes()).unwrap(), 2);

    // A conflicting row rolls back the whole file.
    let csv = "name,email\nErin,erin@example.com\nAlice,alice@example.com\n";
    assert!(contacts::import_contacts(&repo, &acme, csv.as_bytes()).is_err());
    let all = contacts::list_contacts(&repo, &acme, ContactListParams::default()).unwrap();
    assert_eq!(all.total, 4);
}

#[test]
fn test_outbound_email_opens_followup_and_reply_closes_it() {
    let test_db = common::TestDb::new("test_email_followups.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let organization_id = owner.organization().unwrap();
    let account_id = email_account(&repo, &owner);
    let alice = contacts::create_contact(&repo, &owner, contact_form("Alice", "alice@example.com"))
        .unwrap();
    let now = Utc::now().naive_utc();

    let outbound = RecordEmailForm {
        email_account_id: account_id,
        message_id: "<1@acme.com>".to_string(),
        thread_id: Some("thread-1".to_string()),
        direction: "outbound".to_string(),
        subject: Some("Proposal".to_string()),
        from: "owner@acme.com".to_string(),
        to: vec!["alice@example.com".to_string()],
        snippet: Some("Here is the proposal".to_string()),
        sent_at: timestamp(now),
    };

    let recorded = emails::record_email_for_user(&repo, &owner, outbound.clone(), now).unwrap();
    assert!(recorded.inserted);
    assert_eq!(recorded.followups_created, 1);
    assert_eq!(recorded.email.as_ref().unwrap().contact_id, Some(alice.id));

    let again = emails::record_email_for_user(&repo, &owner, outbound, now).unwrap();
    assert!(!again.inserted);
    assert_eq!(again.followups_created, 0);

    let open = repo
        .list_open_followups_in_thread(organization_id, "thread-1")
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].subject.as_str(), "Proposal");
    assert_eq!(open[0].contact_id, Some(alice.id));

    let reply = RecordEmailForm {
        email_account_id: account_id,
        message_id: "<2@example.com>".to_string(),
        thread_id: Some("thread-1".to_string()),
        direction: "inbound".to_string(),
        subject: Some("Re: Proposal".to_string()),
        from: "alice@example.com".to_string(),
        to: vec!["owner@acme.com".to_string()],
        snippet: None,
        sent_at: timestamp(now + Duration::hours(1)),
    };
    let recorded = emails::record_email_for_user(&repo, &owner, reply, now).unwrap();
    assert_eq!(recorded.followups_completed, 1);

    let closed = repo
        .get_followup_by_id(organization_id, open[0].id)
        .unwrap()
        .unwrap();
    assert_eq!(closed.state, FollowupState::Completed);
    assert_eq!(closed.completion_reason, Some(CompletionReason::Replied));
    assert!(
        repo.list_open_followups_in_thread(organization_id, "thread-1")
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_email_and_followups_are_written_together() {
    let test_db = common::TestDb::new("test_email_atomic.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let organization_id = owner.organization().unwrap();
    let account_id = EmailAccountId::new(email_account(&repo, &owner)).unwrap();
    let now = Utc::now().naive_utc();

    let email = NewEmail {
        organization_id,
        email_account_id: account_id,
        contact_id: None,
        message_id: MessageId::new("<3@acme.com>").unwrap(),
        thread_id: None,
        direction: EmailDirection::Outbound,
        subject: Some("Pricing".to_string()),
        from_address: EmailAddress::new("owner@acme.com").unwrap(),
        to_addresses: vec![EmailAddress::new("carol@example.com").unwrap()],
        snippet: None,
        sent_at: now,
    };
    // The follow-up points at a contact that does not exist.
    let broken = FollowupDetection::Open(NewFollowup {
        organization_id,
        owner_user_id: UserId::new("owner-1").unwrap(),
        contact_id: Some(ContactId::new(9999).unwrap()),
        email_id: None,
        subject: EmailSubject::new("Pricing").unwrap(),
        notes: None,
        due_at: now + Duration::days(3),
        priority: FollowupPriority::Normal,
    });

    assert!(repo.record_email(&email, &broken).is_err());
    assert!(
        repo.get_email_by_message_id(account_id, &email.message_id)
            .unwrap()
            .is_none()
    );

    // A redelivery of the same message is processed in full.
    let recorded = emails::record_email(&repo, email.clone(), now).unwrap();
    assert!(recorded.inserted);
    assert_eq!(recorded.followups_created, 1);
    assert!(
        repo.get_email_by_message_id(account_id, &email.message_id)
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_sweep_reminds_once_and_requests_sync() {
    let test_db = common::TestDb::new("test_sweep.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let organization_id = owner.organization().unwrap();
    let account_id = email_account(&repo, &owner);
    let now = Utc::now().naive_utc();

    let overdue = followups::create_followup(
        &repo,
        &owner,
        FollowupForm {
            subject: "Call back".to_string(),
            notes: None,
            due_at: Some(timestamp(now - Duration::hours(2))),
            priority: Some("high".to_string()),
            contact_id: None,
            email_id: None,
        },
        now,
    )
    .unwrap();
    followups::create_followup(
        &repo,
        &owner,
        FollowupForm {
            subject: "Next month".to_string(),
            notes: None,
            due_at: Some(timestamp(now + Duration::days(30))),
            priority: None,
            contact_id: None,
            email_id: None,
        },
        now,
    )
    .unwrap();

    let publisher = RecordingPublisher::default();
    let report = run_sweep(&repo, &publisher, now).unwrap();
    assert_eq!(report.reminders_sent, 1);
    assert_eq!(report.sync_requests, 1);
    assert_eq!(report.failures, 0);

    let sent = publisher.sent.lock().unwrap().clone();
    assert!(sent.iter().any(|notification| matches!(
        notification,
        ZmqNotification::Reminder { followup_id, .. } if *followup_id == overdue.followup.id.get()
    )));

    let reminded = repo
        .get_followup_by_id(organization_id, overdue.followup.id)
        .unwrap()
        .unwrap();
    assert!(reminded.reminded_at.is_some());
    let account = repo
        .get_email_account_by_id(organization_id, EmailAccountId::new(account_id).unwrap())
        .unwrap()
        .unwrap();
    assert!(account.last_synced_at.is_some());

    let report = run_sweep(&repo, &publisher, now + Duration::minutes(1)).unwrap();
    assert_eq!(report.reminders_sent, 0);
    assert_eq!(report.sync_requests, 0);
}

#[test]
fn test_deleting_organization_removes_its_data() {
    let test_db = common::TestDb::new("test_delete_organization.db");
    let repo = test_db.repo();
    let owner = with_organization(&repo, "owner-1", "owner@acme.com", "Acme");
    let organization_id = owner.organization().unwrap();
    let alice = contacts::create_contact(&repo, &owner, contact_form("Alice", "alice@example.com"))
        .unwrap();

    let uploads = tempfile::tempdir().unwrap();
    let upload_dir = uploads.path().to_str().unwrap();
    let source = uploads.path().join("logo.png");
    std::fs::write(&source, b"png").unwrap();
    let first = organizations::upload_logo(
        &repo,
        &owner,
        LogoPayload {
            source: source.clone(),
            extension: "png",
        },
        upload_dir,
    )
    .unwrap();
    organizations::upload_logo(
        &repo,
        &owner,
        LogoPayload {
            source,
            extension: "png",
        },
        upload_dir,
    )
    .unwrap();
    let stored = || std::fs::read_dir(uploads.path().join("logos")).unwrap().count();
    // The replaced logo file is gone.
    assert_eq!(stored(), 1);
    assert_ne!(
        first.value.logo_url,
        repo.get_organization_by_id(organization_id).unwrap().unwrap().logo_url
    );

    let user = organizations::delete_organization(&repo, &owner, upload_dir).unwrap();
    assert!(user.organization_id.is_none());
    assert_eq!(stored(), 0);
    assert!(user.role.is_none());

    assert!(repo.get_organization_by_id(organization_id).unwrap().is_none());
    assert!(repo.get_contact_by_id(organization_id, alice.id).unwrap().is_none());

    let signed_in = session::enrich_session(&repo, common::user("owner-1", "owner@acme.com")).unwrap();
    assert!(signed_in.organization_id.is_none());
}
