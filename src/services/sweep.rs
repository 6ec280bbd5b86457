//! Periodic sweep run by the follow-up worker.
//!
//! Each pass looks at open follow-ups that may have entered their owner's due
//! window and at mailboxes waiting for a sync. Reminders and sync requests are
//! published before the matching state change is stored, so a failed publish
//! is retried on the next pass. Auto-replies go out to contacts and are never
//! repeated: the follow-up is completed first and reopened when the publish
//! fails.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};

use crate::domain::ai::{ActivityKind, NewAiActivity};
use crate::domain::email_account::EmailAccount;
use crate::domain::followup::{CompletionReason, Followup};
use crate::domain::preferences::{MAX_DUE_WINDOW_HOURS, UserPreferences};
use crate::domain::types::UserId;
use crate::models::zmq::ZmqNotification;
use crate::repository::{
    ActivityWriter, ContactReader, EmailAccountReader, EmailAccountWriter, FollowupReader,
    FollowupWriter, PreferencesReader,
};
use crate::services::ServiceResult;
use crate::services::preferences::load_preferences;

/// Destination of the worker's outgoing messages.
pub trait NotificationPublisher {
    fn publish(&self, notification: &ZmqNotification) -> ServiceResult<()>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub reminders_sent: usize,
    pub auto_replies_sent: usize,
    pub sync_requests: usize,
    pub failures: usize,
}

enum Action {
    AutoReply,
    Remind,
}

fn decide(followup: &Followup, prefs: &UserPreferences, now: NaiveDateTime) -> Option<Action> {
    if followup.is_auto_reply_eligible(now, prefs) {
        Some(Action::AutoReply)
    } else if prefs.notifications_enabled && followup.needs_reminder(now, prefs.due_window()) {
        Some(Action::Remind)
    } else {
        None
    }
}

fn send_reminder<R, P>(
    repo: &R,
    publisher: &P,
    mut followup: Followup,
    now: NaiveDateTime,
) -> ServiceResult<()>
where
    R: FollowupWriter + ActivityWriter + ?Sized,
    P: NotificationPublisher + ?Sized,
{
    publisher.publish(&ZmqNotification::Reminder {
        organization_id: followup.organization_id.get(),
        user_id: followup.owner_user_id.to_string(),
        followup_id: followup.id.get(),
        subject: followup.subject.to_string(),
        due_at: followup.due_at,
    })?;

    followup.mark_reminded(now);
    let followup = repo.save_followup_state(&followup)?;
    repo.create_activity(&NewAiActivity::for_followup(
        followup.organization_id,
        Some(followup.owner_user_id.clone()),
        ActivityKind::ReminderSent,
        followup.id.get(),
        format!("Reminder sent for \"{}\"", followup.subject),
    ))?;
    log::info!("Reminder sent for follow-up {}", followup.id);
    Ok(())
}

fn send_auto_reply<R, P>(
    repo: &R,
    publisher: &P,
    mut followup: Followup,
    now: NaiveDateTime,
) -> ServiceResult<()>
where
    R: ContactReader + FollowupWriter + ActivityWriter + ?Sized,
    P: NotificationPublisher + ?Sized,
{
    let Some(draft) = followup.draft.clone() else {
        return Ok(());
    };
    let recipient = match followup.contact_id {
        Some(contact_id) => repo
            .get_contact_by_id(followup.organization_id, contact_id)?
            .and_then(|contact| contact.email)
            .map(|email| email.into_inner()),
        None => None,
    };

    let open = followup.clone();
    followup.complete(CompletionReason::AutoReplied, now)?;
    let followup = repo.save_followup_state(&followup).map_err(|err| {
        log::error!("Failed to claim follow-up {} for an auto-reply: {err}", open.id);
        err
    })?;

    let published = publisher.publish(&ZmqNotification::AutoReply {
        organization_id: followup.organization_id.get(),
        user_id: followup.owner_user_id.to_string(),
        followup_id: followup.id.get(),
        to: recipient,
        subject: followup.subject.to_string(),
        body: draft.body.to_string(),
    });
    if let Err(err) = published {
        if let Err(restore) = repo.save_followup_state(&open) {
            log::error!(
                "Failed to reopen follow-up {} after a failed auto-reply: {restore}",
                open.id
            );
        }
        return Err(err);
    }

    repo.create_activity(
        &NewAiActivity::for_followup(
            followup.organization_id,
            Some(followup.owner_user_id.clone()),
            ActivityKind::AutoReplySent,
            followup.id.get(),
            format!("Draft sent automatically for \"{}\"", followup.subject),
        )
        .with_confidence(draft.confidence),
    )?;
    log::info!("Auto-reply sent for follow-up {}", followup.id);
    Ok(())
}

fn request_sync<R, P>(
    repo: &R,
    publisher: &P,
    account: &EmailAccount,
    now: NaiveDateTime,
) -> ServiceResult<()>
where
    R: EmailAccountWriter + ?Sized,
    P: NotificationPublisher + ?Sized,
{
    publisher.publish(&ZmqNotification::SyncRequest {
        organization_id: account.organization_id.get(),
        email_account_id: account.id.get(),
        email: account.email.to_string(),
        provider: account.provider.to_string(),
    })?;
    repo.mark_email_account_synced(account.organization_id, account.id, now)?;
    log::debug!("Sync requested for {}", account.email);
    Ok(())
}

/// Runs one sweep at `now`. Failures of single records are logged and counted.
pub fn run_sweep<R, P>(repo: &R, publisher: &P, now: NaiveDateTime) -> ServiceResult<SweepReport>
where
    R: FollowupReader
        + FollowupWriter
        + ContactReader
        + PreferencesReader
        + ActivityWriter
        + EmailAccountReader
        + EmailAccountWriter
        + ?Sized,
    P: NotificationPublisher + ?Sized,
{
    let mut report = SweepReport::default();

    // Owners choose their own window, so fetch with the widest one allowed.
    let cutoff = now + Duration::hours(i64::from(MAX_DUE_WINDOW_HOURS));
    let candidates = repo.list_open_followups_due_before(cutoff).map_err(|err| {
        log::error!("Failed to load follow-ups for the sweep: {err}");
        err
    })?;

    let mut preferences: HashMap<UserId, UserPreferences> = HashMap::new();
    for followup in candidates {
        let owner = &followup.owner_user_id;
        if !preferences.contains_key(owner) {
            preferences.insert(owner.clone(), load_preferences(repo, owner)?);
        }
        let prefs = &preferences[owner];

        let followup_id = followup.id;
        let result = match decide(&followup, prefs, now) {
            Some(Action::AutoReply) => send_auto_reply(repo, publisher, followup, now)
                .map(|()| report.auto_replies_sent += 1),
            Some(Action::Remind) => send_reminder(repo, publisher, followup, now)
                .map(|()| report.reminders_sent += 1),
            None => Ok(()),
        };
        if let Err(err) = result {
            log::error!("Failed to process follow-up {followup_id}: {err}");
            report.failures += 1;
        }
    }

    let accounts = repo.list_auto_sync_accounts().map_err(|err| {
        log::error!("Failed to load accounts for the sweep: {err}");
        err
    })?;
    for account in accounts.iter().filter(|account| account.is_sync_due(now)) {
        match request_sync(repo, publisher, account, now) {
            Ok(()) => report.sync_requests += 1,
            Err(err) => {
                log::error!("Failed to request sync for {}: {err}", account.email);
                report.failures += 1;
            }
        }
    }

    Ok(report)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use crate::domain::ai::AiActivity;
    use crate::domain::followup::{FollowupDraft, FollowupState};
    use crate::repository::errors::RepositoryError;
    use crate::domain::types::{ActivityId, Confidence, SanitizedText};
    use crate::repository::mock::MockRepository;
    use crate::services::ServiceError;
    use crate::services::email_accounts::tests::account;
    use crate::services::test_support::{at, followup};

    #[derive(Default)]
    struct RecordingPublisher {
        sent: Mutex<Vec<ZmqNotification>>,
        fail: bool,
    }

    impl NotificationPublisher for RecordingPublisher {
        fn publish(&self, notification: &ZmqNotification) -> ServiceResult<()> {
            if self.fail {
                return Err(ServiceError::Internal("socket closed".to_string()));
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn activity(new: &NewAiActivity) -> AiActivity {
        AiActivity {
            id: ActivityId::new(1).unwrap(),
            organization_id: new.organization_id,
            user_id: new.user_id.clone(),
            kind: new.kind,
            entity_type: new.entity_type.clone(),
            entity_id: new.entity_id,
            summary: new.summary.clone(),
            confidence: new.confidence,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn with_draft(mut f: Followup, confidence: f64) -> Followup {
        f.draft = Some(FollowupDraft {
            body: SanitizedText::new("Just checking in").unwrap(),
            confidence: Confidence::new(confidence).unwrap(),
        });
        f
    }

    fn auto_reply_prefs(user_id: &UserId) -> UserPreferences {
        let mut prefs = UserPreferences::defaults(user_id.clone());
        prefs.auto_reply_enabled = true;
        prefs
    }

    #[test]
    fn due_followups_get_one_reminder() {
        let mut reminded = followup(2, "member-1", at(10, 9));
        reminded.reminded_at = Some(at(10, 7));

        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .withf(|cutoff| *cutoff == at(17, 8))
            .returning(move |_| {
                Ok(vec![
                    followup(1, "member-1", at(10, 9)),
                    reminded.clone(),
                    followup(3, "member-1", at(16, 9)),
                ])
            });
        repo.expect_get_preferences().times(1).returning(|_| Ok(None));
        repo.expect_save_followup_state()
            .withf(|f| f.id.get() == 1 && f.reminded_at == Some(at(10, 8)))
            .times(1)
            .returning(|f| Ok(f.clone()));
        repo.expect_create_activity()
            .withf(|new| new.kind == ActivityKind::ReminderSent)
            .times(1)
            .returning(|new| Ok(activity(new)));
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let publisher = RecordingPublisher::default();
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.reminders_sent, 1);
        let sent = publisher.sent.lock().unwrap();
        assert!(matches!(sent[0], ZmqNotification::Reminder { followup_id: 1, .. }));
    }

    #[test]
    fn muted_owners_are_not_reminded() {
        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![followup(1, "member-1", at(10, 9))]));
        repo.expect_get_preferences().returning(|user_id| {
            let mut prefs = UserPreferences::defaults(user_id.clone());
            prefs.notifications_enabled = false;
            Ok(Some(prefs))
        });
        repo.expect_save_followup_state().times(0);
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let publisher = RecordingPublisher::default();
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn confident_drafts_are_sent_automatically() {
        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before().returning(|_| {
            Ok(vec![
                with_draft(followup(1, "member-1", at(10, 9)), 0.95),
                with_draft(followup(2, "member-1", at(10, 9)), 0.5),
            ])
        });
        repo.expect_get_preferences()
            .returning(|user_id| Ok(Some(auto_reply_prefs(user_id))));
        repo.expect_save_followup_state()
            .returning(|f| Ok(f.clone()));
        repo.expect_create_activity()
            .returning(|new| Ok(activity(new)));
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let publisher = RecordingPublisher::default();
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.auto_replies_sent, 1);
        assert_eq!(report.reminders_sent, 1);
        let sent = publisher.sent.lock().unwrap();
        assert!(matches!(
            &sent[0],
            ZmqNotification::AutoReply { followup_id: 1, to: None, body, .. } if body == "Just checking in"
        ));
    }

    #[test]
    fn auto_reply_completes_followup() {
        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![with_draft(followup(1, "member-1", at(9, 9)), 0.9)]));
        repo.expect_get_preferences()
            .returning(|user_id| Ok(Some(auto_reply_prefs(user_id))));
        repo.expect_save_followup_state()
            .withf(|f| {
                f.state == FollowupState::Completed
                    && f.completion_reason == Some(CompletionReason::AutoReplied)
            })
            .times(1)
            .returning(|f| Ok(f.clone()));
        repo.expect_create_activity()
            .withf(|new| new.kind == ActivityKind::AutoReplySent && new.confidence.is_some())
            .times(1)
            .returning(|new| Ok(activity(new)));
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let report = run_sweep(&repo, &RecordingPublisher::default(), at(10, 8)).unwrap();

        assert_eq!(report.auto_replies_sent, 1);
    }

    #[test]
    fn auto_reply_is_not_sent_when_the_claim_fails() {
        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![with_draft(followup(1, "member-1", at(9, 9)), 0.9)]));
        repo.expect_get_preferences()
            .returning(|user_id| Ok(Some(auto_reply_prefs(user_id))));
        repo.expect_save_followup_state()
            .times(1)
            .returning(|_| Err(RepositoryError::DatabaseError("database is locked".into())));
        repo.expect_create_activity().times(0);
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let publisher = RecordingPublisher::default();
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.auto_replies_sent, 0);
        assert_eq!(report.failures, 1);
        assert!(publisher.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_auto_reply_publish_reopens_followup() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let states = Arc::clone(&saved);

        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![with_draft(followup(1, "member-1", at(9, 9)), 0.9)]));
        repo.expect_get_preferences()
            .returning(|user_id| Ok(Some(auto_reply_prefs(user_id))));
        repo.expect_save_followup_state()
            .times(2)
            .returning(move |f| {
                states.lock().unwrap().push(f.state);
                Ok(f.clone())
            });
        repo.expect_create_activity().times(0);
        repo.expect_list_auto_sync_accounts().returning(|| Ok(vec![]));

        let publisher = RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        };
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(
            *saved.lock().unwrap(),
            vec![FollowupState::Completed, FollowupState::Open]
        );
    }

    #[test]
    fn publish_failures_leave_state_untouched() {
        let mut stale = account(2, "member-1");
        stale.last_synced_at = Some(at(10, 7));

        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![followup(1, "member-1", at(10, 9))]));
        repo.expect_get_preferences().returning(|_| Ok(None));
        repo.expect_save_followup_state().times(0);
        repo.expect_mark_email_account_synced().times(0);
        repo.expect_list_auto_sync_accounts()
            .returning(move || Ok(vec![account(1, "member-1"), stale.clone()]));

        let publisher = RecordingPublisher {
            fail: true,
            ..RecordingPublisher::default()
        };
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.failures, 3);
    }

    #[test]
    fn accounts_are_synced_when_interval_elapsed() {
        let mut fresh = account(2, "member-1");
        fresh.last_synced_at = Some(at(10, 8) - Duration::minutes(5));

        let mut repo = MockRepository::new();
        repo.expect_list_open_followups_due_before()
            .returning(|_| Ok(vec![]));
        repo.expect_list_auto_sync_accounts()
            .returning(move || Ok(vec![account(1, "member-1"), fresh.clone()]));
        repo.expect_mark_email_account_synced()
            .withf(|_, id, at_time| id.get() == 1 && *at_time == at(10, 8))
            .times(1)
            .returning(|_, id, synced_at| {
                let mut synced = account(id.get(), "member-1");
                synced.last_synced_at = Some(synced_at);
                Ok(synced)
            });

        let publisher = RecordingPublisher::default();
        let report = run_sweep(&repo, &publisher, at(10, 8)).unwrap();

        assert_eq!(report.sync_requests, 1);
        let sent = publisher.sent.lock().unwrap();
        assert!(matches!(
            sent[0],
            ZmqNotification::SyncRequest { email_account_id: 1, .. }
        ));
    }
}
