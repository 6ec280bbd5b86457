//! Background worker: records synced emails and runs the follow-up sweep.
//!
//! A subscriber thread consumes [`ZmqEmailMessage`] payloads from the mail sync
//! service. The main thread sweeps every `sweep_interval_secs` and publishes
//! reminders, auto-replies and sync requests on a PUB socket as two frames:
//! the topic, then the JSON body.

use std::thread;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use dotenvy::dotenv;

use outreach_crm::db::establish_connection_pool;
use outreach_crm::domain::email::NewEmail;
use outreach_crm::dto::emails::RecordedEmail;
use outreach_crm::models::config::ServerConfig;
use outreach_crm::models::zmq::{ZmqEmailMessage, ZmqNotification};
use outreach_crm::repository::{
    ContactReader, DieselRepository, EmailAccountReader, EmailWriter, PreferencesReader,
};
use outreach_crm::services::emails::record_email;
use outreach_crm::services::sweep::{NotificationPublisher, run_sweep};
use outreach_crm::services::{ServiceError, ServiceResult};

const RECEIVE_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Delay before receiving again after `err`, or `None` when the socket is gone.
fn receive_retry_delay(err: zmq::Error) -> Option<Duration> {
    match err {
        zmq::Error::ETERM | zmq::Error::ENOTSOCK => None,
        _ => Some(RECEIVE_RETRY_DELAY),
    }
}

struct ZmqPublisher {
    socket: zmq::Socket,
}

impl ZmqPublisher {
    fn bind(context: &zmq::Context, endpoint: &str) -> Result<Self, zmq::Error> {
        let socket = context.socket(zmq::PUB)?;
        socket.bind(endpoint)?;
        Ok(Self { socket })
    }
}

/// Topic frame and JSON body for `notification`.
fn encode_notification(notification: &ZmqNotification) -> ServiceResult<(&'static str, Vec<u8>)> {
    let body = serde_json::to_vec(notification)
        .map_err(|err| ServiceError::Internal(format!("failed to encode notification: {err}")))?;
    Ok((notification.topic(), body))
}

impl NotificationPublisher for ZmqPublisher {
    fn publish(&self, notification: &ZmqNotification) -> ServiceResult<()> {
        let (topic, body) = encode_notification(notification)?;
        self.socket
            .send(topic, zmq::SNDMORE)
            .and_then(|_| self.socket.send(body, 0))
            .map_err(|err| ServiceError::Internal(format!("failed to publish {topic}: {err}")))
    }
}

fn process_email_message<R>(
    payload: &[u8],
    repo: &R,
    now: NaiveDateTime,
) -> ServiceResult<RecordedEmail>
where
    R: EmailAccountReader + ContactReader + EmailWriter + PreferencesReader + ?Sized,
{
    let message: ZmqEmailMessage = serde_json::from_slice(payload)
        .map_err(|err| ServiceError::Form(format!("invalid email message: {err}")))?;
    let email = NewEmail::try_from(message)?;
    log::info!(
        "Recording {} email {} for account {}",
        email.direction,
        email.message_id,
        email.email_account_id
    );
    record_email(repo, email, now)
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let server_config = match ServerConfig::load() {
        Ok(server_config) => server_config,
        Err(err) => {
            log::error!("Error loading server config: {err}");
            std::process::exit(1);
        }
    };

    let pool = match establish_connection_pool(&server_config.database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    let context = zmq::Context::new();
    let subscriber = match context.socket(zmq::SUB).and_then(|socket| {
        socket.connect(&server_config.zmq_emails_sub)?;
        socket.set_subscribe(b"")?;
        Ok(socket)
    }) {
        Ok(socket) => socket,
        Err(e) => {
            log::error!("Cannot subscribe to {}: {e}", server_config.zmq_emails_sub);
            std::process::exit(1);
        }
    };
    let publisher = match ZmqPublisher::bind(&context, &server_config.zmq_notifications_pub) {
        Ok(publisher) => publisher,
        Err(e) => {
            log::error!(
                "Cannot bind publisher to {}: {e}",
                server_config.zmq_notifications_pub
            );
            std::process::exit(1);
        }
    };

    log::info!("Starting follow-up worker");

    let email_repo = repo.clone();
    thread::spawn(move || {
        loop {
            let msg = match subscriber.recv_bytes(0) {
                Ok(msg) => msg,
                Err(e) => match receive_retry_delay(e) {
                    Some(delay) => {
                        log::error!("Error receiving email message: {e}");
                        thread::sleep(delay);
                        continue;
                    }
                    None => {
                        log::warn!("Email subscriber stopped: {e}");
                        break;
                    }
                },
            };
            match process_email_message(&msg, &email_repo, Utc::now().naive_utc()) {
                Ok(recorded) if recorded.inserted => log::info!(
                    "Email recorded: {} follow-up(s) created, {} completed",
                    recorded.followups_created,
                    recorded.followups_completed
                ),
                Ok(_) => {}
                Err(e) => log::error!("Error processing email message: {e}"),
            }
        }
    });

    let interval = Duration::from_secs(server_config.sweep_interval_secs.max(1));
    loop {
        match run_sweep(&repo, &publisher, Utc::now().naive_utc()) {
            Ok(report) => log::info!(
                "Sweep finished: {} reminder(s), {} auto-reply(ies), {} sync request(s), {} failure(s)",
                report.reminders_sent,
                report.auto_replies_sent,
                report.sync_requests,
                report.failures
            ),
            Err(e) => log::error!("Sweep failed: {e}"),
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_are_sent_under_their_topic() {
        let notification = ZmqNotification::SyncRequest {
            organization_id: 1,
            email_account_id: 2,
            email: "me@example.com".to_string(),
            provider: "imap".to_string(),
        };

        let (topic, body) = encode_notification(&notification).unwrap();

        assert_eq!(topic, "sync");
        let decoded: ZmqNotification = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, notification);
    }

    #[test]
    fn subscriber_stops_once_the_context_is_gone() {
        assert_eq!(receive_retry_delay(zmq::Error::ETERM), None);
        assert_eq!(receive_retry_delay(zmq::Error::ENOTSOCK), None);
    }

    #[test]
    fn transient_receive_errors_back_off() {
        for err in [zmq::Error::EINTR, zmq::Error::EAGAIN] {
            let delay = receive_retry_delay(err).unwrap();
            assert!(delay >= Duration::from_millis(500));
        }
    }
}
