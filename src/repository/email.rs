use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::ai::NewAiActivity;
use crate::domain::email::{Email, FollowupDetection, NewEmail, RecordedChanges};
use crate::domain::followup::{CompletionReason, NewFollowup};
use crate::domain::types::{EmailAccountId, MessageId};
use crate::models::email::{Email as DbEmail, NewEmail as DbNewEmail};
use crate::repository::ai::insert_activity;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::followup::{insert_followup, open_in_thread, save_lifecycle};
use crate::repository::{DieselRepository, EmailListQuery, EmailReader, EmailWriter};
use crate::schema::emails;

fn filtered(query: &EmailListQuery) -> emails::BoxedQuery<'static, Sqlite> {
    let mut items = emails::table
        .filter(emails::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(account_id) = query.email_account_id {
        items = items.filter(emails::email_account_id.eq(account_id.get()));
    }
    if let Some(contact_id) = query.contact_id {
        items = items.filter(emails::contact_id.eq(contact_id.get()));
    }

    items
}

impl EmailReader for DieselRepository {
    fn get_email_by_message_id(
        &self,
        email_account_id: EmailAccountId,
        message_id: &MessageId,
    ) -> RepositoryResult<Option<Email>> {
        let mut conn = self.conn()?;
        let email = emails::table
            .filter(emails::email_account_id.eq(email_account_id.get()))
            .filter(emails::message_id.eq(message_id.as_str()))
            .first::<DbEmail>(&mut conn)
            .optional()?;

        Ok(email.map(Email::try_from).transpose()?)
    }

    fn list_emails(&self, query: EmailListQuery) -> RepositoryResult<(usize, Vec<Email>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((emails::sent_at.desc(), emails::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbEmail>(&mut conn)?
            .into_iter()
            .map(Email::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

impl EmailWriter for DieselRepository {
    fn record_email(
        &self,
        email: &NewEmail,
        detection: &FollowupDetection,
    ) -> RepositoryResult<Option<RecordedChanges>> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let exists = diesel::select(diesel::dsl::exists(
                emails::table
                    .filter(emails::email_account_id.eq(email.email_account_id.get()))
                    .filter(emails::message_id.eq(email.message_id.as_str())),
            ))
            .get_result::<bool>(conn)?;

            if exists {
                return Ok(None);
            }

            let created = diesel::insert_into(emails::table)
                .values(DbNewEmail::from(email))
                .get_result::<DbEmail>(conn)?;
            let mut changes = RecordedChanges {
                email: Email::try_from(created)?,
                opened: Vec::new(),
                completed: Vec::new(),
            };

            match detection {
                FollowupDetection::Skip => {}
                FollowupDetection::Open(followup) => {
                    let followup = insert_followup(
                        conn,
                        &NewFollowup {
                            email_id: Some(changes.email.id),
                            ..followup.clone()
                        },
                    )?;
                    insert_activity(conn, &NewAiActivity::followup_scheduled(&followup))?;
                    changes.opened.push(followup);
                }
                FollowupDetection::CloseThread {
                    thread_id,
                    replied_at,
                } => {
                    let open = open_in_thread(conn, changes.email.organization_id, thread_id)?;
                    for mut followup in open {
                        if followup.complete(CompletionReason::Replied, *replied_at).is_err() {
                            continue;
                        }
                        let followup = save_lifecycle(conn, &followup)?;
                        insert_activity(conn, &NewAiActivity::followup_replied(&followup))?;
                        changes.completed.push(followup);
                    }
                }
            }

            Ok(Some(changes))
        })
    }
}
