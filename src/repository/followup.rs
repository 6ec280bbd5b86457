use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::followup::{Followup, FollowupState, FollowupStatus, NewFollowup, UpdateFollowup};
use crate::domain::types::{EmailAddress, FollowupId, OrganizationId};
use crate::models::followup::{
    Followup as DbFollowup, FollowupLifecycle, NewFollowup as DbNewFollowup,
    UpdateFollowup as DbUpdateFollowup,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, FollowupListQuery, FollowupReader, FollowupWriter, StatusFilter,
};
use crate::schema::{contacts, emails, followups};

fn filtered(query: &FollowupListQuery) -> followups::BoxedQuery<'static, Sqlite> {
    let mut items = followups::table
        .filter(followups::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(owner) = &query.owner_user_id {
        items = items.filter(followups::owner_user_id.eq(owner.as_str().to_string()));
    }
    if let Some(contact_id) = query.contact_id {
        items = items.filter(followups::contact_id.eq(contact_id.get()));
    }
    if let Some(filter) = &query.status {
        items = filter_status(items, filter);
    }

    items
}

/// Translates a derived status into the equivalent state and due date bounds.
fn filter_status<'a>(
    items: followups::BoxedQuery<'a, Sqlite>,
    filter: &StatusFilter,
) -> followups::BoxedQuery<'a, Sqlite> {
    let now = filter.now;
    let window_end = filter.now + filter.due_window;

    match filter.status {
        FollowupStatus::Pending => items
            .filter(followups::state.eq(FollowupState::Open.as_str()))
            .filter(followups::due_at.gt(window_end)),
        FollowupStatus::Due => items
            .filter(followups::state.eq(FollowupState::Open.as_str()))
            .filter(followups::due_at.ge(now))
            .filter(followups::due_at.le(window_end)),
        FollowupStatus::Overdue => items
            .filter(followups::state.eq(FollowupState::Open.as_str()))
            .filter(followups::due_at.lt(now)),
        FollowupStatus::Completed => {
            items.filter(followups::state.eq(FollowupState::Completed.as_str()))
        }
        FollowupStatus::Cancelled => {
            items.filter(followups::state.eq(FollowupState::Cancelled.as_str()))
        }
    }
}

fn into_domain(rows: Vec<DbFollowup>) -> RepositoryResult<Vec<Followup>> {
    Ok(rows
        .into_iter()
        .map(Followup::try_from)
        .collect::<Result<Vec<_>, _>>()?)
}

pub(super) fn open_in_thread(
    conn: &mut SqliteConnection,
    organization_id: OrganizationId,
    thread_id: &str,
) -> RepositoryResult<Vec<Followup>> {
    let rows = followups::table
        .inner_join(emails::table)
        .filter(followups::organization_id.eq(organization_id.get()))
        .filter(followups::state.eq(FollowupState::Open.as_str()))
        .filter(emails::thread_id.eq(thread_id))
        .order(followups::id.asc())
        .select(DbFollowup::as_select())
        .load::<DbFollowup>(conn)?;

    into_domain(rows)
}

pub(super) fn insert_followup(
    conn: &mut SqliteConnection,
    followup: &NewFollowup,
) -> RepositoryResult<Followup> {
    let created = diesel::insert_into(followups::table)
        .values(DbNewFollowup::from(followup))
        .get_result::<DbFollowup>(conn)?;

    Ok(Followup::try_from(created)?)
}

pub(super) fn save_lifecycle(
    conn: &mut SqliteConnection,
    followup: &Followup,
) -> RepositoryResult<Followup> {
    let updated = diesel::update(
        followups::table
            .filter(followups::id.eq(followup.id.get()))
            .filter(followups::organization_id.eq(followup.organization_id.get())),
    )
    .set(FollowupLifecycle::from(followup))
    .get_result::<DbFollowup>(conn)?;

    Ok(Followup::try_from(updated)?)
}

impl FollowupReader for DieselRepository {
    fn get_followup_by_id(
        &self,
        organization_id: OrganizationId,
        id: FollowupId,
    ) -> RepositoryResult<Option<Followup>> {
        let mut conn = self.conn()?;
        let followup = followups::table
            .filter(followups::id.eq(id.get()))
            .filter(followups::organization_id.eq(organization_id.get()))
            .first::<DbFollowup>(&mut conn)
            .optional()?;

        Ok(followup.map(Followup::try_from).transpose()?)
    }

    fn list_followups(&self, query: FollowupListQuery) -> RepositoryResult<(usize, Vec<Followup>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered(&query).count().get_result(&mut conn)?;

        let mut items = filtered(&query).order((followups::due_at.asc(), followups::id.asc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = into_domain(items.load::<DbFollowup>(&mut conn)?)?;

        Ok((total as usize, items))
    }

    fn list_followups_with_contact_email(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<(Followup, Option<EmailAddress>)>> {
        let mut conn = self.conn()?;
        let rows = followups::table
            .left_join(contacts::table)
            .filter(followups::organization_id.eq(organization_id.get()))
            .order((followups::due_at.asc(), followups::id.asc()))
            .select((DbFollowup::as_select(), contacts::email.nullable()))
            .load::<(DbFollowup, Option<String>)>(&mut conn)?;

        rows.into_iter()
            .map(
                |(followup, email)| -> RepositoryResult<(Followup, Option<EmailAddress>)> {
                    Ok((
                        Followup::try_from(followup)?,
                        email.map(EmailAddress::new).transpose()?,
                    ))
                },
            )
            .collect()
    }

    fn list_open_followups_in_thread(
        &self,
        organization_id: OrganizationId,
        thread_id: &str,
    ) -> RepositoryResult<Vec<Followup>> {
        let mut conn = self.conn()?;
        open_in_thread(&mut conn, organization_id, thread_id)
    }

    fn list_open_followups_due_before(
        &self,
        cutoff: NaiveDateTime,
    ) -> RepositoryResult<Vec<Followup>> {
        let mut conn = self.conn()?;
        let rows = followups::table
            .filter(followups::state.eq(FollowupState::Open.as_str()))
            .filter(followups::due_at.le(cutoff))
            .order((followups::due_at.asc(), followups::id.asc()))
            .load::<DbFollowup>(&mut conn)?;

        into_domain(rows)
    }
}

impl FollowupWriter for DieselRepository {
    fn create_followup(&self, followup: &NewFollowup) -> RepositoryResult<Followup> {
        let mut conn = self.conn()?;
        insert_followup(&mut conn, followup)
    }

    fn update_followup(
        &self,
        organization_id: OrganizationId,
        id: FollowupId,
        updates: &UpdateFollowup,
    ) -> RepositoryResult<Followup> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = diesel::update(
            followups::table
                .filter(followups::id.eq(id.get()))
                .filter(followups::organization_id.eq(organization_id.get())),
        )
        .set(DbUpdateFollowup::new(updates, now))
        .get_result::<DbFollowup>(&mut conn)?;

        Ok(Followup::try_from(updated)?)
    }

    fn save_followup_state(&self, followup: &Followup) -> RepositoryResult<Followup> {
        let mut conn = self.conn()?;
        save_lifecycle(&mut conn, followup)
    }

    fn delete_followup(&self, organization_id: OrganizationId, id: FollowupId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            followups::table
                .filter(followups::id.eq(id.get()))
                .filter(followups::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
