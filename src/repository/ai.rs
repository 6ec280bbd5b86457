use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::ai::{AiActivity, AiMemory, NewAiActivity, NewAiMemory};
use crate::domain::types::{ActivityId, MemoryId, OrganizationId};
use crate::models::ai::{
    AiActivity as DbAiActivity, AiMemory as DbAiMemory, NewAiActivity as DbNewAiActivity,
    NewAiMemory as DbNewAiMemory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, DieselRepository, MemoryListQuery,
    MemoryReader, MemoryWriter,
};
use crate::schema::{ai_activities, ai_memories};

fn filtered_activities(query: &ActivityListQuery) -> ai_activities::BoxedQuery<'static, Sqlite> {
    let mut items = ai_activities::table
        .filter(ai_activities::organization_id.eq(query.organization_id.get()))
        .into_boxed();

    if let Some(kind) = query.kind {
        items = items.filter(ai_activities::kind.eq(kind.as_str()));
    }

    items
}

fn filtered_memories(query: &MemoryListQuery) -> ai_memories::BoxedQuery<'static, Sqlite> {
    let mut items = ai_memories::table
        .filter(ai_memories::organization_id.eq(query.organization_id.get()))
        .filter(ai_memories::user_id.eq(query.user_id.as_str().to_string()))
        .into_boxed();

    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        items = items.filter(ai_memories::content.like(format!("%{term}%")));
    }

    items
}

impl ActivityReader for DieselRepository {
    fn get_activity_by_id(
        &self,
        organization_id: OrganizationId,
        id: ActivityId,
    ) -> RepositoryResult<Option<AiActivity>> {
        let mut conn = self.conn()?;
        let activity = ai_activities::table
            .filter(ai_activities::id.eq(id.get()))
            .filter(ai_activities::organization_id.eq(organization_id.get()))
            .first::<DbAiActivity>(&mut conn)
            .optional()?;

        Ok(activity.map(AiActivity::try_from).transpose()?)
    }

    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<AiActivity>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_activities(&query).count().get_result(&mut conn)?;

        let mut items = filtered_activities(&query)
            .order((ai_activities::created_at.desc(), ai_activities::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbAiActivity>(&mut conn)?
            .into_iter()
            .map(AiActivity::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

pub(super) fn insert_activity(
    conn: &mut SqliteConnection,
    activity: &NewAiActivity,
) -> RepositoryResult<AiActivity> {
    let created = diesel::insert_into(ai_activities::table)
        .values(DbNewAiActivity::from(activity))
        .get_result::<DbAiActivity>(conn)?;

    Ok(AiActivity::try_from(created)?)
}

impl ActivityWriter for DieselRepository {
    fn create_activity(&self, activity: &NewAiActivity) -> RepositoryResult<AiActivity> {
        let mut conn = self.conn()?;
        insert_activity(&mut conn, activity)
    }
}

impl MemoryReader for DieselRepository {
    fn get_memory_by_id(
        &self,
        organization_id: OrganizationId,
        id: MemoryId,
    ) -> RepositoryResult<Option<AiMemory>> {
        let mut conn = self.conn()?;
        let memory = ai_memories::table
            .filter(ai_memories::id.eq(id.get()))
            .filter(ai_memories::organization_id.eq(organization_id.get()))
            .first::<DbAiMemory>(&mut conn)
            .optional()?;

        Ok(memory.map(AiMemory::try_from).transpose()?)
    }

    fn list_memories(&self, query: MemoryListQuery) -> RepositoryResult<(usize, Vec<AiMemory>)> {
        let mut conn = self.conn()?;

        let total: i64 = filtered_memories(&query).count().get_result(&mut conn)?;

        let mut items = filtered_memories(&query)
            .order((ai_memories::created_at.desc(), ai_memories::id.desc()));
        if let Some(pagination) = &query.pagination {
            items = items.limit(pagination.limit()).offset(pagination.offset());
        }
        let items = items
            .load::<DbAiMemory>(&mut conn)?
            .into_iter()
            .map(AiMemory::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((total as usize, items))
    }
}

impl MemoryWriter for DieselRepository {
    fn create_memory(&self, memory: &NewAiMemory) -> RepositoryResult<AiMemory> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(ai_memories::table)
            .values(DbNewAiMemory::from(memory))
            .get_result::<DbAiMemory>(&mut conn)?;

        Ok(AiMemory::try_from(created)?)
    }

    fn delete_memory(&self, organization_id: OrganizationId, id: MemoryId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            ai_memories::table
                .filter(ai_memories::id.eq(id.get()))
                .filter(ai_memories::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
