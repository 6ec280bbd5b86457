use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::ai::{
    AiActivity as DomainAiActivity, AiMemory as DomainAiMemory,
    NewAiActivity as DomainNewAiActivity, NewAiMemory as DomainNewAiMemory,
};
use crate::domain::types::{
    ActivityId, Confidence, MemoryId, OrganizationId, SanitizedText, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ai_activities)]
pub struct AiActivity {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: Option<String>,
    pub kind: String,
    pub entity_type: String,
    pub entity_id: Option<i32>,
    pub summary: String,
    pub confidence: Option<f64>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ai_activities)]
pub struct NewAiActivity<'a> {
    pub organization_id: i32,
    pub user_id: Option<&'a str>,
    pub kind: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<i32>,
    pub summary: &'a str,
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::ai_memories)]
pub struct AiMemory {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: String,
    pub content: String,
    pub source: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::ai_memories)]
pub struct NewAiMemory<'a> {
    pub organization_id: i32,
    pub user_id: &'a str,
    pub content: &'a str,
    pub source: Option<&'a str>,
}

impl TryFrom<AiActivity> for DomainAiActivity {
    type Error = TypeConstraintError;

    fn try_from(activity: AiActivity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ActivityId::new(activity.id)?,
            organization_id: OrganizationId::new(activity.organization_id)?,
            user_id: activity.user_id.map(UserId::new).transpose()?,
            kind: activity.kind.parse()?,
            entity_type: activity.entity_type,
            entity_id: activity.entity_id,
            summary: activity.summary,
            confidence: activity.confidence.map(Confidence::new).transpose()?,
            created_at: activity.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAiActivity> for NewAiActivity<'a> {
    fn from(activity: &'a DomainNewAiActivity) -> Self {
        Self {
            organization_id: activity.organization_id.get(),
            user_id: activity.user_id.as_ref().map(UserId::as_str),
            kind: activity.kind.as_str(),
            entity_type: activity.entity_type.as_str(),
            entity_id: activity.entity_id,
            summary: activity.summary.as_str(),
            confidence: activity.confidence.map(Confidence::get),
        }
    }
}

impl TryFrom<AiMemory> for DomainAiMemory {
    type Error = TypeConstraintError;

    fn try_from(memory: AiMemory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MemoryId::new(memory.id)?,
            organization_id: OrganizationId::new(memory.organization_id)?,
            user_id: UserId::new(memory.user_id)?,
            content: SanitizedText::new(memory.content)?,
            source: memory.source,
            created_at: memory.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewAiMemory> for NewAiMemory<'a> {
    fn from(memory: &'a DomainNewAiMemory) -> Self {
        Self {
            organization_id: memory.organization_id.get(),
            user_id: memory.user_id.as_str(),
            content: memory.content.as_str(),
            source: memory.source.as_deref(),
        }
    }
}
