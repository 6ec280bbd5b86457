use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::smart_folder::{
    FolderRules, NewSmartFolder as DomainNewSmartFolder, SmartFolder as DomainSmartFolder,
};
use crate::domain::types::{FolderName, OrganizationId, SmartFolderId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::smart_folders)]
pub struct SmartFolder {
    pub id: i32,
    pub organization_id: i32,
    pub user_id: String,
    pub name: String,
    pub rules: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::smart_folders)]
pub struct NewSmartFolder<'a> {
    pub organization_id: i32,
    pub user_id: &'a str,
    pub name: &'a str,
    pub rules: String,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::smart_folders)]
pub struct UpdateSmartFolder<'a> {
    pub name: &'a str,
    pub rules: String,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SmartFolder> for DomainSmartFolder {
    type Error = TypeConstraintError;

    fn try_from(folder: SmartFolder) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SmartFolderId::new(folder.id)?,
            organization_id: OrganizationId::new(folder.organization_id)?,
            user_id: UserId::new(folder.user_id)?,
            name: FolderName::new(folder.name)?,
            rules: FolderRules::parse(&folder.rules)?,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewSmartFolder> for NewSmartFolder<'a> {
    fn from(folder: &'a DomainNewSmartFolder) -> Self {
        Self {
            organization_id: folder.organization_id.get(),
            user_id: folder.user_id.as_str(),
            name: folder.name.as_str(),
            rules: folder.rules.to_json(),
        }
    }
}
