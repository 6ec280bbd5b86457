use chrono::Utc;
use diesel::prelude::*;

use crate::domain::smart_folder::{NewSmartFolder, SmartFolder, UpdateSmartFolder};
use crate::domain::types::{OrganizationId, SmartFolderId};
use crate::models::smart_folder::{
    NewSmartFolder as DbNewSmartFolder, SmartFolder as DbSmartFolder,
    UpdateSmartFolder as DbUpdateSmartFolder,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SmartFolderReader, SmartFolderWriter};
use crate::schema::smart_folders;

impl SmartFolderReader for DieselRepository {
    fn get_smart_folder_by_id(
        &self,
        organization_id: OrganizationId,
        id: SmartFolderId,
    ) -> RepositoryResult<Option<SmartFolder>> {
        let mut conn = self.conn()?;
        let folder = smart_folders::table
            .filter(smart_folders::id.eq(id.get()))
            .filter(smart_folders::organization_id.eq(organization_id.get()))
            .first::<DbSmartFolder>(&mut conn)
            .optional()?;

        Ok(folder.map(SmartFolder::try_from).transpose()?)
    }

    fn list_smart_folders(
        &self,
        organization_id: OrganizationId,
    ) -> RepositoryResult<Vec<SmartFolder>> {
        let mut conn = self.conn()?;
        let folders = smart_folders::table
            .filter(smart_folders::organization_id.eq(organization_id.get()))
            .order(smart_folders::id.asc())
            .load::<DbSmartFolder>(&mut conn)?;

        Ok(folders
            .into_iter()
            .map(SmartFolder::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }
}

impl SmartFolderWriter for DieselRepository {
    fn create_smart_folder(&self, folder: &NewSmartFolder) -> RepositoryResult<SmartFolder> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(smart_folders::table)
            .values(DbNewSmartFolder::from(folder))
            .get_result::<DbSmartFolder>(&mut conn)?;

        Ok(SmartFolder::try_from(created)?)
    }

    fn update_smart_folder(
        &self,
        organization_id: OrganizationId,
        id: SmartFolderId,
        updates: &UpdateSmartFolder,
    ) -> RepositoryResult<SmartFolder> {
        let mut conn = self.conn()?;
        let changes = DbUpdateSmartFolder {
            name: updates.name.as_str(),
            rules: updates.rules.to_json(),
            updated_at: Utc::now().naive_utc(),
        };

        let updated = diesel::update(
            smart_folders::table
                .filter(smart_folders::id.eq(id.get()))
                .filter(smart_folders::organization_id.eq(organization_id.get())),
        )
        .set(changes)
        .get_result::<DbSmartFolder>(&mut conn)?;

        Ok(SmartFolder::try_from(updated)?)
    }

    fn delete_smart_folder(
        &self,
        organization_id: OrganizationId,
        id: SmartFolderId,
    ) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            smart_folders::table
                .filter(smart_folders::id.eq(id.get()))
                .filter(smart_folders::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
