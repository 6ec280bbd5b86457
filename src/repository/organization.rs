use chrono::Utc;
use diesel::prelude::*;

use crate::domain::member::{Member, NewMember};
use crate::domain::organization::{
    NewOrganization, Organization, OrganizationOwner, UpdateOrganization,
};
use crate::domain::smart_folder::{FolderRules, NewSmartFolder};
use crate::domain::types::{FolderName, OrganizationId, UserId, WebUrl};
use crate::models::member::{Member as DbMember, NewMember as DbNewMember};
use crate::models::organization::{
    NewOrganization as DbNewOrganization, Organization as DbOrganization,
    UpdateOrganization as DbUpdateOrganization,
};
use crate::models::smart_folder::NewSmartFolder as DbNewSmartFolder;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OrganizationReader, OrganizationWriter};
use crate::schema::{organization_members, organizations, smart_folders};

impl OrganizationReader for DieselRepository {
    fn get_organization_by_id(
        &self,
        id: OrganizationId,
    ) -> RepositoryResult<Option<Organization>> {
        let mut conn = self.conn()?;
        let organization = organizations::table
            .find(id.get())
            .first::<DbOrganization>(&mut conn)
            .optional()?;

        Ok(organization.map(Organization::try_from).transpose()?)
    }

    fn list_organizations_for_user(
        &self,
        user_id: &UserId,
    ) -> RepositoryResult<Vec<(Organization, Member)>> {
        let mut conn = self.conn()?;
        let rows = organizations::table
            .inner_join(organization_members::table)
            .filter(organization_members::user_id.eq(user_id.as_str()))
            .order((
                organization_members::created_at.asc(),
                organization_members::id.asc(),
            ))
            .select((DbOrganization::as_select(), DbMember::as_select()))
            .load::<(DbOrganization, DbMember)>(&mut conn)?;

        rows.into_iter()
            .map(
                |(organization, member)| -> RepositoryResult<(Organization, Member)> {
                    Ok((
                        Organization::try_from(organization)?,
                        Member::try_from(member)?,
                    ))
                },
            )
            .collect()
    }
}

impl OrganizationWriter for DieselRepository {
    fn create_organization(
        &self,
        organization: &NewOrganization,
        owner: &OrganizationOwner,
        folders: &[(FolderName, FolderRules)],
    ) -> RepositoryResult<Organization> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let created = diesel::insert_into(organizations::table)
                .values(DbNewOrganization::from(organization))
                .get_result::<DbOrganization>(conn)?;
            let created = Organization::try_from(created)?;

            let member = NewMember::owner(
                created.id,
                owner.user_id.clone(),
                owner.email.clone(),
                owner.name.clone(),
            );
            diesel::insert_into(organization_members::table)
                .values(DbNewMember::from(&member))
                .execute(conn)?;

            let new_folders: Vec<NewSmartFolder> = folders
                .iter()
                .map(|(name, rules)| NewSmartFolder {
                    organization_id: created.id,
                    user_id: owner.user_id.clone(),
                    name: name.clone(),
                    rules: rules.clone(),
                })
                .collect();
            let insertables: Vec<DbNewSmartFolder> =
                new_folders.iter().map(DbNewSmartFolder::from).collect();
            diesel::insert_into(smart_folders::table)
                .values(&insertables)
                .execute(conn)?;

            Ok(created)
        })
    }

    fn update_organization(
        &self,
        id: OrganizationId,
        updates: &UpdateOrganization,
    ) -> RepositoryResult<Organization> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = diesel::update(organizations::table.find(id.get()))
            .set(DbUpdateOrganization::new(updates, now))
            .get_result::<DbOrganization>(&mut conn)?;

        Ok(Organization::try_from(updated)?)
    }

    fn set_organization_logo(
        &self,
        id: OrganizationId,
        logo_url: &WebUrl,
    ) -> RepositoryResult<Organization> {
        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let updated = diesel::update(organizations::table.find(id.get()))
            .set((
                organizations::logo_url.eq(logo_url.as_str()),
                organizations::updated_at.eq(now),
            ))
            .get_result::<DbOrganization>(&mut conn)?;

        Ok(Organization::try_from(updated)?)
    }

    fn delete_organization(&self, id: OrganizationId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(organizations::table.find(id.get())).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
