use diesel::prelude::*;

use crate::domain::member::{Member, MemberRole, NewMember};
use crate::domain::types::{EmailAddress, MemberId, OrganizationId, UserId};
use crate::models::member::{Member as DbMember, NewMember as DbNewMember};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, MemberReader, MemberWriter};
use crate::schema::organization_members;

impl MemberReader for DieselRepository {
    fn get_member_by_id(
        &self,
        organization_id: OrganizationId,
        id: MemberId,
    ) -> RepositoryResult<Option<Member>> {
        let mut conn = self.conn()?;
        let member = organization_members::table
            .filter(organization_members::id.eq(id.get()))
            .filter(organization_members::organization_id.eq(organization_id.get()))
            .first::<DbMember>(&mut conn)
            .optional()?;

        Ok(member.map(Member::try_from).transpose()?)
    }

    fn get_member_for_user(
        &self,
        organization_id: OrganizationId,
        user_id: &UserId,
    ) -> RepositoryResult<Option<Member>> {
        let mut conn = self.conn()?;
        let member = organization_members::table
            .filter(organization_members::organization_id.eq(organization_id.get()))
            .filter(organization_members::user_id.eq(user_id.as_str()))
            .first::<DbMember>(&mut conn)
            .optional()?;

        Ok(member.map(Member::try_from).transpose()?)
    }

    fn list_members(&self, organization_id: OrganizationId) -> RepositoryResult<Vec<Member>> {
        let mut conn = self.conn()?;
        let members = organization_members::table
            .filter(organization_members::organization_id.eq(organization_id.get()))
            .order(organization_members::id.asc())
            .load::<DbMember>(&mut conn)?;

        Ok(members
            .into_iter()
            .map(Member::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    fn count_owners(&self, organization_id: OrganizationId) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let total: i64 = organization_members::table
            .filter(organization_members::organization_id.eq(organization_id.get()))
            .filter(organization_members::role.eq(MemberRole::Owner.as_str()))
            .count()
            .get_result(&mut conn)?;

        Ok(total as usize)
    }
}

impl MemberWriter for DieselRepository {
    fn create_member(&self, member: &NewMember) -> RepositoryResult<Member> {
        let mut conn = self.conn()?;
        let created = diesel::insert_into(organization_members::table)
            .values(DbNewMember::from(member))
            .get_result::<DbMember>(&mut conn)?;

        Ok(Member::try_from(created)?)
    }

    fn update_member_role(
        &self,
        organization_id: OrganizationId,
        id: MemberId,
        role: MemberRole,
    ) -> RepositoryResult<Member> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            organization_members::table
                .filter(organization_members::id.eq(id.get()))
                .filter(organization_members::organization_id.eq(organization_id.get())),
        )
        .set(organization_members::role.eq(role.as_str()))
        .get_result::<DbMember>(&mut conn)?;

        Ok(Member::try_from(updated)?)
    }

    fn delete_member(&self, organization_id: OrganizationId, id: MemberId) -> RepositoryResult<()> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            organization_members::table
                .filter(organization_members::id.eq(id.get()))
                .filter(organization_members::organization_id.eq(organization_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn claim_invitations(&self, user_id: &UserId, email: &EmailAddress) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;
        let claimed = diesel::update(
            organization_members::table
                .filter(organization_members::email.eq(email.as_str()))
                .filter(organization_members::user_id.is_null()),
        )
        .set(organization_members::user_id.eq(user_id.as_str()))
        .execute(&mut conn)?;

        Ok(claimed)
    }
}
