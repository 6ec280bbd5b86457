//! Organization membership and team roles.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    EmailAddress, MemberId, OrganizationId, PersonName, TypeConstraintError, UserId,
};

/// Team role. Variants are ordered from least to most privileged.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Admin,
    Owner,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Member => "member",
            MemberRole::Admin => "admin",
            MemberRole::Owner => "owner",
        }
    }

    /// Returns true when this role grants at least the `required` privileges.
    pub fn at_least(self, required: MemberRole) -> bool {
        self >= required
    }
}

impl Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberRole {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" => Ok(MemberRole::Member),
            "admin" => Ok(MemberRole::Admin),
            "owner" => Ok(MemberRole::Owner),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown role `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Member {
    pub id: MemberId,
    pub organization_id: OrganizationId,
    /// Empty until the invited person signs in for the first time.
    pub user_id: Option<UserId>,
    pub email: EmailAddress,
    pub name: Option<PersonName>,
    pub role: MemberRole,
    pub created_at: NaiveDateTime,
}

impl Member {
    pub fn is_pending(&self) -> bool {
        self.user_id.is_none()
    }
}

#[derive(Clone, Debug)]
pub struct NewMember {
    pub organization_id: OrganizationId,
    pub user_id: Option<UserId>,
    pub email: EmailAddress,
    pub name: Option<PersonName>,
    pub role: MemberRole,
}

impl NewMember {
    #[must_use]
    pub fn invite(
        organization_id: OrganizationId,
        email: EmailAddress,
        name: Option<PersonName>,
        role: MemberRole,
    ) -> Self {
        Self {
            organization_id,
            user_id: None,
            email,
            name,
            role,
        }
    }

    #[must_use]
    pub fn owner(
        organization_id: OrganizationId,
        user_id: UserId,
        email: EmailAddress,
        name: Option<PersonName>,
    ) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            email,
            name,
            role: MemberRole::Owner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(MemberRole::Owner.at_least(MemberRole::Admin));
        assert!(MemberRole::Admin.at_least(MemberRole::Admin));
        assert!(!MemberRole::Member.at_least(MemberRole::Admin));
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<MemberRole>(), Ok(MemberRole::Admin));
        assert!("superuser".parse::<MemberRole>().is_err());
    }
}
