use serde::Serialize;

use crate::auth::AuthenticatedUser;
use crate::domain::member::MemberRole;
use crate::domain::organization::Organization;

#[derive(Debug, Serialize)]
pub struct OrganizationMembership {
    pub organization: Organization,
    pub role: MemberRole,
}

/// Body of `GET /api/v1/session`.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user: AuthenticatedUser,
    pub organizations: Vec<OrganizationMembership>,
}

/// Result of an operation that changed the session claims.
#[derive(Debug)]
pub struct ReissuedSession<T> {
    pub user: AuthenticatedUser,
    pub value: T,
}
