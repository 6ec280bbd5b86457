//! Session identity carried in a signed JWT.
//!
//! The same claims are read from the identity cookie (browser sessions) and
//! from an `Authorization: Bearer` header (API clients).

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::error::InternalError;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder, dev::Payload, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::member::MemberRole;
use crate::domain::organization::Branding;
use crate::domain::types::{EmailAddress, OrganizationId, TypeConstraintError, UserId};
use crate::models::config::ServerConfig;

pub const TOKEN_LIFETIME_DAYS: i64 = 7;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    /// Active organization; `None` until the user joins or creates one.
    #[serde(default)]
    pub organization_id: Option<i32>,
    #[serde(default)]
    pub role: Option<MemberRole>,
    #[serde(default)]
    pub branding: Option<Branding>,
    pub exp: usize,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> Result<UserId, TypeConstraintError> {
        UserId::new(self.sub.as_str())
    }

    pub fn email_address(&self) -> Result<EmailAddress, TypeConstraintError> {
        EmailAddress::new(self.email.as_str())
    }

    pub fn organization(&self) -> Option<OrganizationId> {
        self.organization_id.and_then(|id| OrganizationId::new(id).ok())
    }

    /// Pushes the expiry `days` into the future.
    pub fn set_expiration(&mut self, days: i64) {
        let expiration = Utc::now() + Duration::days(days);
        self.exp = usize::try_from(expiration.timestamp()).unwrap_or_default();
    }

    /// Drops the organization context, e.g. after the organization was deleted.
    pub fn clear_organization(&mut self) {
        self.organization_id = None;
        self.role = None;
        self.branding = None;
    }
}

pub fn issue_token(
    user: &AuthenticatedUser,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::new(Algorithm::HS256),
        user,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verifies signature and expiry of `token`.
pub fn decode_token(
    token: &str,
    secret: &str,
) -> Result<AuthenticatedUser, jsonwebtoken::errors::Error> {
    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Rejection carrying the `{"error": ...}` body used by the JSON API.
fn rejection(mut response: HttpResponseBuilder, message: &'static str) -> actix_web::Error {
    InternalError::from_response(message, response.json(json!({ "error": message }))).into()
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let Some(server_config) = req.app_data::<web::Data<ServerConfig>>() else {
        log::error!("Server config is not registered with the application");
        return Err(rejection(HttpResponse::InternalServerError(), "server misconfigured"));
    };

    let token = match bearer_token(req) {
        Some(token) => token,
        None => req
            .get_identity()
            .ok()
            .and_then(|identity| identity.id().ok())
            .ok_or_else(|| rejection(HttpResponse::Unauthorized(), "not signed in"))?,
    };

    decode_token(&token, &server_config.secret).map_err(|err| {
        log::debug!("Rejected session token: {err}");
        rejection(HttpResponse::Unauthorized(), "invalid session")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}
