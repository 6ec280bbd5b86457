//! HTTP handlers: HTML pages under `/`, JSON endpoints under `/api/v1`.

use actix_identity::Identity;
use actix_web::http::{StatusCode, header};
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde::Serialize;
use serde_json::json;
use tera::{Context, Tera};

use crate::auth::{AuthenticatedUser, issue_token};
use crate::services::{ServiceError, ServiceResult};

pub mod api;
pub mod auth;
pub mod main;
pub mod settings;

/// Bootstrap alert class for a flash message level.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, the signed-in user and navigation.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: &AuthenticatedUser,
    current_page: &str,
    home_url: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", user);
    context.insert("current_page", current_page);
    context.insert("home_url", home_url);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Signs `user` and stores the token as the session identity.
pub fn login_identity(
    req: &HttpRequest,
    user: &AuthenticatedUser,
    secret: &str,
) -> ServiceResult<String> {
    let token = issue_token(user, secret).map_err(|err| {
        log::error!("Failed to issue session token: {err}");
        ServiceError::Internal(err.to_string())
    })?;
    Identity::login(&req.extensions(), token.clone()).map_err(|err| {
        log::error!("Failed to store session identity: {err}");
        ServiceError::Internal(err.to_string())
    })?;
    Ok(token)
}

pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Form(_) | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized => StatusCode::FORBIDDEN,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Repository(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// `{ "error": ... }` body for a failed service call.
///
/// Storage and internal failures are logged and reported generically.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let status = error_status(err);
    let message = match err {
        ServiceError::Unauthorized => "insufficient permissions".to_string(),
        ServiceError::Form(message) | ServiceError::Conflict(message) => message.clone(),
        ServiceError::Repository(_) | ServiceError::Internal(_) => {
            log::error!("Request failed: {err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    };
    HttpResponse::build(status).json(json!({ "error": message }))
}

pub fn json_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(&err),
    }
}

pub fn created_response<T: Serialize>(result: ServiceResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Created().json(value),
        Err(err) => error_response(&err),
    }
}

pub fn empty_response(result: ServiceResult<()>) -> HttpResponse {
    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}
