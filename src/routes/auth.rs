use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use serde::Deserialize;

use crate::auth::decode_token;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{login_identity, redirect};
use crate::services::session as session_service;

#[derive(Deserialize)]
struct CallbackParams {
    token: String,
}

/// Link to the external sign-in page with our callback attached.
pub fn signin_url(auth_service_url: &str, callback_url: &str) -> String {
    let query =
        serde_html_form::to_string([("callback", callback_url)].as_slice()).unwrap_or_default();
    let separator = if auth_service_url.contains('?') { '&' } else { '?' };
    format!("{auth_service_url}{separator}{query}")
}

#[get("/auth/signin")]
pub async fn signin(req: HttpRequest, server_config: web::Data<ServerConfig>) -> impl Responder {
    let callback_url = {
        let info = req.connection_info();
        format!("{}://{}/auth/callback", info.scheme(), info.host())
    };
    redirect(&signin_url(&server_config.auth_service_url, &callback_url))
}

#[get("/auth/callback")]
pub async fn callback(
    req: HttpRequest,
    params: web::Query<CallbackParams>,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let user = match decode_token(&params.token, &server_config.secret) {
        Ok(user) => user,
        Err(err) => {
            log::warn!("Rejected sign-in token: {err}");
            return HttpResponse::Unauthorized().body("invalid or expired sign-in token");
        }
    };

    let user = match session_service::enrich_session(repo.get_ref(), user) {
        Ok(user) => user,
        Err(err) => {
            log::error!("Failed to enrich session: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(err) = login_identity(&req, &user, &server_config.secret) {
        log::error!("Failed to sign in {}: {err}", user.sub);
        return HttpResponse::InternalServerError().finish();
    }
    log::info!("User {} signed in", user.sub);

    match user.organization_id {
        Some(_) => redirect("/"),
        None => redirect("/na"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_url_encodes_callback() {
        assert_eq!(
            signin_url("https://auth.example.com/login", "http://crm.local/auth/callback"),
            "https://auth.example.com/login?callback=http%3A%2F%2Fcrm.local%2Fauth%2Fcallback"
        );
        assert_eq!(
            signin_url("https://auth.example.com/login?app=crm", "http://x/cb"),
            "https://auth.example.com/login?app=crm&callback=http%3A%2F%2Fx%2Fcb"
        );
    }
}
