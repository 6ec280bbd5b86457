use actix_identity::Identity;
use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::IncomingFlashMessages;
use chrono::Utc;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, redirect, render_template};
use crate::services::{ServiceError, dashboard as dashboard_service, session as session_service};

#[get("/")]
pub async fn show_index(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match dashboard_service::load_index_page(repo.get_ref(), &user, now) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "index",
                &server_config.auth_service_url,
            );
            context.insert("summary", &data.summary);
            context.insert("upcoming", &data.upcoming);
            context.insert("folders", &data.folders);

            render_template(&tera, "main/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to load the dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Landing page for users without an active organization.
#[get("/na")]
pub async fn not_assigned(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    let memberships = match session_service::list_memberships(repo.get_ref(), &user) {
        Ok(memberships) => memberships,
        Err(err) => {
            log::error!("Failed to list memberships: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let mut context = base_context(
        &flash_messages,
        &user,
        "index",
        &server_config.auth_service_url,
    );
    context.insert("memberships", &memberships);

    render_template(&tera, "main/not_assigned.html", &context)
}

#[post("/logout")]
pub async fn logout(user: Identity) -> impl Responder {
    user.logout();
    redirect("/")
}
