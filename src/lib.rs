#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::middleware::{Compress, Logger};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::{RedirectUnauthorized, sandboxed_uploads};
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::api;
#[cfg(feature = "server")]
use crate::routes::auth::{callback, signin};
#[cfg(feature = "server")]
use crate::routes::main::{logout, not_assigned, show_index};
#[cfg(feature = "server")]
use crate::routes::settings::{
    add_member, change_member_role, create_organization, delete_organization, remove_member,
    save_ai_settings, save_organization, save_preferences, show_settings, switch_organization,
    upload_logo,
};

#[cfg(feature = "server")]
pub mod auth;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
#[cfg(feature = "server")]
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid session secret: {e}")))?;

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    std::fs::create_dir_all(&server_config.upload_dir)?;

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{}", server_config.domain)))
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/uploads")
                    .wrap(sandboxed_uploads())
                    .service(Files::new("", &server_config.upload_dir)),
            )
            .service(signin)
            .service(callback)
            .service(
                web::scope("/api")
                    .app_data(api::json_config())
                    .app_data(api::query_config())
                    .configure(api::configure),
            )
            .service(
                web::scope("")
                    .wrap(RedirectUnauthorized)
                    .service(show_index)
                    .service(not_assigned)
                    .service(show_settings)
                    .service(create_organization)
                    .service(switch_organization)
                    .service(save_organization)
                    .service(upload_logo)
                    .service(delete_organization)
                    .service(add_member)
                    .service(change_member_role)
                    .service(remove_member)
                    .service(save_preferences)
                    .service(save_ai_settings)
                    .service(logout),
            )
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
