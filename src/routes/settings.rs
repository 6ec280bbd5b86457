use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::members::{AddMemberForm, ChangeRoleForm};
use crate::forms::organizations::{LogoPayload, OrganizationForm, UploadLogoForm};
use crate::forms::preferences::{AiSettingsForm, PreferencesForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, login_identity, redirect, render_template};
use crate::services::{
    ServiceError, ServiceResult, dashboard as dashboard_service, members as members_service,
    organizations as organizations_service, preferences as preferences_service,
    session as session_service, transparency as transparency_service,
};

const SETTINGS_PAGE: &str = "/settings";

#[derive(Deserialize)]
pub struct SwitchOrganizationForm {
    pub organization_id: i32,
}

/// Flashes the outcome of a settings form and returns to `location`.
fn flash_outcome<T>(
    result: ServiceResult<T>,
    success: &str,
    action: &str,
    location: &str,
) -> HttpResponse {
    match result {
        Ok(_) => FlashMessage::success(success).send(),
        Err(ServiceError::Unauthorized) => FlashMessage::error("Insufficient permissions.").send(),
        Err(
            ServiceError::Form(message)
            | ServiceError::Conflict(message)
            | ServiceError::TypeConstraint(message),
        ) => FlashMessage::error(message).send(),
        Err(ServiceError::NotFound) => FlashMessage::error("Record not found.").send(),
        Err(err) => {
            log::error!("Failed to {action}: {err}");
            FlashMessage::error(format!("Could not {action}.")).send();
        }
    }
    redirect(location)
}

/// Stores the re-issued session, then flashes like [`flash_outcome`].
fn reissue_outcome(
    req: &HttpRequest,
    server_config: &ServerConfig,
    result: ServiceResult<AuthenticatedUser>,
    success: &str,
    action: &str,
    location: &str,
) -> HttpResponse {
    let result = result.and_then(|user| login_identity(req, &user, &server_config.secret));
    flash_outcome(result, success, action, location)
}

#[get("/settings")]
pub async fn show_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    server_config: web::Data<ServerConfig>,
    tera: web::Data<Tera>,
) -> impl Responder {
    match dashboard_service::load_settings_page(repo.get_ref(), &user) {
        Ok(data) => {
            let mut context = base_context(
                &flash_messages,
                &user,
                "settings",
                &server_config.auth_service_url,
            );
            context.insert("organization", &data.organization);
            context.insert("role", &data.role);
            context.insert("members", &data.members);
            context.insert("preferences", &data.preferences);
            context.insert("email_accounts", &data.email_accounts);

            render_template(&tera, "settings/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => redirect("/na"),
        Err(err) => {
            log::error!("Failed to load settings: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/organization/create")]
pub async fn create_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<OrganizationForm>,
) -> impl Responder {
    let result = organizations_service::create_organization(repo.get_ref(), &user, form)
        .map(|session| session.user);
    reissue_outcome(
        &req,
        &server_config,
        result,
        "Organization created.",
        "create the organization",
        "/",
    )
}

#[post("/organization/switch")]
pub async fn switch_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<SwitchOrganizationForm>,
) -> impl Responder {
    let result = session_service::switch_organization(repo.get_ref(), &user, form.organization_id);
    reissue_outcome(
        &req,
        &server_config,
        result,
        "Organization switched.",
        "switch the organization",
        "/",
    )
}

#[post("/settings/organization")]
pub async fn save_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<OrganizationForm>,
) -> impl Responder {
    let result = organizations_service::update_organization(repo.get_ref(), &user, form)
        .map(|session| session.user);
    reissue_outcome(
        &req,
        &server_config,
        result,
        "Organization saved.",
        "save the organization",
        SETTINGS_PAGE,
    )
}

#[post("/settings/logo")]
pub async fn upload_logo(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    MultipartForm(form): MultipartForm<UploadLogoForm>,
) -> impl Responder {
    let result = LogoPayload::try_from(&form)
        .map_err(ServiceError::from)
        .and_then(|logo| {
            organizations_service::upload_logo(
                repo.get_ref(),
                &user,
                logo,
                &server_config.upload_dir,
            )
        })
        .map(|session| session.user);
    reissue_outcome(
        &req,
        &server_config,
        result,
        "Logo uploaded.",
        "upload the logo",
        SETTINGS_PAGE,
    )
}

#[post("/settings/organization/delete")]
pub async fn delete_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let result = organizations_service::delete_organization(
        repo.get_ref(),
        &user,
        &server_config.upload_dir,
    );
    reissue_outcome(
        &req,
        &server_config,
        result,
        "Organization deleted.",
        "delete the organization",
        "/",
    )
}

#[post("/settings/members/add")]
pub async fn add_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AddMemberForm>,
) -> impl Responder {
    flash_outcome(
        members_service::add_member(repo.get_ref(), &user, form),
        "Member added.",
        "add the member",
        SETTINGS_PAGE,
    )
}

#[post("/settings/members/{member_id}/role")]
pub async fn change_member_role(
    member_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ChangeRoleForm>,
) -> impl Responder {
    flash_outcome(
        members_service::change_member_role(repo.get_ref(), &user, member_id.into_inner(), form),
        "Role updated.",
        "change the role",
        SETTINGS_PAGE,
    )
}

#[post("/settings/members/{member_id}/remove")]
pub async fn remove_member(
    member_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    flash_outcome(
        members_service::remove_member(repo.get_ref(), &user, member_id.into_inner()),
        "Member removed.",
        "remove the member",
        SETTINGS_PAGE,
    )
}

#[post("/settings/preferences")]
pub async fn save_preferences(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PreferencesForm>,
) -> impl Responder {
    flash_outcome(
        preferences_service::update_preferences(repo.get_ref(), &user, form.into()),
        "Preferences saved.",
        "save preferences",
        SETTINGS_PAGE,
    )
}

#[post("/settings/ai")]
pub async fn save_ai_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<AiSettingsForm>,
) -> impl Responder {
    flash_outcome(
        transparency_service::update_ai_settings(repo.get_ref(), &user, form),
        "AI settings saved.",
        "save AI settings",
        SETTINGS_PAGE,
    )
}
