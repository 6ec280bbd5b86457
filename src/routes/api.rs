//! JSON endpoints mounted under `/api`.
//!
//! Every handler delegates to one service call and reports failures as
//! `{ "error": "..." }` with the status from [`crate::routes::error_status`].

use actix_multipart::form::MultipartForm;
use actix_web::error::InternalError;
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, post, put, web};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::dto::queries::{
    ActivityListParams, ContactListParams, EmailListParams, FollowupListParams,
    MemoryListParams, PageParams, ProductListParams,
};
use crate::forms::FormError;
use crate::forms::ai::MemoryForm;
use crate::forms::catalog::{ProductForm, SupplierForm};
use crate::forms::contacts::{ContactForm, UploadContactsForm};
use crate::forms::email_accounts::{NewEmailAccountForm, UpdateEmailAccountForm};
use crate::forms::emails::RecordEmailForm;
use crate::forms::followups::{DraftForm, FollowupForm, SnoozeForm, UpdateFollowupForm};
use crate::forms::members::{AddMemberForm, ChangeRoleForm};
use crate::forms::organizations::{LogoPayload, OrganizationForm, UploadLogoForm};
use crate::forms::preferences::{AiSettingsPayload, PreferencesUpdate};
use crate::forms::smart_folders::SmartFolderForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{
    created_response, empty_response, error_response, json_response, login_identity,
};
use crate::services::{
    ServiceError, ServiceResult, catalog as catalog_service, contacts as contacts_service,
    email_accounts as email_accounts_service, emails as emails_service,
    followups as followups_service, members as members_service,
    organizations as organizations_service, preferences as preferences_service,
    session as session_service, smart_folders as smart_folders_service,
    transparency as transparency_service,
};

/// Rejects malformed JSON bodies with the same error shape as the handlers.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = error_response(&ServiceError::Form(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = error_response(&ServiceError::Form(err.to_string()));
        InternalError::from_response(err, response).into()
    })
}

/// Stores the new session cookie and returns it for bearer clients too.
fn reissued_response<T: serde::Serialize>(
    req: &HttpRequest,
    server_config: &ServerConfig,
    result: ServiceResult<(AuthenticatedUser, T)>,
    created: bool,
) -> HttpResponse {
    let outcome = result.and_then(|(user, value)| {
        let token = login_identity(req, &user, &server_config.secret)?;
        Ok(json!({ "token": token, "user": user, "data": value }))
    });
    if created {
        created_response(outcome)
    } else {
        json_response(outcome)
    }
}

// Session

#[derive(Deserialize)]
pub struct SwitchOrganizationPayload {
    pub organization_id: i32,
}

#[get("/v1/session")]
pub async fn get_session(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(session_service::session_view(repo.get_ref(), &user))
}

#[post("/v1/session/organization")]
pub async fn switch_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(payload): web::Json<SwitchOrganizationPayload>,
) -> impl Responder {
    let result = session_service::switch_organization(
        repo.get_ref(),
        &user,
        payload.organization_id,
    )
    .map(|user| (user, ()));
    reissued_response(&req, &server_config, result, false)
}

// Organizations

#[get("/v1/organizations")]
pub async fn list_organizations(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(session_service::list_memberships(repo.get_ref(), &user))
}

#[post("/v1/organizations")]
pub async fn create_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<OrganizationForm>,
) -> impl Responder {
    let result = organizations_service::create_organization(repo.get_ref(), &user, form)
        .map(|session| (session.user, session.value));
    reissued_response(&req, &server_config, result, true)
}

#[get("/v1/organization")]
pub async fn get_organization(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(organizations_service::get_current_organization(
        repo.get_ref(),
        &user,
    ))
}

#[put("/v1/organization")]
pub async fn update_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<OrganizationForm>,
) -> impl Responder {
    let result = organizations_service::update_organization(repo.get_ref(), &user, form)
        .map(|session| (session.user, session.value));
    reissued_response(&req, &server_config, result, false)
}

#[delete("/v1/organization")]
pub async fn delete_organization(
    req: HttpRequest,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let result =
        organizations_service::delete_organization(repo.get_ref(), &user, &server_config.upload_dir)
            .map(|user| (user, ()));
    reissued_response(&req, &server_config, result, false)
}

#[get("/v1/organization/logo")]
pub async fn get_logo(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(
        organizations_service::get_logo(repo.get_ref(), &user)
            .map(|logo_url| json!({ "logo_url": logo_url })),
    )
}

#[post("/v1/organization/logo")]
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
        .map(|session| (session.user, session.value));
    reissued_response(&req, &server_config, result, false)
}

// Members

#[get("/v1/members")]
pub async fn list_members(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(members_service::list_members(repo.get_ref(), &user))
}

#[post("/v1/members")]
pub async fn add_member(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<AddMemberForm>,
) -> impl Responder {
    created_response(members_service::add_member(repo.get_ref(), &user, form))
}

#[put("/v1/members/{member_id}")]
pub async fn change_member_role(
    member_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ChangeRoleForm>,
) -> impl Responder {
    json_response(members_service::change_member_role(
        repo.get_ref(),
        &user,
        member_id.into_inner(),
        form,
    ))
}

#[delete("/v1/members/{member_id}")]
pub async fn remove_member(
    member_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(members_service::remove_member(
        repo.get_ref(),
        &user,
        member_id.into_inner(),
    ))
}

// Preferences

#[get("/v1/preferences")]
pub async fn get_preferences(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(preferences_service::get_preferences(repo.get_ref(), &user))
}

#[put("/v1/preferences")]
pub async fn update_preferences(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(update): web::Json<PreferencesUpdate>,
) -> impl Responder {
    json_response(preferences_service::update_preferences(
        repo.get_ref(),
        &user,
        update,
    ))
}

// Contacts

#[get("/v1/contacts")]
pub async fn list_contacts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<ContactListParams>,
) -> impl Responder {
    json_response(contacts_service::list_contacts(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/v1/contacts")]
pub async fn create_contact(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactForm>,
) -> impl Responder {
    created_response(contacts_service::create_contact(repo.get_ref(), &user, form))
}

#[post("/v1/contacts/import")]
pub async fn import_contacts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadContactsForm>,
) -> impl Responder {
    let result = form
        .csv
        .file
        .reopen()
        .map_err(|err| ServiceError::from(FormError::Upload(err.to_string())))
        .and_then(|file| contacts_service::import_contacts(repo.get_ref(), &user, file))
        .map(|imported| json!({ "imported": imported }));
    created_response(result)
}

#[get("/v1/contacts/{contact_id}")]
pub async fn get_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(contacts_service::get_contact(
        repo.get_ref(),
        &user,
        contact_id.into_inner(),
    ))
}

#[put("/v1/contacts/{contact_id}")]
pub async fn update_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ContactForm>,
) -> impl Responder {
    json_response(contacts_service::update_contact(
        repo.get_ref(),
        &user,
        contact_id.into_inner(),
        form,
    ))
}

#[delete("/v1/contacts/{contact_id}")]
pub async fn delete_contact(
    contact_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(contacts_service::delete_contact(
        repo.get_ref(),
        &user,
        contact_id.into_inner(),
    ))
}

// Email accounts

#[get("/v1/email-accounts")]
pub async fn list_email_accounts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(email_accounts_service::list_email_accounts(
        repo.get_ref(),
        &user,
    ))
}

#[post("/v1/email-accounts")]
pub async fn create_email_account(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<NewEmailAccountForm>,
) -> impl Responder {
    created_response(email_accounts_service::create_email_account(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[put("/v1/email-accounts/{account_id}")]
pub async fn update_email_account(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateEmailAccountForm>,
) -> impl Responder {
    json_response(email_accounts_service::update_email_account(
        repo.get_ref(),
        &user,
        account_id.into_inner(),
        form,
    ))
}

#[delete("/v1/email-accounts/{account_id}")]
pub async fn delete_email_account(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(email_accounts_service::delete_email_account(
        repo.get_ref(),
        &user,
        account_id.into_inner(),
    ))
}

#[post("/v1/email-accounts/{account_id}/synced")]
pub async fn mark_email_account_synced(
    account_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(email_accounts_service::mark_synced(
        repo.get_ref(),
        &user,
        account_id.into_inner(),
    ))
}

// Emails

#[get("/v1/emails")]
pub async fn list_emails(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<EmailListParams>,
) -> impl Responder {
    json_response(emails_service::list_emails(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/v1/emails")]
pub async fn record_email(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<RecordEmailForm>,
) -> impl Responder {
    let now = Utc::now().naive_utc();
    match emails_service::record_email_for_user(repo.get_ref(), &user, form, now) {
        Ok(recorded) if recorded.inserted => HttpResponse::Created().json(recorded),
        Ok(recorded) => HttpResponse::Ok().json(recorded),
        Err(err) => error_response(&err),
    }
}

// Follow-ups

#[get("/v1/followups")]
pub async fn list_followups(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<FollowupListParams>,
) -> impl Responder {
    json_response(followups_service::list_followups(
        repo.get_ref(),
        &user,
        params.into_inner(),
        Utc::now().naive_utc(),
    ))
}

#[get("/v1/followups/summary")]
pub async fn followup_summary(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(followups_service::status_summary(
        repo.get_ref(),
        &user,
        Utc::now().naive_utc(),
    ))
}

#[post("/v1/followups")]
pub async fn create_followup(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<FollowupForm>,
) -> impl Responder {
    created_response(followups_service::create_followup(
        repo.get_ref(),
        &user,
        form,
        Utc::now().naive_utc(),
    ))
}

#[get("/v1/followups/{followup_id}")]
pub async fn get_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(followups_service::get_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        Utc::now().naive_utc(),
    ))
}

#[put("/v1/followups/{followup_id}")]
pub async fn update_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<UpdateFollowupForm>,
) -> impl Responder {
    json_response(followups_service::update_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        form,
        Utc::now().naive_utc(),
    ))
}

#[delete("/v1/followups/{followup_id}")]
pub async fn delete_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(followups_service::delete_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
    ))
}

#[post("/v1/followups/{followup_id}/snooze")]
pub async fn snooze_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SnoozeForm>,
) -> impl Responder {
    let result = form.until().map_err(ServiceError::from).and_then(|until| {
        followups_service::snooze_followup(
            repo.get_ref(),
            &user,
            followup_id.into_inner(),
            until,
            Utc::now().naive_utc(),
        )
    });
    json_response(result)
}

#[post("/v1/followups/{followup_id}/complete")]
pub async fn complete_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(followups_service::complete_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        Utc::now().naive_utc(),
    ))
}

#[post("/v1/followups/{followup_id}/cancel")]
pub async fn cancel_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(followups_service::cancel_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        Utc::now().naive_utc(),
    ))
}

#[post("/v1/followups/{followup_id}/reopen")]
pub async fn reopen_followup(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(followups_service::reopen_followup(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        Utc::now().naive_utc(),
    ))
}

#[post("/v1/followups/{followup_id}/draft")]
pub async fn attach_draft(
    followup_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<DraftForm>,
) -> impl Responder {
    json_response(followups_service::attach_draft(
        repo.get_ref(),
        &user,
        followup_id.into_inner(),
        form,
        Utc::now().naive_utc(),
    ))
}

// Smart folders

#[get("/v1/smart-folders")]
pub async fn list_smart_folders(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(smart_folders_service::list_smart_folders(
        repo.get_ref(),
        &user,
    ))
}

#[get("/v1/smart-folders/counts")]
pub async fn smart_folder_counts(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(smart_folders_service::folder_counts(
        repo.get_ref(),
        &user,
        Utc::now().naive_utc(),
    ))
}

#[post("/v1/smart-folders")]
pub async fn create_smart_folder(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SmartFolderForm>,
) -> impl Responder {
    created_response(smart_folders_service::create_smart_folder(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[get("/v1/smart-folders/{folder_id}")]
pub async fn get_smart_folder(
    folder_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(smart_folders_service::get_smart_folder(
        repo.get_ref(),
        &user,
        folder_id.into_inner(),
    ))
}

#[put("/v1/smart-folders/{folder_id}")]
pub async fn update_smart_folder(
    folder_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SmartFolderForm>,
) -> impl Responder {
    json_response(smart_folders_service::update_smart_folder(
        repo.get_ref(),
        &user,
        folder_id.into_inner(),
        form,
    ))
}

#[delete("/v1/smart-folders/{folder_id}")]
pub async fn delete_smart_folder(
    folder_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(smart_folders_service::delete_smart_folder(
        repo.get_ref(),
        &user,
        folder_id.into_inner(),
    ))
}

#[get("/v1/smart-folders/{folder_id}/followups")]
pub async fn evaluate_smart_folder(
    folder_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<PageParams>,
) -> impl Responder {
    json_response(smart_folders_service::evaluate_smart_folder(
        repo.get_ref(),
        &user,
        folder_id.into_inner(),
        params.page,
        Utc::now().naive_utc(),
    ))
}

// Catalog

#[get("/v1/suppliers")]
pub async fn list_suppliers(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(catalog_service::list_suppliers(repo.get_ref(), &user))
}

#[post("/v1/suppliers")]
pub async fn create_supplier(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SupplierForm>,
) -> impl Responder {
    created_response(catalog_service::create_supplier(repo.get_ref(), &user, form))
}

#[get("/v1/suppliers/{supplier_id}")]
pub async fn get_supplier(
    supplier_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(catalog_service::get_supplier(
        repo.get_ref(),
        &user,
        supplier_id.into_inner(),
    ))
}

#[put("/v1/suppliers/{supplier_id}")]
pub async fn update_supplier(
    supplier_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<SupplierForm>,
) -> impl Responder {
    json_response(catalog_service::update_supplier(
        repo.get_ref(),
        &user,
        supplier_id.into_inner(),
        form,
    ))
}

#[delete("/v1/suppliers/{supplier_id}")]
pub async fn delete_supplier(
    supplier_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(catalog_service::delete_supplier(
        repo.get_ref(),
        &user,
        supplier_id.into_inner(),
    ))
}

#[get("/v1/products")]
pub async fn list_products(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<ProductListParams>,
) -> impl Responder {
    json_response(catalog_service::list_products(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/v1/products")]
pub async fn create_product(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProductForm>,
) -> impl Responder {
    created_response(catalog_service::create_product(repo.get_ref(), &user, form))
}

#[get("/v1/products/{product_id}")]
pub async fn get_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(catalog_service::get_product(
        repo.get_ref(),
        &user,
        product_id.into_inner(),
    ))
}

#[put("/v1/products/{product_id}")]
pub async fn update_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ProductForm>,
) -> impl Responder {
    json_response(catalog_service::update_product(
        repo.get_ref(),
        &user,
        product_id.into_inner(),
        form,
    ))
}

#[delete("/v1/products/{product_id}")]
pub async fn delete_product(
    product_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(catalog_service::delete_product(
        repo.get_ref(),
        &user,
        product_id.into_inner(),
    ))
}

// AI transparency

#[get("/v1/ai/activities")]
pub async fn list_activities(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<ActivityListParams>,
) -> impl Responder {
    json_response(transparency_service::list_activities(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[get("/v1/ai/memories")]
pub async fn list_memories(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    params: web::Query<MemoryListParams>,
) -> impl Responder {
    json_response(transparency_service::list_memories(
        repo.get_ref(),
        &user,
        params.into_inner(),
    ))
}

#[post("/v1/ai/memories")]
pub async fn create_memory(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<MemoryForm>,
) -> impl Responder {
    created_response(transparency_service::create_memory(
        repo.get_ref(),
        &user,
        form,
    ))
}

#[delete("/v1/ai/memories/{memory_id}")]
pub async fn delete_memory(
    memory_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    empty_response(transparency_service::delete_memory(
        repo.get_ref(),
        &user,
        memory_id.into_inner(),
    ))
}

#[get("/v1/ai/settings")]
pub async fn get_ai_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    json_response(transparency_service::get_ai_settings(repo.get_ref(), &user))
}

#[put("/v1/ai/settings")]
pub async fn update_ai_settings(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(payload): web::Json<AiSettingsPayload>,
) -> impl Responder {
    json_response(transparency_service::update_ai_settings(
        repo.get_ref(),
        &user,
        payload,
    ))
}

/// Registers every `/v1` endpoint on the `/api` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_session)
        .service(switch_organization)
        .service(list_organizations)
        .service(create_organization)
        .service(get_organization)
        .service(update_organization)
        .service(delete_organization)
        .service(get_logo)
        .service(upload_logo)
        .service(list_members)
        .service(add_member)
        .service(change_member_role)
        .service(remove_member)
        .service(get_preferences)
        .service(update_preferences)
        .service(list_contacts)
        .service(create_contact)
        .service(import_contacts)
        .service(get_contact)
        .service(update_contact)
        .service(delete_contact)
        .service(list_email_accounts)
        .service(create_email_account)
        .service(update_email_account)
        .service(delete_email_account)
        .service(mark_email_account_synced)
        .service(list_emails)
        .service(record_email)
        .service(list_followups)
        .service(followup_summary)
        .service(create_followup)
        .service(get_followup)
        .service(update_followup)
        .service(delete_followup)
        .service(snooze_followup)
        .service(complete_followup)
        .service(cancel_followup)
        .service(reopen_followup)
        .service(attach_draft)
        .service(list_smart_folders)
        .service(smart_folder_counts)
        .service(create_smart_folder)
        .service(get_smart_folder)
        .service(update_smart_folder)
        .service(delete_smart_folder)
        .service(evaluate_smart_folder)
        .service(list_suppliers)
        .service(create_supplier)
        .service(get_supplier)
        .service(update_supplier)
        .service(delete_supplier)
        .service(list_products)
        .service(create_product)
        .service(get_product)
        .service(update_product)
        .service(delete_product)
        .service(list_activities)
        .service(list_memories)
        .service(create_memory)
        .service(delete_memory)
        .service(get_ai_settings)
        .service(update_ai_settings);
}
