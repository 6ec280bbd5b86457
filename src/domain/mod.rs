//! Domain aggregates exposed by the CRM service layer.

pub mod ai;
pub mod catalog;
pub mod contact;
pub mod email;
pub mod email_account;
pub mod followup;
pub mod member;
pub mod organization;
pub mod preferences;
pub mod smart_folder;
pub mod types;
