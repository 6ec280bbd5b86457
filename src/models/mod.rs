//! Database models shared across the CRM repository.

pub mod ai;
pub mod catalog;
#[cfg(feature = "server")]
pub mod config;
pub mod contact;
pub mod email;
pub mod email_account;
pub mod followup;
pub mod member;
pub mod organization;
pub mod preferences;
pub mod smart_folder;
pub mod zmq;
