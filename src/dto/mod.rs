//! DTO modules that bridge services with templates and APIs.

pub mod ai;
pub mod dashboard;
pub mod emails;
pub mod followups;
pub mod queries;
pub mod session;
