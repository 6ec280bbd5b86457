//! Form and JSON payload definitions accepted by the routes.
//!
//! Each form deserializes the raw request and converts into validated domain
//! values through `TryFrom`, reporting problems as [`FormError`].

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod ai;
pub mod catalog;
pub mod contacts;
pub mod email_accounts;
pub mod emails;
pub mod followups;
pub mod members;
pub mod organizations;
pub mod preferences;
pub mod smart_folders;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid color, expected #RRGGBB")]
    InvalidColor,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("row {row}: {message}")]
    Csv { row: usize, message: String },

    #[error("upload rejected: {0}")]
    Upload(String),
}

impl FormError {
    pub fn field(field: &'static str, err: impl ToString) -> Self {
        FormError::InvalidField {
            field,
            message: err.to_string(),
        }
    }
}

impl From<TypeConstraintError> for FormError {
    fn from(err: TypeConstraintError) -> Self {
        match err {
            TypeConstraintError::InvalidEmail => FormError::InvalidEmail,
            TypeConstraintError::InvalidPhone => FormError::InvalidPhoneNumber,
            TypeConstraintError::InvalidUrl => FormError::InvalidUrl,
            TypeConstraintError::InvalidColor => FormError::InvalidColor,
            other => FormError::field("value", other),
        }
    }
}

/// Turns blank optional inputs into `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts `datetime-local` input values as well as RFC 3339 timestamps.
///
/// Timestamps with an offset are converted to UTC; the others are taken as UTC.
pub fn parse_datetime(raw: &str) -> Result<NaiveDateTime, FormError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| FormError::InvalidDate(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expected() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn parses_browser_and_api_dates() {
        assert_eq!(parse_datetime("2026-03-10T09:30").unwrap(), expected());
        assert_eq!(parse_datetime("2026-03-10T09:30:00").unwrap(), expected());
        assert_eq!(parse_datetime("2026-03-10T11:30:00+02:00").unwrap(), expected());
        assert_eq!(parse_datetime("2026-03-10T09:30:00Z").unwrap(), expected());
        assert!(matches!(
            parse_datetime("tomorrow"),
            Err(FormError::InvalidDate(_))
        ));
    }

    #[test]
    fn blank_optionals_are_dropped() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())).as_deref(), Some("x"));
    }
}
