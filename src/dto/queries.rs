//! Query string parameters accepted by listing endpoints.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactListParams {
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EmailListParams {
    pub account_id: Option<i32>,
    pub contact_id: Option<i32>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FollowupListParams {
    pub status: Option<String>,
    pub contact_id: Option<i32>,
    /// Restricts the listing to the caller's own follow-ups.
    #[serde(default)]
    pub mine: bool,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub supplier_id: Option<i32>,
    pub search: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityListParams {
    pub kind: Option<String>,
    pub page: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryListParams {
    pub search: Option<String>,
    pub page: Option<usize>,
}

/// Trims the search term and drops it when blank.
pub fn search_term(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
