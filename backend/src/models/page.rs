//! Common pagination query parameters

use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by the paged search endpoints.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// Free-text filter; absent matches everything.
    pub search_string: Option<String>,
    /// Zero-based page number.
    pub page: Option<i64>,
    pub size: Option<i64>,
    /// Sort field, whitelisted per entity.
    pub sort: Option<String>,
}

impl PageQuery {
    /// Search text with blank input treated as absent.
    pub fn search(&self) -> Option<&str> {
        self.search_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
