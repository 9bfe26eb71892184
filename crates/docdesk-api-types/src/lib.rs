//! Request and response bodies exchanged with the admin JSON endpoints.
//!
//! The server emits camelCase keys. Optional fields default so that a sparse
//! row never fails the whole listing.

use serde::{Deserialize, Serialize};

/// Record identifier as it appears on the wire: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl std::fmt::Display for WireId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireId::Number(value) => write!(f, "{value}"),
            WireId::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorPayload {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPayload {
    pub name: String,
}

/// One row of an admin listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingItem {
    pub id: WireId,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub file_type: String,
    /// File size in kilobytes, as rendered by the server.
    #[serde(default)]
    pub file_size_kb: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub downloads: Option<u64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub has_reports: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 timestamp or a plain `YYYY-MM-DD` date.
    #[serde(default, alias = "created")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub author: AuthorPayload,
    #[serde(default)]
    pub category: CategoryPayload,
}

/// Body returned by listing endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingResponse {
    pub items: Vec<ListingItem>,
    pub total: Option<u64>,
}

/// Body returned by `/admin/coin-packages/check-code`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeCheckResponse {
    pub exists: bool,
}

/// One entry of the tag autocomplete endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSuggestion {
    pub id: WireId,
    pub name: String,
    #[serde(default)]
    pub document_count: Option<u64>,
}

/// Body returned by per-resource DELETE endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: Option<String>,
}
