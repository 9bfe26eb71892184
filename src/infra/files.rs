//! Listings stored as JSON on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use docdesk_api_types::ListingResponse;
use tracing::debug;

use crate::{
    application::{error::AppError, query::ListQuery, repos::ListingSource},
    infra::error::InfraError,
};

/// A listing response saved to a file. Query parameters are ignored; the
/// whole listing is returned and paged locally.
#[derive(Clone, Debug)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ListingSource for JsonFileSource {
    async fn load(&self, _query: &ListQuery) -> Result<ListingResponse, AppError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(InfraError::from)?;
        debug!(
            target = "docdesk::infra::files",
            path = %self.path.display(),
            bytes = bytes.len(),
            "listing file read"
        );
        parse_listing(&bytes)
    }
}

/// Accepts either a `{ "items": [...] }` body or a bare array of rows.
pub fn parse_listing(bytes: &[u8]) -> Result<ListingResponse, AppError> {
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(InfraError::from)?;
    let response = if value.is_array() {
        ListingResponse {
            items: serde_json::from_value(value).map_err(InfraError::from)?,
            total: None,
        }
    } else {
        serde_json::from_value(value).map_err(InfraError::from)?
    };
    Ok(response)
}
