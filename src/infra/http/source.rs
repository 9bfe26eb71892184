use async_trait::async_trait;
use docdesk_api_types::ListingResponse;

use crate::application::{error::AppError, query::ListQuery, repos::ListingSource};

use super::AdminClient;

/// Listing endpoint of one admin page.
#[derive(Clone, Debug)]
pub struct HttpListingSource {
    client: AdminClient,
    path: String,
    default_size: usize,
}

impl HttpListingSource {
    pub fn new(client: AdminClient, path: impl Into<String>, default_size: usize) -> Self {
        Self {
            client,
            path: path.into(),
            default_size,
        }
    }
}

#[async_trait]
impl ListingSource for HttpListingSource {
    async fn load(&self, query: &ListQuery) -> Result<ListingResponse, AppError> {
        Ok(self
            .client
            .fetch_listing(&self.path, query, self.default_size)
            .await?)
    }
}
