use std::time::Duration;

use docdesk_api_types::{CodeCheckResponse, DeleteResponse, ListingResponse, TagSuggestion};
use futures::future::join_all;
use metrics::counter;
use reqwest::{Client, RequestBuilder, Response, header, multipart};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    application::{
        bulk::{BulkError, BulkForm, BulkOutcome, BulkTarget, CsrfToken},
        error::HttpFailure,
        query::{ListQuery, UrlUpdate},
        retry::{RetryPolicy, retry},
    },
    config::{CsrfSettings, Settings},
    domain::types::RecordId,
    infra::{
        error::InfraError,
        markers::{PageMarkers, extract_markers},
    },
};

const CODE_CHECK_PATH: &str = "/admin/coin-packages/check-code";
const TAG_SEARCH_PATH: &str = "/admin/documents/tags/search";
const STATISTICS_PATH: &str = "/admin/statistics/";

/// Where a bulk form submission ended up after the server's redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub landed_on: Url,
    pub markers: PageMarkers,
}

/// HTTP client for the admin endpoints behind the list pages.
#[derive(Clone, Debug)]
pub struct AdminClient {
    client: Client,
    base: Url,
    login_path: String,
    retry: RetryPolicy,
    csrf: CsrfSettings,
}

impl AdminClient {
    pub fn new(settings: &Settings) -> Result<Self, InfraError> {
        Self::with_parts(
            settings.server.base_url.clone(),
            settings.server.login_path.clone(),
            settings.server.request_timeout,
            settings.retry,
            settings.csrf.clone(),
        )
    }

    pub fn with_parts(
        base: Url,
        login_path: String,
        timeout: Duration,
        retry: RetryPolicy,
        csrf: CsrfSettings,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            login_path,
            retry,
            csrf,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("docdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Navigation to the login page when `failure` means the session expired.
    pub fn login_redirect(&self, failure: &HttpFailure) -> Option<UrlUpdate> {
        failure.redirect(&self.login_path)
    }

    pub fn url(&self, path: &str) -> Result<Url, HttpFailure> {
        self.base
            .join(path)
            .map_err(|err| HttpFailure::Transport(format!("invalid path `{path}`: {err}")))
    }

    /// GET a listing endpoint with the server-side pageable parameters.
    /// Transient failures are retried.
    pub async fn fetch_listing(
        &self,
        path: &str,
        query: &ListQuery,
        default_size: usize,
    ) -> Result<ListingResponse, HttpFailure> {
        let mut url = self.url(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.server_pairs(default_size) {
                pairs.append_pair(key, &value);
            }
        }

        retry(&self.retry, HttpFailure::is_retryable, |attempt| {
            let url = url.clone();
            async move {
                debug!(
                    target = "docdesk::infra::http",
                    %url,
                    attempt,
                    "fetching listing"
                );
                self.get_json(url).await
            }
        })
        .await
    }

    /// Whether a coin-package code is already taken, ignoring `exclude_id`.
    pub async fn check_code(
        &self,
        code: &str,
        exclude_id: Option<&RecordId>,
    ) -> Result<bool, HttpFailure> {
        let mut url = self.url(CODE_CHECK_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", code);
            if let Some(id) = exclude_id {
                pairs.append_pair("excludeId", id.as_str());
            }
        }
        let response: CodeCheckResponse = self.get_json(url).await?;
        Ok(response.exists)
    }

    pub async fn search_tags(&self, query: &str) -> Result<Vec<TagSuggestion>, HttpFailure> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let mut url = self.url(TAG_SEARCH_PATH)?;
        url.query_pairs_mut().append_pair("q", query);
        self.get_json(url).await
    }

    /// Raw chart data for the statistics dashboard.
    pub async fn fetch_chart(&self, name: &str) -> Result<serde_json::Value, HttpFailure> {
        let url = self.url(&format!("{STATISTICS_PATH}{name}"))?;
        retry(&self.retry, HttpFailure::is_retryable, |_| {
            let url = url.clone();
            async move { self.get_json(url).await }
        })
        .await
    }

    /// DELETE one record. The optional reason travels in a multipart body.
    pub async fn delete(
        &self,
        path: &str,
        reason_field: &str,
        reason: Option<&str>,
        csrf: Option<&CsrfToken>,
    ) -> Result<DeleteResponse, HttpFailure> {
        let url = self.url(path)?;
        let mut form = multipart::Form::new();
        if let Some(reason) = reason.map(str::trim).filter(|reason| !reason.is_empty()) {
            form = form.text(reason_field.to_string(), reason.to_string());
        }
        if let Some(csrf) = csrf {
            form = form.text(csrf.param.clone(), csrf.value.clone());
        }

        let response = self.send(self.client.delete(url).multipart(form)).await?;
        decode_json(response).await
    }

    /// Fire one DELETE per id concurrently and tally the results once all settle.
    ///
    /// Nothing is sent when the selection is empty or the target has no
    /// per-record DELETE endpoint.
    pub async fn delete_many(
        &self,
        target: BulkTarget,
        ids: &[RecordId],
        reason: Option<&str>,
        csrf: Option<&CsrfToken>,
    ) -> Result<BulkOutcome, BulkError> {
        if ids.is_empty() {
            return Err(BulkError::EmptySelection { target });
        }
        let paths = ids
            .iter()
            .map(|id| target.delete_path(id).map(|path| (id, path)))
            .collect::<Result<Vec<_>, BulkError>>()?;

        let requests = paths.iter().map(|(id, path)| async move {
            let result = self.delete(path, target.reason_field(), reason, csrf).await;
            ((*id).clone(), result)
        });

        let mut outcome = BulkOutcome::new(target);
        for (id, result) in join_all(requests).await {
            match result {
                Ok(response) if response.success => {
                    counter!("docdesk_bulk_item_total", "outcome" => "success").increment(1);
                    outcome.record_success(id);
                }
                Ok(response) => {
                    counter!("docdesk_bulk_item_total", "outcome" => "rejected").increment(1);
                    let reason = response
                        .message
                        .unwrap_or_else(|| "server rejected the deletion".to_string());
                    outcome.record_failure(id, reason);
                }
                Err(failure) => {
                    counter!("docdesk_bulk_item_total", "outcome" => "failed").increment(1);
                    warn!(
                        target = "docdesk::infra::http",
                        record_id = %id,
                        error = %failure,
                        "deletion failed"
                    );
                    outcome.record_failure(id, failure.user_message());
                }
            }
        }

        info!(
            target = "docdesk::infra::http",
            bulk_target = %target,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            "per-item deletion finished"
        );
        Ok(outcome)
    }

    /// POST a bulk form urlencoded and read the markers of the page the
    /// server redirects to.
    pub async fn submit(&self, form: &BulkForm) -> Result<SubmitOutcome, HttpFailure> {
        let url = self.url(form.action_path)?;
        counter!("docdesk_bulk_submit_total", "target" => form.target.key()).increment(1);
        info!(
            target = "docdesk::infra::http",
            bulk_target = %form.target,
            ids = form.id_count(),
            "submitting bulk form"
        );

        let request = self
            .client
            .post(url)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form.encode());
        let response = self.send(request).await?;
        let landed_on = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|err| HttpFailure::Transport(err.to_string()))?;
        let markers = extract_markers(&body, &self.csrf)
            .map_err(|err| HttpFailure::Decode(err.to_string()))?;

        Ok(SubmitOutcome { landed_on, markers })
    }

    /// GET an admin page and read its anti-forgery token and flash messages.
    pub async fn fetch_page_markers(&self, path: &str) -> Result<PageMarkers, HttpFailure> {
        let url = self.url(path)?;
        let response = self.send(self.client.get(url)).await?;
        let body = response
            .text()
            .await
            .map_err(|err| HttpFailure::Transport(err.to_string()))?;
        extract_markers(&body, &self.csrf).map_err(|err| HttpFailure::Decode(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HttpFailure> {
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json");
        let response = self.send(request).await?;
        decode_json(response).await
    }

    /// Send and classify. A redirect that lands on the login page counts as
    /// an expired session.
    async fn send(&self, request: RequestBuilder) -> Result<Response, HttpFailure> {
        let response = request
            .send()
            .await
            .map_err(|err| HttpFailure::Transport(err.to_string()))?;

        if let Some(failure) = HttpFailure::from_status(response.status().as_u16()) {
            warn!(
                target = "docdesk::infra::http",
                url = %response.url(),
                status = response.status().as_u16(),
                "admin request failed"
            );
            return Err(failure);
        }
        if response.url().path() == self.login_path {
            warn!(
                target = "docdesk::infra::http",
                "request was redirected to the login page"
            );
            return Err(HttpFailure::Unauthorized);
        }
        Ok(response)
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, HttpFailure> {
    let bytes = response
        .bytes()
        .await
        .map_err(|err| HttpFailure::Transport(err.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|err| HttpFailure::Decode(err.to_string()))
}
