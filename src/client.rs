// PocketBase REST client — implements `RecordStore` over the
// `/api/collections/{collection}/records` endpoints.
//
// One HTTP round trip per store operation. No retries, no pooling beyond
// what reqwest's connection reuse provides, no local state.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{AdapterError, Result};
use crate::filter::Filter;
use crate::store::RecordStore;

/// PocketBase lists are paginated; one page at the server maximum is
/// enough for the per-user cascades this adapter issues.
const LIST_PER_PAGE: &str = "500";

/// Configuration for the PocketBase client.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the PocketBase instance (e.g. `http://127.0.0.1:8090`).
    pub base_url: String,

    /// Optional auth token, sent as the `Authorization` header on every
    /// request. PocketBase expects the raw token, without a scheme prefix.
    pub auth_token: Option<String>,

    /// HTTP request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

/// Async HTTP client for a PocketBase instance.
#[derive(Debug, Clone)]
pub struct PocketBase {
    http: reqwest::Client,
    base_url: String,
}

impl PocketBase {
    /// Create a new client with the given options.
    pub fn new(options: ClientOptions) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = options.auth_token {
            if let Ok(value) = reqwest::header::HeaderValue::from_str(token) {
                headers.insert(reqwest::header::AUTHORIZATION, value);
            }
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(options.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client for an unauthenticated instance at the given URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(ClientOptions {
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    /// The base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/api/collections/{}/records", self.base_url, collection)
    }

    fn record_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}", self.records_url(collection), id)
    }

    /// Map a response to a deserialized body, turning non-2xx statuses
    /// into `AdapterError::Status` with the backend's error message.
    async fn handle<T: serde::de::DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        let status = resp.status();

        if status.is_success() {
            let body = resp.text().await.map_err(AdapterError::network)?;
            serde_json::from_str(&body).map_err(|e| {
                AdapterError::Deserialization(format!("{e} (body: {})", truncate(&body)))
            })
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(AdapterError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            })
        }
    }
}

/// Shape of a record list response; pagination metadata is not needed.
#[derive(Debug, Deserialize)]
struct RecordList {
    items: Vec<serde_json::Value>,
}

/// Pull the `message` field out of a PocketBase JSON error body, falling
/// back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| truncate(body))
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 200;
    if body.len() <= LIMIT {
        return body.to_string();
    }
    // Cut on a char boundary; a fixed byte index could split a
    // multi-byte character.
    let mut end = LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl RecordStore for PocketBase {
    async fn create(
        &self,
        collection: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        tracing::debug!("[PocketBase] CREATE on '{}'", collection);
        let resp = self
            .http
            .post(self.records_url(collection))
            .json(&data)
            .send()
            .await
            .map_err(AdapterError::network)?;
        Self::handle(resp).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<serde_json::Value>> {
        tracing::debug!("[PocketBase] GET on '{}' id '{}'", collection, id);
        let resp = self
            .http
            .get(self.record_url(collection, id))
            .send()
            .await
            .map_err(AdapterError::network)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::handle(resp).await.map(Some)
    }

    async fn first_matching(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<serde_json::Value>> {
        tracing::debug!(
            "[PocketBase] FIND on '{}' filter '{}'",
            collection,
            filter
        );
        let filter_text = filter.render();
        let resp = self
            .http
            .get(self.records_url(collection))
            .query(&[
                ("filter", filter_text.as_str()),
                ("perPage", "1"),
                ("skipTotal", "1"),
            ])
            .send()
            .await
            .map_err(AdapterError::network)?;
        let list: RecordList = Self::handle(resp).await?;
        Ok(list.items.into_iter().next())
    }

    async fn list(&self, collection: &str, filter: &Filter) -> Result<Vec<serde_json::Value>> {
        tracing::debug!(
            "[PocketBase] LIST on '{}' filter '{}'",
            collection,
            filter
        );
        let filter_text = filter.render();
        let resp = self
            .http
            .get(self.records_url(collection))
            .query(&[
                ("filter", filter_text.as_str()),
                ("perPage", LIST_PER_PAGE),
                ("skipTotal", "1"),
            ])
            .send()
            .await
            .map_err(AdapterError::network)?;
        let list: RecordList = Self::handle(resp).await?;
        Ok(list.items)
    }

    async fn patch(
        &self,
        collection: &str,
        id: &str,
        data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        tracing::debug!("[PocketBase] PATCH on '{}' id '{}'", collection, id);
        let resp = self
            .http
            .patch(self.record_url(collection, id))
            .json(&data)
            .send()
            .await
            .map_err(AdapterError::network)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound);
        }
        Self::handle(resp).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<()> {
        tracing::debug!("[PocketBase] DELETE on '{}' id '{}'", collection, id);
        let resp = self
            .http
            .delete(self.record_url(collection, id))
            .send()
            .await
            .map_err(AdapterError::network)?;
        let status = resp.status();
        // 404 makes delete idempotent; PocketBase answers 204 otherwise.
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AdapterError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }
}
