//! Search backend client abstraction for testability

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::source::SourceError;

/// Timeout for the connectivity check performed when a source is built.
pub const STARTUP_HEALTHCHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for establishing TCP connections to the backend.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response of a search or scroll request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Cursor for the next scroll page, present on scroll responses.
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,

    /// Matching documents of this page.
    #[serde(default)]
    pub hits: Hits,

    /// Aggregation results keyed by aggregation name.
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
}

/// Hit envelope of a search response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// One matching document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Hit {
    /// Backend-assigned identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Raw document body.
    #[serde(rename = "_source", default)]
    pub source: Value,
}

/// Trait for search backend operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock clients in tests. Implementations are shared across
/// concurrent requests and must not hold per-request state.
pub trait SearchClient: Send + Sync {
    /// Checks that the backend is reachable.
    fn ping(&self) -> impl Future<Output = Result<(), SourceError>> + Send;

    /// Runs a one-shot search (used for aggregations).
    fn search(
        &self,
        index: &str,
        body: &Value,
    ) -> impl Future<Output = Result<SearchResponse, SourceError>> + Send;

    /// Opens a scroll cursor and returns its first page.
    fn open_scroll(
        &self,
        index: &str,
        body: &Value,
        keep_alive: Duration,
    ) -> impl Future<Output = Result<SearchResponse, SourceError>> + Send;

    /// Fetches the next page of an open scroll cursor.
    fn continue_scroll(
        &self,
        scroll_id: &str,
        keep_alive: Duration,
    ) -> impl Future<Output = Result<SearchResponse, SourceError>> + Send;

    /// Releases a scroll cursor on the server.
    fn clear_scroll(
        &self,
        scroll_id: &str,
    ) -> impl Future<Output = Result<(), SourceError>> + Send;
}

/// Formats a keep-alive duration as an Elasticsearch time unit.
pub fn keep_alive_param(keep_alive: Duration) -> String {
    format!("{}s", keep_alive.as_secs().max(1))
}

/// Real search client talking to the Elasticsearch REST API with reqwest.
///
/// The underlying connection pool is created once and shared by every
/// request issued through this client.
#[derive(Debug, Clone)]
pub struct ReqwestSearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestSearchClient {
    /// Creates a client for `base_url` (e.g. `http://localhost:9200`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Connection(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a JSON request and decodes a JSON response.
    async fn send_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: &Value,
    ) -> Result<T, SourceError> {
        let response = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(|e| SourceError::Query(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SourceError::Query(format!(
                "HTTP {} from {}: {}",
                status, url, detail
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| {
                SourceError::Decode(format!("Failed to parse response from {}: {}", url, e))
            })
    }
}

impl SearchClient for ReqwestSearchClient {
    async fn ping(&self) -> Result<(), SourceError> {
        let response = self
            .client
            .get(&self.base_url)
            .timeout(STARTUP_HEALTHCHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                SourceError::Connection(format!("{} unreachable: {}", self.base_url, e))
            })?;

        if !response.status().is_success() {
            return Err(SourceError::Connection(format!(
                "HTTP {} from {}",
                response.status(),
                self.base_url
            )));
        }
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, SourceError> {
        let url = format!("{}/{}/_search", self.base_url, index);
        self.send_json(Method::POST, url, body).await
    }

    async fn open_scroll(
        &self,
        index: &str,
        body: &Value,
        keep_alive: Duration,
    ) -> Result<SearchResponse, SourceError> {
        let url = format!(
            "{}/{}/_search?scroll={}",
            self.base_url,
            index,
            keep_alive_param(keep_alive)
        );
        self.send_json(Method::POST, url, body).await
    }

    async fn continue_scroll(
        &self,
        scroll_id: &str,
        keep_alive: Duration,
    ) -> Result<SearchResponse, SourceError> {
        let url = format!("{}/_search/scroll", self.base_url);
        let body = json!({
            "scroll": keep_alive_param(keep_alive),
            "scroll_id": scroll_id
        });
        self.send_json(Method::POST, url, &body).await
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<(), SourceError> {
        let url = format!("{}/_search/scroll", self.base_url);
        let response = self
            .client
            .delete(&url)
            .json(&json!({"scroll_id": [scroll_id]}))
            .send()
            .await
            .map_err(|e| SourceError::Query(format!("Request to {} failed: {}", url, e)))?;

        // An already expired cursor is reported as 404
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Ok(()),
            status => Err(SourceError::Query(format!("HTTP {} from {}", status, url))),
        }
    }
}
