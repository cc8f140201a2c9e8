//! Elasticsearch source configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Maximum number of documents per scroll page.
pub const DEFAULT_SCROLL_SIZE: usize = 250;

/// Time budget for fetching one scroll page, also used as the server-side
/// keep-alive of the scroll cursor.
pub const DEFAULT_SCROLL_TIMEOUT: Duration = Duration::from_secs(60);

fn default_scroll_size() -> usize {
    DEFAULT_SCROLL_SIZE
}

fn default_scroll_timeout_secs() -> u64 {
    DEFAULT_SCROLL_TIMEOUT.as_secs()
}

/// Configuration for an Elasticsearch-backed layer source.
///
/// # Example
///
/// ```
/// use geofeed::source::elasticsearch::ElasticsearchConfig;
///
/// let config: ElasticsearchConfig = serde_json::from_str(r#"{
///     "host": "localhost",
///     "port": 9200,
///     "index": "buildings",
///     "geometryField": "geometry",
///     "sourceFields": {"height": "properties.height"}
/// }"#).unwrap();
///
/// assert_eq!(config.scroll_size, 250);
/// assert!(!config.uses_aggregations());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElasticsearchConfig {
    /// Backend host name.
    pub host: String,

    /// Backend HTTP port.
    pub port: u16,

    /// Index (or alias / pattern) to query.
    pub index: String,

    /// Dotted path of the `geo_shape` field holding feature geometries.
    pub geometry_field: String,

    /// Feature property name → dotted document path.
    #[serde(default)]
    pub source_fields: BTreeMap<String, String>,

    /// Metric name → numeric field. Non-empty switches the source to
    /// geohash grid aggregation.
    #[serde(default)]
    pub aggs: BTreeMap<String, String>,

    /// Documents per scroll page.
    #[serde(default = "default_scroll_size")]
    pub scroll_size: usize,

    /// Per-page time budget in seconds.
    #[serde(default = "default_scroll_timeout_secs")]
    pub scroll_timeout_secs: u64,
}

impl ElasticsearchConfig {
    /// Create a config with default paging and no mappings.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        index: impl Into<String>,
        geometry_field: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            index: index.into(),
            geometry_field: geometry_field.into(),
            source_fields: BTreeMap::new(),
            aggs: BTreeMap::new(),
            scroll_size: DEFAULT_SCROLL_SIZE,
            scroll_timeout_secs: DEFAULT_SCROLL_TIMEOUT.as_secs(),
        }
    }

    /// Add a property mapping.
    pub fn with_source_field(
        mut self,
        property: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        self.source_fields.insert(property.into(), path.into());
        self
    }

    /// Add a metric aggregation.
    pub fn with_agg(mut self, name: impl Into<String>, field: impl Into<String>) -> Self {
        self.aggs.insert(name.into(), field.into());
        self
    }

    /// Base URL of the backend REST API.
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Per-page time budget.
    pub fn scroll_timeout(&self) -> Duration {
        Duration::from_secs(self.scroll_timeout_secs)
    }

    /// Whether retrieval goes through the aggregation path.
    pub fn uses_aggregations(&self) -> bool {
        !self.aggs.is_empty()
    }
}
