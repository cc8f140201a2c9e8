//! Elasticsearch feature source.
//!
//! Retrieves tile features from an index holding a `geo_shape` field. Two
//! retrieval modes exist:
//!
//! - **Hits**: every document intersecting the tile is scrolled through and
//!   converted with a [`FeatureMapper`].
//! - **Aggregates**: when metrics are configured, documents are bucketed
//!   into geohash cells and one summary point is returned per cell.
//!
//! # Example
//!
//! ```ignore
//! use geofeed::source::elasticsearch::{ElasticsearchConfig, ElasticsearchSource};
//!
//! let config = ElasticsearchConfig::new("localhost", 9200, "buildings", "geometry")
//!     .with_source_field("height", "properties.height");
//! let source = ElasticsearchSource::connect(&config).await?;
//! ```

mod aggregate;
mod client;
mod config;
mod query;
mod scroll;

pub use aggregate::{cell_center, Aggregator};
pub use client::{
    keep_alive_param, Hit, Hits, ReqwestSearchClient, SearchClient, SearchResponse,
    STARTUP_HEALTHCHECK_TIMEOUT,
};
pub use config::{ElasticsearchConfig, DEFAULT_SCROLL_SIZE, DEFAULT_SCROLL_TIMEOUT};
pub use query::{aggregation_body, bounds_filter, bounds_query, scroll_body, source_includes};
pub use scroll::PaginatedRetriever;

#[cfg(test)]
pub use client::tests::{page, point_hit, MockSearchClient};

use std::collections::BTreeMap;
use std::time::Duration;

use geojson::FeatureCollection;
use tracing::{debug, info};

use crate::feature::FeatureMapper;
use crate::source::{BoxFuture, RequestContext, Source, SourceError};
use crate::tile::TileRequest;

/// Feature source backed by an Elasticsearch index.
///
/// The client is created once and shared by every request served through
/// this source.
pub struct ElasticsearchSource<C: SearchClient = ReqwestSearchClient> {
    client: C,
    index: String,
    source_includes: Vec<String>,
    aggs: BTreeMap<String, String>,
    mapper: FeatureMapper,
    scroll_size: usize,
    scroll_timeout: Duration,
}

impl ElasticsearchSource<ReqwestSearchClient> {
    /// Creates a source and checks that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Connection` if the client cannot be built or the
    /// backend does not answer within [`STARTUP_HEALTHCHECK_TIMEOUT`].
    pub async fn connect(config: &ElasticsearchConfig) -> Result<Self, SourceError> {
        let client = ReqwestSearchClient::new(config.base_url())?;
        Self::connect_with_client(config, client).await
    }
}

impl<C: SearchClient> ElasticsearchSource<C> {
    /// Creates a source over an existing client after a connectivity check.
    pub async fn connect_with_client(
        config: &ElasticsearchConfig,
        client: C,
    ) -> Result<Self, SourceError> {
        client.ping().await?;
        info!(
            index = %config.index,
            geometry_field = %config.geometry_field,
            aggregations = config.aggs.len(),
            "Connected Elasticsearch source"
        );
        Ok(Self::with_client(config, client))
    }

    /// Creates a source over an existing client without contacting it.
    pub fn with_client(config: &ElasticsearchConfig, client: C) -> Self {
        Self {
            client,
            index: config.index.clone(),
            source_includes: source_includes(&config.geometry_field, &config.source_fields),
            aggs: config.aggs.clone(),
            mapper: FeatureMapper::new(&config.geometry_field, &config.source_fields),
            scroll_size: config.scroll_size,
            scroll_timeout: config.scroll_timeout(),
        }
    }

    /// The underlying search client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Whether requests go through the aggregation path.
    pub fn uses_aggregations(&self) -> bool {
        !self.aggs.is_empty()
    }

    async fn get_aggregates(
        &self,
        ctx: &RequestContext,
        request: &TileRequest,
    ) -> Result<FeatureCollection, SourceError> {
        let geometry_field = self.mapper.geometry_field();
        let query = bounds_query(geometry_field, request.bounds());
        let body = aggregation_body(query, geometry_field, &self.aggs);

        Aggregator::new(&self.client, &self.index, &self.aggs, self.scroll_timeout)
            .retrieve(ctx, &body)
            .await
    }

    async fn get_hits(
        &self,
        ctx: &RequestContext,
        request: &TileRequest,
    ) -> Result<FeatureCollection, SourceError> {
        let query = bounds_query(self.mapper.geometry_field(), request.bounds());
        debug!(query = %query, "Feature query");
        let body = scroll_body(query, self.scroll_size, &self.source_includes);

        PaginatedRetriever::new(&self.client, &self.index, &self.mapper, self.scroll_timeout)
            .retrieve(ctx, &body)
            .await
    }
}

impl<C: SearchClient> Source for ElasticsearchSource<C> {
    fn get_features<'a>(
        &'a self,
        ctx: &'a RequestContext,
        request: &'a TileRequest,
    ) -> BoxFuture<'a, Result<FeatureCollection, SourceError>> {
        Box::pin(async move {
            if self.uses_aggregations() {
                debug!(tile = %request, "Running aggregate query");
                self.get_aggregates(ctx, request).await
            } else {
                debug!(tile = %request, "Running hit query");
                self.get_hits(ctx, request).await
            }
        })
    }

    fn name(&self) -> &str {
        "elasticsearch"
    }
}
