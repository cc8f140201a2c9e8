//! Geohash grid aggregation path.
//!
//! Instead of raw geometries, the backend buckets matching documents into
//! geohash cells and computes extended statistics per configured metric.
//! Each cell becomes one point feature at the centre of the cell.

use std::collections::BTreeMap;
use std::time::Duration;

use geo_types::Point;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::client::SearchClient;
use super::query::CELLS_AGGREGATION;
use crate::feature::{empty_collection, new_feature};
use crate::source::{RequestContext, SourceError};

/// Geohash grid aggregation result.
#[derive(Debug, Deserialize)]
struct GridAggregation {
    #[serde(default)]
    buckets: Vec<GridBucket>,
}

/// One geohash cell with its metric sub-aggregations.
#[derive(Debug, Deserialize)]
struct GridBucket {
    key: String,
    #[serde(default)]
    doc_count: u64,
    #[serde(flatten)]
    metrics: Map<String, Value>,
}

/// The subset of `extended_stats` exposed as feature properties.
#[derive(Debug, Deserialize)]
struct ExtendedStats {
    #[serde(default)]
    count: u64,
    avg: Option<f64>,
    #[serde(default)]
    sum: f64,
}

/// Runs the grid aggregation for one source.
pub struct Aggregator<'a, C: SearchClient> {
    client: &'a C,
    index: &'a str,
    aggs: &'a BTreeMap<String, String>,
    timeout: Duration,
}

impl<'a, C: SearchClient> Aggregator<'a, C> {
    pub fn new(
        client: &'a C,
        index: &'a str,
        aggs: &'a BTreeMap<String, String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            index,
            aggs,
            timeout,
        }
    }

    /// Runs the aggregation request in `body` and converts its buckets.
    pub async fn retrieve(
        &self,
        ctx: &RequestContext,
        body: &Value,
    ) -> Result<FeatureCollection, SourceError> {
        let scope = ctx.child(self.timeout);
        let response = scope
            .context()
            .run(self.client.search(self.index, body))
            .await?;

        let Some(cells) = response
            .aggregations
            .as_ref()
            .and_then(|aggregations| aggregations.get(CELLS_AGGREGATION))
        else {
            debug!("No cell aggregation in response");
            return Ok(empty_collection());
        };

        let grid = GridAggregation::deserialize(cells)
            .map_err(|e| SourceError::Decode(format!("invalid cell aggregation: {e}")))?;
        debug!(cells = grid.buckets.len(), "Aggregated cells");

        let mut collection = empty_collection();
        for bucket in grid.buckets.into_iter().filter(|b| b.doc_count > 0) {
            collection.features.push(self.bucket_to_feature(bucket)?);
        }
        Ok(collection)
    }

    /// Converts one cell into a point feature with per-metric statistics.
    ///
    /// Metrics missing from the bucket get no properties at all.
    fn bucket_to_feature(&self, bucket: GridBucket) -> Result<Feature, SourceError> {
        let center = cell_center(&bucket.key)?;
        let geometry = Geometry::new(GeoValue::Point(vec![center.x(), center.y()]));

        let mut properties = JsonObject::new();
        for name in self.aggs.keys() {
            let Some(raw) = bucket.metrics.get(name) else {
                continue;
            };
            let stats = ExtendedStats::deserialize(raw).map_err(|e| {
                let cell = &bucket.key;
                SourceError::Decode(format!("invalid stats for {name} in cell {cell}: {e}"))
            })?;
            properties.insert(format!("{}:avg", name), Value::from(stats.avg));
            properties.insert(format!("{}:sum", name), Value::from(stats.sum));
            properties.insert(format!("{}:count", name), Value::from(stats.count));
        }

        Ok(new_feature(bucket.key, geometry, properties))
    }
}

/// Centre of a geohash cell as a `(lon, lat)` point.
pub fn cell_center(key: &str) -> Result<Point<f64>, SourceError> {
    let cell = geohash::decode_bbox(key)
        .map_err(|e| SourceError::Decode(format!("invalid geohash cell {key}: {e}")))?;
    Ok(Point::from(cell.center()))
}
