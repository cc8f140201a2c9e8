//! Query DSL bodies for tile retrieval.
//!
//! All builders are pure: they only shape JSON from the tile bounds and the
//! source configuration.

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::coord::TileBounds;

/// Name of the geohash grid aggregation in requests and responses.
pub const CELLS_AGGREGATION: &str = "cells";

/// Builds the spatial predicate selecting documents whose geometry
/// intersects the tile.
///
/// The envelope is given by its upper-left and lower-right corners,
/// `[[left, top], [right, bottom]]`.
pub fn bounds_filter(geometry_field: &str, bounds: &TileBounds) -> Value {
    json!({
        "geo_shape": {
            geometry_field: {
                "shape": {
                    "type": "envelope",
                    "coordinates": [
                        [bounds.left, bounds.top],
                        [bounds.right, bounds.bottom]
                    ]
                },
                "relation": "intersects"
            }
        }
    })
}

/// Wraps the bounds filter in a non-scoring `bool` query.
pub fn bounds_query(geometry_field: &str, bounds: &TileBounds) -> Value {
    json!({
        "bool": {
            "filter": [bounds_filter(geometry_field, bounds)]
        }
    })
}

/// Document fields worth transferring: the geometry plus every mapped path.
pub fn source_includes(
    geometry_field: &str,
    source_fields: &BTreeMap<String, String>,
) -> Vec<String> {
    let mut fields = vec![geometry_field.to_string()];
    for path in source_fields.values() {
        if !fields.contains(path) {
            fields.push(path.clone());
        }
    }
    fields
}

/// Body of the initial scroll request.
pub fn scroll_body(query: Value, size: usize, includes: &[String]) -> Value {
    json!({
        "query": query,
        "size": size,
        "_source": includes
    })
}

/// Body of the grid aggregation request.
///
/// Every configured metric becomes an `extended_stats` sub-aggregation of
/// the geohash grid, named by its metric key. No hits are returned.
pub fn aggregation_body(
    query: Value,
    geometry_field: &str,
    aggs: &BTreeMap<String, String>,
) -> Value {
    let metrics: serde_json::Map<String, Value> = aggs
        .iter()
        .map(|(name, field)| (name.clone(), json!({"extended_stats": {"field": field}})))
        .collect();

    json!({
        "size": 0,
        "query": query,
        "aggs": {
            CELLS_AGGREGATION: {
                "geohash_grid": {"field": geometry_field},
                "aggs": metrics
            }
        }
    })
}
