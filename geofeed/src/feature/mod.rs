//! Normalized feature output.
//!
//! Sources return [`geojson::FeatureCollection`]s. This module holds the
//! document-to-feature conversion shared by document-oriented backends and a
//! few constructors used by the retrieval paths.

mod mapper;

pub use mapper::FeatureMapper;

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};

/// Creates an empty feature collection.
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// Creates a feature with a string id, a geometry and properties.
pub fn new_feature(id: impl Into<String>, geometry: Geometry, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: Some(Id::String(id.into())),
        properties: Some(properties),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value as GeoValue;

    #[test]
    fn test_empty_collection() {
        let collection = empty_collection();
        assert!(collection.features.is_empty());
        assert!(collection.bbox.is_none());
    }

    #[test]
    fn test_new_feature_sets_string_id() {
        let geometry = Geometry::new(GeoValue::Point(vec![1.0, 2.0]));
        let feature = new_feature("abc", geometry, JsonObject::new());
        assert_eq!(feature.id, Some(Id::String("abc".to_string())));
        assert!(feature.properties.unwrap().is_empty());
    }
}
