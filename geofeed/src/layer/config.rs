//! Layer configuration.

use serde::{Deserialize, Serialize};

use super::LayerError;
use crate::source::elasticsearch::ElasticsearchConfig;
use crate::source::postgis::PostGisConfig;

/// Default upper zoom bound of a layer.
pub const DEFAULT_MAXZOOM: u8 = 22;

fn default_maxzoom() -> u8 {
    DEFAULT_MAXZOOM
}

/// Backend selection as written in configuration files.
///
/// Exactly one of the optional backends must be present; use
/// [`SourceConfig::resolve`] to turn it into a [`BackendConfig`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Elasticsearch backend settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elasticsearch: Option<ElasticsearchConfig>,

    /// PostGIS backend settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postgis: Option<PostGisConfig>,
}

impl SourceConfig {
    /// Resolves the single configured backend.
    ///
    /// # Errors
    ///
    /// - `LayerError::NoSources` if no backend is configured
    /// - `LayerError::MultipleSources` if more than one is configured
    pub fn resolve(&self) -> Result<BackendConfig, LayerError> {
        match (&self.elasticsearch, &self.postgis) {
            (Some(es), None) => Ok(BackendConfig::Elasticsearch(es.clone())),
            (None, Some(pg)) => Ok(BackendConfig::PostGis(pg.clone())),
            (Some(_), Some(_)) => Err(LayerError::MultipleSources),
            (None, None) => Err(LayerError::NoSources),
        }
    }
}

/// The one backend a layer reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendConfig {
    Elasticsearch(ElasticsearchConfig),
    PostGis(PostGisConfig),
}

impl BackendConfig {
    /// Short backend name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendConfig::Elasticsearch(_) => "elasticsearch",
            BackendConfig::PostGis(_) => "postgis",
        }
    }
}

/// Declarative configuration of one layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Effective name of the layer.
    pub name: String,

    /// Optional short descriptor.
    #[serde(default)]
    pub description: String,

    /// Lowest zoom level served.
    #[serde(default)]
    pub minzoom: u8,

    /// Highest zoom level served.
    #[serde(default = "default_maxzoom")]
    pub maxzoom: u8,

    /// Backend the layer reads from.
    #[serde(default)]
    pub source: SourceConfig,
}

impl LayerConfig {
    /// Creates a layer config covering all default zoom levels.
    pub fn new(name: impl Into<String>, source: SourceConfig) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            minzoom: 0,
            maxzoom: DEFAULT_MAXZOOM,
            source,
        }
    }

    /// Set the zoom range.
    pub fn with_zoom_range(mut self, minzoom: u8, maxzoom: u8) -> Self {
        self.minzoom = minzoom;
        self.maxzoom = maxzoom;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn es() -> ElasticsearchConfig {
        ElasticsearchConfig::new("localhost", 9200, "idx", "geometry")
    }

    fn pg() -> PostGisConfig {
        serde_json::from_value(serde_json::json!({
            "host": "db",
            "database": "gis",
            "user": "u",
            "table": "t",
            "geometryField": "geom"
        }))
        .unwrap()
    }

    #[test]
    fn test_resolve_elasticsearch() {
        let config = SourceConfig {
            elasticsearch: Some(es()),
            postgis: None,
        };
        let backend = config.resolve().unwrap();
        assert_eq!(backend, BackendConfig::Elasticsearch(es()));
        assert_eq!(backend.kind(), "elasticsearch");
    }

    #[test]
    fn test_resolve_postgis() {
        let config = SourceConfig {
            elasticsearch: None,
            postgis: Some(pg()),
        };
        assert_eq!(config.resolve().unwrap().kind(), "postgis");
    }

    #[test]
    fn test_resolve_none() {
        let result = SourceConfig::default().resolve();
        assert!(matches!(result, Err(LayerError::NoSources)));
    }

    #[test]
    fn test_resolve_both() {
        let config = SourceConfig {
            elasticsearch: Some(es()),
            postgis: Some(pg()),
        };
        assert!(matches!(config.resolve(), Err(LayerError::MultipleSources)));
    }

    #[test]
    fn test_deserialize_layer() {
        let config: LayerConfig = serde_json::from_str(
            r#"{
                "name": "buildings",
                "description": "Building footprints",
                "minzoom": 14,
                "source": {
                    "elasticsearch": {
                        "host": "localhost",
                        "port": 9200,
                        "index": "osm-buildings",
                        "geometryField": "geometry",
                        "sourceFields": {"height": "tags.height"}
                    }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(config.name, "buildings");
        assert_eq!(config.minzoom, 14);
        assert_eq!(config.maxzoom, DEFAULT_MAXZOOM);
        let es = config.source.elasticsearch.unwrap();
        assert_eq!(es.source_fields["height"], "tags.height");
        assert!(config.source.postgis.is_none());
    }

    #[test]
    fn test_deserialize_layer_without_source() {
        let config: LayerConfig = serde_json::from_str(r#"{"name": "empty"}"#).unwrap();
        let resolved = config.source.resolve();
        assert!(matches!(resolved, Err(LayerError::NoSources)));
    }
}
