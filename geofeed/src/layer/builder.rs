//! Layer builder and source factory.

use std::sync::Arc;

use geojson::FeatureCollection;
use tracing::{debug, info};

use super::config::{BackendConfig, LayerConfig};
use super::LayerError;
use crate::source::elasticsearch::ElasticsearchSource;
use crate::source::{BoxFuture, RequestContext, Source, SourceError};
use crate::tile::TileRequest;

/// Builds a [`Source`] from a resolved backend configuration.
///
/// This is the plug point for backends: [`DefaultSourceFactory`] knows the
/// built-in ones, and a custom factory can add others or substitute test
/// doubles.
pub trait SourceFactory: Send + Sync {
    fn build<'a>(
        &'a self,
        backend: &'a BackendConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn Source>, SourceError>>;
}

/// Factory for the backends shipped with this crate.
///
/// Elasticsearch sources are connected and health-checked. PostGIS is
/// configurable but has no retrieval implementation, so it is rejected with
/// `SourceError::UnsupportedBackend`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSourceFactory;

impl SourceFactory for DefaultSourceFactory {
    fn build<'a>(
        &'a self,
        backend: &'a BackendConfig,
    ) -> BoxFuture<'a, Result<Arc<dyn Source>, SourceError>> {
        Box::pin(async move {
            match backend {
                BackendConfig::Elasticsearch(config) => {
                    let source = ElasticsearchSource::connect(config).await?;
                    Ok(Arc::new(source) as Arc<dyn Source>)
                }
                BackendConfig::PostGis(_) => Err(SourceError::UnsupportedBackend("postgis")),
            }
        })
    }
}

/// A named set of features served over a zoom range from one source.
pub struct Layer {
    name: String,
    description: String,
    minzoom: u8,
    maxzoom: u8,
    source: Arc<dyn Source>,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("minzoom", &self.minzoom)
            .field("maxzoom", &self.maxzoom)
            .field("source", &self.source.name())
            .finish()
    }
}

impl Layer {
    /// Builds a layer with the built-in backends.
    ///
    /// # Errors
    ///
    /// - `LayerError::NoSources` / `LayerError::MultipleSources` if the
    ///   config does not select exactly one backend
    /// - `LayerError::InvalidZoomRange` if `minzoom > maxzoom`
    /// - `LayerError::Source` if the backend cannot be created
    pub async fn create(config: &LayerConfig) -> Result<Self, LayerError> {
        Self::create_with(config, &DefaultSourceFactory).await
    }

    /// Builds a layer, creating its source through `factory`.
    pub async fn create_with<F: SourceFactory + ?Sized>(
        config: &LayerConfig,
        factory: &F,
    ) -> Result<Self, LayerError> {
        let backend = config.source.resolve()?;

        if config.minzoom > config.maxzoom {
            return Err(LayerError::InvalidZoomRange {
                layer: config.name.clone(),
                minzoom: config.minzoom,
                maxzoom: config.maxzoom,
            });
        }

        debug!(layer = %config.name, backend = backend.kind(), "Creating layer source");
        let source = factory
            .build(&backend)
            .await
            .map_err(|source| LayerError::Source {
                layer: config.name.clone(),
                source,
            })?;

        info!(
            layer = %config.name,
            backend = source.name(),
            minzoom = config.minzoom,
            maxzoom = config.maxzoom,
            "Layer created"
        );

        Ok(Self {
            name: config.name.clone(),
            description: config.description.clone(),
            minzoom: config.minzoom,
            maxzoom: config.maxzoom,
            source,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn minzoom(&self) -> u8 {
        self.minzoom
    }

    pub fn maxzoom(&self) -> u8 {
        self.maxzoom
    }

    /// The layer's single backend source.
    pub fn source(&self) -> &Arc<dyn Source> {
        &self.source
    }

    /// Whether `zoom` lies within `minzoom..=maxzoom`.
    pub fn covers_zoom(&self, zoom: u8) -> bool {
        (self.minzoom..=self.maxzoom).contains(&zoom)
    }

    /// Retrieves the features of one tile from the layer's source.
    pub async fn get_features(
        &self,
        ctx: &RequestContext,
        request: &TileRequest,
    ) -> Result<FeatureCollection, SourceError> {
        self.source.get_features(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::empty_collection;
    use crate::layer::SourceConfig;
    use crate::source::elasticsearch::ElasticsearchConfig;
    use crate::source::postgis::PostGisConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EmptySource;

    impl Source for EmptySource {
        fn get_features<'a>(
            &'a self,
            _ctx: &'a RequestContext,
            _request: &'a TileRequest,
        ) -> BoxFuture<'a, Result<FeatureCollection, SourceError>> {
            Box::pin(async { Ok(empty_collection()) })
        }

        fn name(&self) -> &str {
            "empty"
        }
    }

    /// Factory that counts builds and optionally fails.
    #[derive(Default)]
    struct MockFactory {
        builds: AtomicUsize,
        error: Option<SourceError>,
    }

    impl SourceFactory for MockFactory {
        fn build<'a>(
            &'a self,
            _backend: &'a BackendConfig,
        ) -> BoxFuture<'a, Result<Arc<dyn Source>, SourceError>> {
            Box::pin(async move {
                self.builds.fetch_add(1, Ordering::SeqCst);
                match &self.error {
                    Some(e) => Err(e.clone()),
                    None => Ok(Arc::new(EmptySource) as Arc<dyn Source>),
                }
            })
        }
    }

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

    fn es_layer(name: &str) -> LayerConfig {
        LayerConfig::new(
            name,
            SourceConfig {
                elasticsearch: Some(es()),
                postgis: None,
            },
        )
    }

    #[tokio::test]
    async fn test_create_with_single_backend() {
        let factory = MockFactory::default();
        let mut config = es_layer("roads").with_zoom_range(4, 16);
        config.description = "Road network".to_string();

        let layer = Layer::create_with(&config, &factory).await.unwrap();

        assert_eq!(layer.name(), "roads");
        assert_eq!(layer.description(), "Road network");
        assert_eq!(layer.minzoom(), 4);
        assert_eq!(layer.maxzoom(), 16);
        assert_eq!(layer.source().name(), "empty");
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_create_without_backend_fails() {
        let factory = MockFactory::default();
        let config = LayerConfig::new("nothing", SourceConfig::default());

        let result = Layer::create_with(&config, &factory).await;

        assert!(matches!(result, Err(LayerError::NoSources)));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_with_two_backends_fails() {
        let factory = MockFactory::default();
        let config = LayerConfig::new(
            "both",
            SourceConfig {
                elasticsearch: Some(es()),
                postgis: Some(pg()),
            },
        );

        let result = Layer::create_with(&config, &factory).await;

        assert!(matches!(result, Err(LayerError::MultipleSources)));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_zoom_range() {
        let factory = MockFactory::default();
        let config = es_layer("inverted").with_zoom_range(12, 3);

        let result = Layer::create_with(&config, &factory).await;

        match result {
            Err(LayerError::InvalidZoomRange {
                layer,
                minzoom,
                maxzoom,
            }) => {
                assert_eq!(layer, "inverted");
                assert_eq!(minzoom, 12);
                assert_eq!(maxzoom, 3);
            }
            other => panic!("Expected InvalidZoomRange, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_source_error_is_wrapped() {
        let factory = MockFactory {
            error: Some(SourceError::Connection("refused".to_string())),
            ..Default::default()
        };

        let result = Layer::create_with(&es_layer("down"), &factory).await;

        match result {
            Err(LayerError::Source { layer, source }) => {
                assert_eq!(layer, "down");
                assert_eq!(source, SourceError::Connection("refused".to_string()));
            }
            other => panic!("Expected Source error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_default_factory_rejects_postgis() {
        let config = LayerConfig::new(
            "parcels",
            SourceConfig {
                elasticsearch: None,
                postgis: Some(pg()),
            },
        );

        let result = Layer::create(&config).await;

        match result {
            Err(LayerError::Source { source, .. }) => {
                assert_eq!(source, SourceError::UnsupportedBackend("postgis"));
            }
            other => panic!("Expected unsupported backend, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_covers_zoom() {
        let factory = MockFactory::default();
        let layer = Layer::create_with(&es_layer("z").with_zoom_range(5, 10), &factory)
            .await
            .unwrap();

        assert!(!layer.covers_zoom(4));
        assert!(layer.covers_zoom(5));
        assert!(layer.covers_zoom(10));
        assert!(!layer.covers_zoom(11));
    }

    #[tokio::test]
    async fn test_get_features_delegates_to_source() {
        let factory = MockFactory::default();
        let layer = Layer::create_with(&es_layer("z"), &factory).await.unwrap();
        let request = TileRequest::new(3, 1, 1).unwrap();

        let collection = layer
            .get_features(&RequestContext::new(), &request)
            .await
            .unwrap();

        assert!(collection.features.is_empty());
    }
}
