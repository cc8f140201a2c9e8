//! geofeed CLI - fetch the features of one map tile
//!
//! Loads a JSON layer configuration, builds the layer's source and prints the
//! GeoJSON feature collection for the requested tile.

mod error;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use geofeed::feature::empty_collection;
use geofeed::layer::{Layer, LayerConfig};
use geofeed::logging::{init_logging, DEFAULT_FILTER};
use geofeed::source::{RequestContext, SourceError};
use geofeed::tile::TileRequest;
use geojson::FeatureCollection;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "geofeed")]
#[command(version, about = "Fetch the GeoJSON features of a map tile", long_about = None)]
struct Args {
    /// Path to the JSON layer configuration
    #[arg(long)]
    layer: PathBuf,

    /// Tile zoom level
    #[arg(long)]
    zoom: u8,

    /// Tile column
    #[arg(long)]
    x: u32,

    /// Tile row
    #[arg(long)]
    y: u32,

    /// Overall request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = DEFAULT_FILTER)]
    log_level: String,

    /// Write the feature collection here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let _logging = init_logging(&args.log_level)
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let config = load_layer_config(&args.layer)?;
    let request = TileRequest::new(args.zoom, args.x, args.y).map_err(CliError::InvalidTile)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || {
        eprintln!("Received interrupt, cancelling request...");
        handler_token.cancel();
    })
    .map_err(CliError::SignalHandler)?;

    let timeout = Duration::from_secs(args.timeout);
    let collection = runtime.block_on(async {
        let layer = create_layer(&config, &cancellation).await?;
        if !layer.covers_zoom(request.zoom()) {
            warn!(
                layer = layer.name(),
                zoom = request.zoom(),
                minzoom = layer.minzoom(),
                maxzoom = layer.maxzoom(),
                "Zoom outside layer range, returning no features"
            );
            return Ok(empty_collection());
        }

        let ctx = RequestContext::with_cancellation(cancellation).with_timeout(timeout);
        let collection = layer.get_features(&ctx, &request).await?;
        info!(
            layer = layer.name(),
            tile = %request,
            features = collection.features.len(),
            "Retrieved features"
        );
        Ok::<_, CliError>(collection)
    })?;

    let json = render(&collection, args.compact)?;
    match &args.output {
        Some(path) => fs::write(path, json).map_err(|error| CliError::FileWrite {
            path: path.display().to_string(),
            error,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

/// Builds the layer's source, giving up as soon as the user hits Ctrl-C.
async fn create_layer(
    config: &LayerConfig,
    cancellation: &CancellationToken,
) -> Result<Layer, CliError> {
    tokio::select! {
        biased;
        _ = cancellation.cancelled() => Err(CliError::Fetch(SourceError::Cancelled)),
        layer = Layer::create(config) => Ok(layer?),
    }
}

/// Reads and parses a layer configuration file.
fn load_layer_config(path: &Path) -> Result<LayerConfig, CliError> {
    let shown = path.display();
    let contents = fs::read_to_string(path)
        .map_err(|e| CliError::Config(format!("Failed to read '{}': {}", shown, e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::Config(format!("Invalid layer file '{}': {}", shown, e)))
}

fn render(collection: &FeatureCollection, compact: bool) -> Result<String, CliError> {
    let result = if compact {
        serde_json::to_string(collection)
    } else {
        serde_json::to_string_pretty(collection)
    };
    result.map_err(CliError::Encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "geofeed",
            "--layer",
            "layer.json",
            "--zoom",
            "12",
            "--x",
            "1205",
            "--y",
            "1539",
        ]);
        assert_eq!(args.zoom, 12);
        assert_eq!(args.x, 1205);
        assert_eq!(args.y, 1539);
        assert_eq!(args.timeout, 30);
        assert_eq!(args.log_level, "info");
        assert!(args.output.is_none());
        assert!(!args.compact);
    }

    #[test]
    fn test_load_layer_config() {
        let file = write_config(
            r#"{
                "name": "buildings",
                "maxzoom": 18,
                "source": {"elasticsearch": {
                    "host": "localhost", "port": 9200,
                    "index": "buildings", "geometryField": "geometry"
                }}
            }"#,
        );

        let config = load_layer_config(file.path()).unwrap();

        assert_eq!(config.name, "buildings");
        assert_eq!(config.maxzoom, 18);
        assert!(config.source.elasticsearch.is_some());
    }

    #[test]
    fn test_load_invalid_config() {
        let file = write_config("{ not json");
        let result = load_layer_config(file.path());
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_layer_config(Path::new("/nonexistent/layer.json"));
        match result {
            Err(CliError::Config(msg)) => assert!(msg.contains("/nonexistent/layer.json")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    fn postgis_layer() -> LayerConfig {
        serde_json::from_value(serde_json::json!({
            "name": "roads",
            "source": {"postgis": {
                "host": "db", "database": "gis", "user": "u",
                "table": "roads", "geometryField": "geom"
            }}
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_layer_stops_on_cancel() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let result = create_layer(&postgis_layer(), &cancellation).await;

        assert!(matches!(
            result,
            Err(CliError::Fetch(SourceError::Cancelled))
        ));
    }

    #[tokio::test]
    async fn test_create_layer_reports_build_error() {
        let cancellation = CancellationToken::new();

        let result = create_layer(&postgis_layer(), &cancellation).await;

        assert!(matches!(result, Err(CliError::LayerCreation(_))));
    }

    #[test]
    fn test_render_empty_collection() {
        let compact = render(&empty_collection(), true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&compact).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"], serde_json::json!([]));
        assert!(!compact.contains('\n'));

        let pretty = render(&empty_collection(), false).unwrap();
        assert!(pretty.contains('\n'));
    }
}
