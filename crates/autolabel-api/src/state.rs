//! Application state.

use std::sync::Arc;

use autolabel_backend::{
    BackendConfig, DetectionModel, HostResolver, MlModel, PngDirectorySink, SqliteCache,
    VisualSink,
};
use autolabel_detect::{YoloConfig, YoloDetector};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub model: Arc<dyn MlModel>,
}

impl AppState {
    /// Create state around an already-built model (used by tests).
    pub fn new(config: ApiConfig, model: Arc<dyn MlModel>) -> Self {
        Self { config, model }
    }

    /// Build the full production state from environment configuration.
    pub fn from_env(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let backend_config = BackendConfig::from_env();

        let detector = Arc::new(YoloDetector::new(YoloConfig::from_env())?);
        let cache = Arc::new(SqliteCache::open(&backend_config.cache_path)?);
        let resolver = Arc::new(HostResolver::from_env()?);
        let viz: Option<Arc<dyn VisualSink>> = match &backend_config.viz_dir {
            Some(dir) => Some(Arc::new(PngDirectorySink::new(dir)?)),
            None => None,
        };

        let model = DetectionModel::new(detector, cache, resolver, viz, backend_config);

        Ok(Self {
            config,
            model: Arc::new(model),
        })
    }
}
