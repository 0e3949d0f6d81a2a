//! Backend configuration.

/// Configuration for the detection backend.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Version tag reported until the update hook bumps it
    pub default_model_version: String,
    /// Path of the SQLite cache database
    pub cache_path: String,
    /// Directory for annotated prediction images; `None` disables the sink
    pub viz_dir: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            default_model_version: "0.0.1".to_string(),
            cache_path: "autolabel.db".to_string(),
            viz_dir: None,
        }
    }
}

impl BackendConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_model_version: std::env::var("MODEL_VERSION")
                .unwrap_or(defaults.default_model_version),
            cache_path: std::env::var("CACHE_PATH").unwrap_or(defaults.cache_path),
            viz_dir: std::env::var("VIZ_OUTPUT_DIR").ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = BackendConfig::default();
        assert_eq!(config.default_model_version, "0.0.1");
        assert!(config.viz_dir.is_none());
    }
}
