//! Task image resource resolution.
//!
//! Task data references images as host upload paths (`/data/upload/...`),
//! absolute URLs, or plain local paths. Local paths pass through untouched;
//! everything else is downloaded from the host with the configured API token
//! into a scratch directory that lives as long as the resolver.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{BackendError, BackendResult};

/// Configuration for resource resolution.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Base URL of the host platform, for relative upload references
    pub host_url: Option<String>,
    /// API token for authenticated downloads
    pub api_key: Option<String>,
    /// Download timeout
    pub timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            host_url: None,
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl ResolverConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host_url: std::env::var("HOST_URL").ok(),
            api_key: std::env::var("HOST_API_KEY").ok(),
            timeout: Duration::from_secs(
                std::env::var("HOST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// Maps an image reference plus task id to a local file path.
#[async_trait]
pub trait ResourceResolver: Send + Sync {
    async fn resolve(&self, reference: &str, task_id: i64) -> BackendResult<PathBuf>;
}

/// Resolver backed by the host platform's download endpoint.
pub struct HostResolver {
    http: Client,
    config: ResolverConfig,
    scratch: TempDir,
}

impl HostResolver {
    /// Create a new resolver.
    pub fn new(config: ResolverConfig) -> BackendResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(BackendError::Network)?;
        let scratch = tempfile::tempdir()?;

        Ok(Self {
            http,
            config,
            scratch,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> BackendResult<Self> {
        Self::new(ResolverConfig::from_env())
    }

    /// Build the download URL for a non-local reference.
    fn download_url(&self, reference: &str) -> BackendResult<String> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(reference.to_string());
        }

        let host = self.config.host_url.as_deref().ok_or_else(|| {
            BackendError::resolve(
                reference,
                "reference is not a local file and HOST_URL is not configured",
            )
        })?;

        Ok(format!(
            "{}/{}",
            host.trim_end_matches('/'),
            reference.trim_start_matches('/')
        ))
    }

    /// File name for the downloaded copy, keeping the original extension.
    fn scratch_name(reference: &str, task_id: i64) -> String {
        match Path::new(reference).extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("task-{}.{}", task_id, ext),
            None => format!("task-{}", task_id),
        }
    }
}

#[async_trait]
impl ResourceResolver for HostResolver {
    async fn resolve(&self, reference: &str, task_id: i64) -> BackendResult<PathBuf> {
        let local = reference.strip_prefix("file://").unwrap_or(reference);
        if Path::new(local).exists() {
            debug!(task_id, reference, "Using local image path");
            return Ok(PathBuf::from(local));
        }

        let url = self.download_url(reference)?;
        debug!(task_id, url = %url, "Downloading task image");

        let mut request = self.http.get(&url);
        if let Some(key) = &self.config.api_key {
            request = request.header(AUTHORIZATION, format!("Token {}", key));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(BackendError::resolve(
                reference,
                format!("host returned {}", response.status()),
            ));
        }

        let bytes = response.bytes().await?;
        let path = self.scratch.path().join(Self::scratch_name(reference, task_id));
        tokio::fs::write(&path, &bytes).await?;

        info!(task_id, size = bytes.len(), "Downloaded task image");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_local_path_passes_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("img.png");
        std::fs::write(&file, b"not really a png").unwrap();

        let resolver = HostResolver::new(ResolverConfig::default()).unwrap();
        let resolved = resolver
            .resolve(file.to_str().unwrap(), 1)
            .await
            .unwrap();
        assert_eq!(resolved, file);
    }

    #[tokio::test]
    async fn test_unresolvable_reference_without_host() {
        let resolver = HostResolver::new(ResolverConfig::default()).unwrap();
        let err = resolver.resolve("/data/upload/1/img.png", 1).await;
        assert!(matches!(err, Err(BackendError::Resolve { .. })));
    }

    #[tokio::test]
    async fn test_downloads_upload_reference_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/upload/1/img.png"))
            .and(header("Authorization", "Token secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"image bytes".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = HostResolver::new(ResolverConfig {
            host_url: Some(server.uri()),
            api_key: Some("secret".to_string()),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let resolved = resolver.resolve("/data/upload/1/img.png", 7).await.unwrap();
        assert_eq!(std::fs::read(&resolved).unwrap(), b"image bytes");
        assert!(resolved.file_name().unwrap().to_str().unwrap().contains("task-7"));
    }

    #[tokio::test]
    async fn test_download_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let resolver = HostResolver::new(ResolverConfig {
            host_url: Some(server.uri()),
            api_key: None,
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let err = resolver.resolve("/data/upload/1/missing.png", 1).await;
        assert!(matches!(err, Err(BackendError::Resolve { .. })));
    }
}
