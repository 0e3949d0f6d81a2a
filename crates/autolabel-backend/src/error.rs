//! Backend error types.

use thiserror::Error;

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Task {0} has no image reference in its data")]
    MissingImage(i64),

    #[error("Failed to resolve image reference '{reference}': {message}")]
    Resolve { reference: String, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Detection error: {0}")]
    Detect(#[from] autolabel_detect::DetectError),

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BackendError {
    pub fn resolve(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolve {
            reference: reference.into(),
            message: message.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
