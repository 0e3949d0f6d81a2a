//! Model lifecycle adapter for the autolabel ML backend.
//!
//! This crate provides:
//! - The `MlModel` lifecycle trait (setup/predict/fit) the API serves
//! - `DetectionModel`, the adapter from detector output to host annotations
//! - Resource resolution for task image references
//! - The key-value cache scoped to one backend instance
//! - An optional visualization sink for predicted boxes

pub mod adapter;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod resolver;
pub mod viz;

pub use adapter::DetectionModel;
pub use cache::{KvCache, MemoryCache, SqliteCache};
pub use config::BackendConfig;
pub use error::{BackendError, BackendResult};
pub use model::MlModel;
pub use resolver::{HostResolver, ResolverConfig, ResourceResolver};
pub use viz::{PngDirectorySink, VisualSink};
