//! The host's model lifecycle contract.

use async_trait::async_trait;
use serde_json::Value;

use autolabel_models::{Prediction, Task, WebhookEvent};

use crate::error::BackendResult;

/// Capability interface the host invokes on an ML backend.
///
/// Implementations are injected into the API server, so tests can serve a
/// fake model; nothing here requires inheriting from host framework types.
#[async_trait]
pub trait MlModel: Send + Sync {
    /// Configure the backend for a project; returns the active model version.
    async fn setup(&self, project: Option<&str>, label_schema: Option<&str>)
        -> BackendResult<String>;

    /// Run inference on a batch of tasks, one prediction per task.
    ///
    /// A task without a resolvable image reference fails the whole batch;
    /// the host surfaces the failed request to the user.
    async fn predict(&self, tasks: &[Task], context: Option<&Value>)
        -> BackendResult<Vec<Prediction>>;

    /// Handle an annotation lifecycle event.
    ///
    /// Must return quickly; the host forbids long-running work in this hook.
    async fn fit(&self, event: &WebhookEvent, payload: &Value) -> BackendResult<()>;

    /// The currently stored model version, if any.
    async fn model_version(&self) -> BackendResult<Option<String>>;
}
