//! Annotation task models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One unit of annotation work supplied by the host platform.
///
/// Tasks carry arbitrary host-side metadata; everything except the id and the
/// image reference is ignored here.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    /// Host-assigned task identifier
    pub id: i64,
    /// Task payload
    pub data: TaskData,
}

/// Payload of a task.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaskData {
    /// Reference to the image to annotate (host upload path, URL, or local path)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Task {
    /// Create a task referencing an image.
    pub fn new(id: i64, image: impl Into<String>) -> Self {
        Self {
            id,
            data: TaskData {
                image: Some(image.into()),
            },
        }
    }
}
