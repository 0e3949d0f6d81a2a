//! Webhook lifecycle events.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Annotation lifecycle event delivered by the host's webhook.
///
/// The host may introduce new actions at any time; unrecognized tags are kept
/// as opaque strings instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WebhookEvent {
    #[serde(rename = "ANNOTATION_CREATED")]
    AnnotationCreated,
    #[serde(rename = "ANNOTATION_UPDATED")]
    AnnotationUpdated,
    #[serde(rename = "START_TRAINING")]
    StartTraining,
    #[serde(untagged)]
    Other(String),
}

impl WebhookEvent {
    /// The wire tag of the event.
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEvent::AnnotationCreated => "ANNOTATION_CREATED",
            WebhookEvent::AnnotationUpdated => "ANNOTATION_UPDATED",
            WebhookEvent::StartTraining => "START_TRAINING",
            WebhookEvent::Other(tag) => tag,
        }
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_events_roundtrip() {
        let event: WebhookEvent = serde_json::from_str("\"ANNOTATION_CREATED\"").unwrap();
        assert_eq!(event, WebhookEvent::AnnotationCreated);
        assert_eq!(serde_json::to_string(&event).unwrap(), "\"ANNOTATION_CREATED\"");
    }

    #[test]
    fn test_unknown_event_is_preserved() {
        let event: WebhookEvent = serde_json::from_str("\"PROJECT_UPDATED\"").unwrap();
        assert_eq!(event, WebhookEvent::Other("PROJECT_UPDATED".to_string()));
        assert_eq!(event.as_str(), "PROJECT_UPDATED");
    }
}
