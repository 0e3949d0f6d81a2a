//! Stub detector for tests.

use image::DynamicImage;

use crate::detection::Detection;
use crate::detector::Detector;
use crate::error::{DetectError, DetectResult};

/// Detector that returns a preconfigured detection list.
///
/// Used to exercise the adapter and API without a model file.
pub struct StubDetector {
    detections: Vec<Detection>,
    labels: Vec<String>,
    fail: bool,
}

impl StubDetector {
    /// Stub that yields the given detections on every call.
    pub fn new(detections: Vec<Detection>, labels: Vec<String>) -> Self {
        Self {
            detections,
            labels,
            fail: false,
        }
    }

    /// Stub that detects nothing.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Stub whose detect call always fails.
    pub fn failing() -> Self {
        Self {
            detections: Vec::new(),
            labels: Vec::new(),
            fail: true,
        }
    }
}

impl Detector for StubDetector {
    fn name(&self) -> &str {
        "stub"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn detect(&self, _image: &DynamicImage) -> DetectResult<Vec<Detection>> {
        if self.fail {
            return Err(DetectError::Inference("stub failure".to_string()));
        }
        Ok(self.detections.clone())
    }
}
