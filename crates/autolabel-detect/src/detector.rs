//! Detector trait.

use image::DynamicImage;

use crate::detection::Detection;
use crate::error::DetectResult;

/// Common interface for object detectors.
///
/// The backend adapter only ever sees this trait, so the real ONNX model can
/// be swapped for a fake in tests. Implementations load their model once at
/// construction and hold it for their lifetime.
pub trait Detector: Send + Sync {
    /// Detector identifier (for logging).
    fn name(&self) -> &str;

    /// The label table detections index into.
    fn labels(&self) -> &[String];

    /// Detect objects in a decoded image, boxes in absolute pixels.
    fn detect(&self, image: &DynamicImage) -> DetectResult<Vec<Detection>>;
}
