//! Object detection engine for the autolabel ML backend.
//!
//! This crate provides:
//! - The `Detector` trait the backend adapter works against
//! - `YoloDetector`, a YOLOv8-family ONNX detector (ort runtime)
//! - `StubDetector` for deterministic tests
//!
//! Detections are reported as axis-aligned boxes in absolute pixel
//! coordinates of the source image; converting them to the host's
//! percentage format is the adapter's job.

pub mod detection;
pub mod detector;
pub mod error;
pub mod stub;
pub mod yolo;

pub use detection::{Detection, COCO_CLASSES};
pub use detector::Detector;
pub use error::{DetectError, DetectResult};
pub use stub::StubDetector;
pub use yolo::{YoloConfig, YoloDetector};
