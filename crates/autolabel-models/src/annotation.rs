//! Rectangle-label annotation results.
//!
//! The host platform stores box annotations in percentage-of-image-dimension
//! coordinates. Detections arrive in absolute pixels, so the conversion here
//! is the one place pixel and percentage spaces meet.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Field bindings of the host labeling configuration.
///
/// The host addresses annotation values by the names of the control and the
/// object they attach to; these are fixed for a rectangle-label config.
pub const FROM_NAME: &str = "label";
pub const TO_NAME: &str = "image";
pub const RESULT_TYPE: &str = "rectanglelabels";

/// A rectangle region in percentage coordinates (0.0 to 100.0), relative to
/// the dimensions of the image it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RectangleValue {
    /// X coordinate of the top-left corner, percent of image width
    pub x: f64,
    /// Y coordinate of the top-left corner, percent of image height
    pub y: f64,
    /// Box width, percent of image width
    pub width: f64,
    /// Box height, percent of image height
    pub height: f64,
    /// Rotation in degrees (always 0 for axis-aligned detections)
    pub rotation: f64,
    /// Resolved class labels for the box
    pub rectanglelabels: Vec<String>,
}

impl RectangleValue {
    /// Convert an absolute pixel box (xmin, ymin, xmax, ymax) into percentage
    /// coordinates relative to the owning image's dimensions.
    pub fn from_pixel_box(
        (xmin, ymin, xmax, ymax): (f32, f32, f32, f32),
        image_width: u32,
        image_height: u32,
        label: impl Into<String>,
    ) -> Self {
        let w = f64::from(image_width);
        let h = f64::from(image_height);
        let box_width = f64::from(xmax - xmin);
        let box_height = f64::from(ymax - ymin);

        Self {
            x: f64::from(xmin) / w * 100.0,
            y: f64::from(ymin) / h * 100.0,
            width: box_width / w * 100.0,
            height: box_height / h * 100.0,
            rotation: 0.0,
            rectanglelabels: vec![label.into()],
        }
    }

    /// Check that the rectangle stays inside the image (small float epsilon).
    pub fn is_valid(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width > 0.0
            && self.height > 0.0
            && self.x + self.width <= 100.001
            && self.y + self.height <= 100.001
    }
}

/// One annotation result record, the host's normalized representation of a
/// single detection.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnnotationResult {
    /// Generated unique identifier for the result
    pub id: String,
    /// Name of the labeling control this value belongs to
    pub from_name: String,
    /// Name of the object the value attaches to
    pub to_name: String,
    /// Result type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// The rectangle value
    pub value: RectangleValue,
    /// Detection confidence in [0, 1]
    pub score: f32,
}

impl AnnotationResult {
    /// Create a rectangle-label result with a fresh unique id.
    pub fn rectangle(value: RectangleValue, score: f32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            from_name: FROM_NAME.to_string(),
            to_name: TO_NAME.to_string(),
            kind: RESULT_TYPE.to_string(),
            value,
            score,
        }
    }
}
