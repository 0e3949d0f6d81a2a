//! YOLO-family object detection using an ONNX model.
//!
//! Runs a YOLOv8-style network through ONNX Runtime on the CPU. The model is
//! loaded once at construction and the session is held for the detector's
//! lifetime behind a mutex.

use std::path::Path;
use std::sync::Mutex;

use image::{DynamicImage, GenericImageView};
use ndarray::Array;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tracing::{debug, info};

use crate::detection::{Detection, COCO_CLASSES};
use crate::detector::Detector;
use crate::error::{DetectError, DetectResult};

/// Configuration for the YOLO detector.
#[derive(Debug, Clone)]
pub struct YoloConfig {
    /// Path to the ONNX model file
    pub model_path: String,
    /// Confidence threshold for retained detections
    pub confidence_threshold: f32,
    /// IoU threshold for NMS
    pub nms_threshold: f32,
    /// Square model input size in pixels
    pub input_size: u32,
    /// Label table override; defaults to the 80 COCO classes
    pub labels: Option<Vec<String>>,
}

impl Default for YoloConfig {
    fn default() -> Self {
        Self {
            model_path: "models/yolov8n.onnx".to_string(),
            confidence_threshold: 0.25,
            nms_threshold: 0.45,
            input_size: 640,
            labels: None,
        }
    }
}

impl YoloConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_path: std::env::var("DETECTOR_MODEL_PATH")
                .unwrap_or(defaults.model_path),
            confidence_threshold: std::env::var("DETECTOR_CONFIDENCE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            nms_threshold: std::env::var("DETECTOR_NMS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.nms_threshold),
            input_size: std::env::var("DETECTOR_INPUT_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.input_size),
            labels: std::env::var("DETECTOR_LABELS")
                .ok()
                .map(|s| s.split(',').map(|l| l.trim().to_string()).collect()),
        }
    }
}

/// Object detector backed by a YOLOv8-family ONNX model.
pub struct YoloDetector {
    session: Mutex<Session>,
    config: YoloConfig,
    labels: Vec<String>,
}

impl YoloDetector {
    /// Load the ONNX model and prepare it for inference.
    ///
    /// Returns an error if the model file doesn't exist or cannot be loaded.
    pub fn new(config: YoloConfig) -> DetectResult<Self> {
        let model_path = Path::new(&config.model_path);
        if !model_path.exists() {
            return Err(DetectError::ModelNotFound(config.model_path.clone()));
        }

        let session = Mutex::new(create_session(model_path)?);
        let labels = config
            .labels
            .clone()
            .unwrap_or_else(|| COCO_CLASSES.iter().map(|s| s.to_string()).collect());

        info!(
            model_path = %config.model_path,
            input_size = config.input_size,
            classes = labels.len(),
            "YOLO detector initialized"
        );

        Ok(Self {
            session,
            config,
            labels,
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &YoloConfig {
        &self.config
    }

    /// Preprocess an image for inference.
    ///
    /// Resizes to the square model input, normalizes pixel values to [0, 1],
    /// and lays the data out as NCHW.
    fn preprocess(&self, img: &DynamicImage) -> DetectResult<Value> {
        let input_size = self.config.input_size;

        let resized = img.resize_exact(
            input_size,
            input_size,
            image::imageops::FilterType::Triangle,
        );

        let rgb = resized.to_rgb8();
        let (w, h) = (input_size as usize, input_size as usize);

        let mut chw_data: Vec<f32> = Vec::with_capacity(3 * h * w);
        for c in 0..3 {
            for y in 0..h {
                for x in 0..w {
                    let pixel = rgb.get_pixel(x as u32, y as u32);
                    chw_data.push(pixel[c] as f32 / 255.0);
                }
            }
        }

        let shape = vec![1usize, 3, h, w];
        Tensor::from_array((shape, chw_data.into_boxed_slice()))
            .map(Value::from)
            .map_err(|e| DetectError::Inference(format!("Failed to create tensor: {}", e)))
    }

    /// Run the session and pull out the raw output tensor.
    fn run_inference(&self, input: Value) -> DetectResult<Vec<f32>> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| DetectError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![input])
            .map_err(|e| DetectError::Inference(format!("ONNX inference failed: {}", e)))?;

        let output = outputs
            .get("output0")
            .ok_or_else(|| DetectError::InvalidOutput("Missing output0 tensor".to_string()))?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| DetectError::InvalidOutput(format!("Failed to extract tensor: {}", e)))?;

        Ok(tensor.1.iter().copied().collect())
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &str {
        "yolo"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn detect(&self, image: &DynamicImage) -> DetectResult<Vec<Detection>> {
        let (width, height) = image.dimensions();

        let input = self.preprocess(image)?;
        let outputs = self.run_inference(input)?;
        let detections = postprocess(&outputs, self.labels.len(), &self.config, width, height)?;

        debug!(count = detections.len(), "Detection completed");
        Ok(detections)
    }
}

/// Create an ONNX Runtime session for the model.
fn create_session(model_path: &Path) -> DetectResult<Session> {
    let model_bytes = std::fs::read(model_path)
        .map_err(|e| DetectError::ModelLoad(format!("Failed to read model file: {}", e)))?;

    Session::builder()
        .map_err(|e| DetectError::ModelLoad(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| DetectError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
        .commit_from_memory(&model_bytes)
        .map_err(|e| DetectError::ModelLoad(format!("Failed to load ONNX model: {}", e)))
}

/// Parse the raw YOLOv8-family output into pixel-space detections.
///
/// Output layout is `[1, 4 + num_classes, num_candidates]`: four box features
/// (cx, cy, w, h in model-input coordinates) followed by per-class scores.
/// Candidates below the confidence threshold are dropped, the rest are scaled
/// back to the original image and run through class-aware NMS.
pub(crate) fn postprocess(
    outputs: &[f32],
    num_classes: usize,
    config: &YoloConfig,
    orig_width: u32,
    orig_height: u32,
) -> DetectResult<Vec<Detection>> {
    let num_features = 4 + num_classes;
    if outputs.is_empty() || outputs.len() % num_features != 0 {
        return Err(DetectError::InvalidOutput(format!(
            "Output length {} is not a multiple of {} features",
            outputs.len(),
            num_features
        )));
    }
    let num_boxes = outputs.len() / num_features;

    // Output is [features, boxes]; transpose to iterate per candidate.
    let output_array = Array::from_shape_vec((num_features, num_boxes), outputs.to_vec())
        .map_err(|e| DetectError::InvalidOutput(format!("Failed to reshape output: {}", e)))?;
    let transposed = output_array.t();

    let input_size = config.input_size as f32;
    let scale_w = orig_width as f32 / input_size;
    let scale_h = orig_height as f32 / input_size;

    let mut candidates: Vec<Detection> = Vec::new();

    for i in 0..num_boxes {
        let cx = transposed[[i, 0]];
        let cy = transposed[[i, 1]];
        let w = transposed[[i, 2]];
        let h = transposed[[i, 3]];

        let mut best_class = 0;
        let mut best_score = 0.0f32;
        for c in 0..num_classes {
            let score = transposed[[i, 4 + c]];
            if score > best_score {
                best_score = score;
                best_class = c;
            }
        }

        if best_score < config.confidence_threshold {
            continue;
        }

        // Center format to corners, scaled to source pixels and clamped.
        let xmin = ((cx - w / 2.0) * scale_w).clamp(0.0, orig_width as f32);
        let ymin = ((cy - h / 2.0) * scale_h).clamp(0.0, orig_height as f32);
        let xmax = ((cx + w / 2.0) * scale_w).clamp(0.0, orig_width as f32);
        let ymax = ((cy + h / 2.0) * scale_h).clamp(0.0, orig_height as f32);

        candidates.push(Detection {
            xmin,
            ymin,
            xmax,
            ymax,
            class_id: best_class,
            confidence: best_score,
        });
    }

    Ok(non_maximum_suppression(candidates, config.nms_threshold))
}

/// Apply Non-Maximum Suppression to remove overlapping same-class detections.
pub(crate) fn non_maximum_suppression(
    mut detections: Vec<Detection>,
    nms_threshold: f32,
) -> Vec<Detection> {
    if detections.is_empty() {
        return detections;
    }

    detections.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap());

    let mut keep = Vec::new();
    let mut suppressed = vec![false; detections.len()];

    for i in 0..detections.len() {
        if suppressed[i] {
            continue;
        }

        keep.push(detections[i].clone());

        for j in (i + 1)..detections.len() {
            if suppressed[j] || detections[i].class_id != detections[j].class_id {
                continue;
            }
            if detections[i].iou(&detections[j]) > nms_threshold {
                suppressed[j] = true;
            }
        }
    }

    keep
}
