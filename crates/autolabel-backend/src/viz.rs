//! Visualization sink for predicted boxes.
//!
//! Optional debugging aid: when enabled, each predicted task image is written
//! out with its detection boxes drawn on top. Sink failures are logged by the
//! caller and never affect the prediction result.

use std::path::PathBuf;

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use autolabel_detect::Detection;

use crate::error::BackendResult;

/// Receives the decoded image and its detections after each prediction.
pub trait VisualSink: Send + Sync {
    fn publish(&self, task_id: i64, image: &RgbImage, detections: &[Detection]) -> BackendResult<()>;
}

/// Sink that writes one annotated PNG per task into a directory.
pub struct PngDirectorySink {
    dir: PathBuf,
}

impl PngDirectorySink {
    /// Create the sink, making the output directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> BackendResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }
}

impl VisualSink for PngDirectorySink {
    fn publish(&self, task_id: i64, image: &RgbImage, detections: &[Detection]) -> BackendResult<()> {
        let mut canvas = image.clone();

        for det in detections {
            let width = det.width().round().max(1.0) as u32;
            let height = det.height().round().max(1.0) as u32;
            let rect = Rect::at(det.xmin.round() as i32, det.ymin.round() as i32)
                .of_size(width, height);
            draw_hollow_rect_mut(&mut canvas, rect, Rgb([255u8, 56, 56]));
        }

        let path = self.dir.join(format!("task-{}.png", task_id));
        canvas.save(&path)?;
        debug!(task_id, path = %path.display(), count = detections.len(), "Wrote visualization");
        Ok(())
    }
}
