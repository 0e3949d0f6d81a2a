//! Detection records.

/// One detected object: an axis-aligned box in absolute pixel coordinates of
/// the source image, a class index, and a confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Left edge in pixels
    pub xmin: f32,
    /// Top edge in pixels
    pub ymin: f32,
    /// Right edge in pixels
    pub xmax: f32,
    /// Bottom edge in pixels
    pub ymax: f32,
    /// Index into the detector's label table
    pub class_id: usize,
    /// Detection confidence [0, 1]
    pub confidence: f32,
}

impl Detection {
    /// Box width in pixels.
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    /// Box height in pixels.
    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    /// Box area in square pixels.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Intersection over union with another box.
    pub fn iou(&self, other: &Detection) -> f32 {
        let x1 = self.xmin.max(other.xmin);
        let y1 = self.ymin.max(other.ymin);
        let x2 = self.xmax.min(other.xmax);
        let y2 = self.ymax.min(other.ymax);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// COCO class names (80 classes), the default label table.
pub const COCO_CLASSES: &[&str] = &[
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck",
    "boat", "traffic light", "fire hydrant", "stop sign", "parking meter", "bench",
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra",
    "giraffe", "backpack", "umbrella", "handbag", "tie", "suitcase", "frisbee",
    "skis", "snowboard", "sports ball", "kite", "baseball bat", "baseball glove",
    "skateboard", "surfboard", "tennis racket", "bottle", "wine glass", "cup",
    "fork", "knife", "spoon", "bowl", "banana", "apple", "sandwich", "orange",
    "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair", "couch",
    "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];
