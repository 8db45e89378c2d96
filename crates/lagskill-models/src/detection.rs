//! Raw detector output consumed by the tracking engine.

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// COCO class id for "person". Every other class is ignored by the engine.
pub const PERSON_CLASS_ID: u32 = 0;

/// Axis-aligned box in pixel coordinates, stored as corners.
///
/// Serialized as a compact `[x1, y1, x2, y2]` array to match detector output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a box from its corners.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Finite corners with `x1 <= x2` and `y1 <= y2`.
    pub fn is_well_formed(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 <= self.x2
            && self.y1 <= self.y2
    }

    /// Create a box from its top-left corner and size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Create a box of the given size centered on a point.
    pub fn centered(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self::from_xywh(cx - width / 2.0, cy - height / 2.0, width, height)
    }

    /// Center x-coordinate.
    #[inline]
    pub fn cx(&self) -> f64 {
        (self.x1 + self.x2) / 2.0
    }

    /// Center y-coordinate.
    #[inline]
    pub fn cy(&self) -> f64 {
        (self.y1 + self.y2) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Euclidean distance between this box's center and a point.
    pub fn center_distance_to(&self, x: f64, y: f64) -> f64 {
        ((self.cx() - x).powi(2) + (self.cy() - y).powi(2)).sqrt()
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

impl JsonSchema for BoundingBox {
    fn schema_name() -> String {
        "BoundingBox".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        <[f64; 4]>::json_schema(gen)
    }
}

/// One detector result for a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Detector class id (COCO numbering)
    #[serde(default)]
    pub class_id: u32,
    /// Detection confidence (0.0-1.0)
    pub confidence: f64,
    /// Box corners in source pixels
    pub bbox: BoundingBox,
}

impl Detection {
    /// Create a new detection.
    pub fn new(class_id: u32, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_id,
            confidence,
            bbox,
        }
    }

    /// Shorthand for a person detection.
    pub fn person(confidence: f64, bbox: BoundingBox) -> Self {
        Self::new(PERSON_CLASS_ID, confidence, bbox)
    }

    pub fn is_person(&self) -> bool {
        self.class_id == PERSON_CLASS_ID
    }
}

/// All detections for one frame, in detector order.
pub type FrameDetections = Vec<Detection>;
