//! Per-frame timeline records produced by the analysis pass.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A person detection after identity assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrackedDetection {
    /// Track identity assigned by the tracker
    pub track_id: u32,
    /// Box center x
    pub x: f64,
    /// Box center y
    pub y: f64,
    /// Detector confidence
    pub confidence: f64,
    /// True only for the locked player track
    pub is_player: bool,
    /// Display heuristic: `1000 / (box_height + 1)`
    pub estimated_distance: f64,
    /// Center displacement since the track's previous position (pixels/frame)
    pub velocity: (f64, f64),
}

/// One processed frame. Entries are appended in frame order and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEntry {
    /// 0-based frame index
    pub frame_index: u64,
    /// `frame_index / fps`, or 0 when fps is unknown
    pub time_sec: f64,
    /// Number of person boxes in the frame (player included)
    pub person_count: u32,
    /// Mean absolute grayscale difference to the previous frame (0 for frame 0)
    pub motion_intensity: f64,
    pub detections: Vec<TrackedDetection>,
}

impl TimelineEntry {
    /// Number of non-player persons in the frame.
    pub fn enemy_count(&self) -> usize {
        self.detections.iter().filter(|d| !d.is_player).count()
    }

    pub fn has_player(&self) -> bool {
        self.detections.iter().any(|d| d.is_player)
    }
}

/// Convert a frame index to seconds, returning 0 when fps is unusable.
pub fn frame_time(frame_index: u64, fps: f64) -> f64 {
    if fps > 0.0 {
        frame_index as f64 / fps
    } else {
        0.0
    }
}
