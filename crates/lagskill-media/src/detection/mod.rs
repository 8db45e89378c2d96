//! Detector seam.
//!
//! The engine does not run a neural network itself. Anything that can produce
//! per-frame `{class_id, confidence, bbox}` results implements `PersonDetector`;
//! `DetectionLog` replays results recorded by an external detector.

pub mod log;

use image::RgbImage;
use lagskill_models::FrameDetections;

use crate::error::MediaResult;

pub use log::{DetectionLog, LoggedFrame};

/// Per-frame object detector.
///
/// Must be deterministic for a given frame. Non-person classes may be returned;
/// the tracker ignores them.
pub trait PersonDetector: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn detect(&mut self, frame_index: u64, frame: &RgbImage) -> MediaResult<FrameDetections>;
}
