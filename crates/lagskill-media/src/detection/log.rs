//! Replay of detector output recorded as JSON.
//!
//! ```json
//! {"frames": [{"frame_index": 0, "detections": [
//!     {"class_id": 0, "confidence": 0.87, "bbox": [100, 80, 160, 240]}
//! ]}]}
//! ```
//!
//! Frames absent from the log have no detections.

use std::path::Path;

use image::RgbImage;
use lagskill_models::{Detection, FrameDetections};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::PersonDetector;
use crate::error::{MediaError, MediaResult};

/// Detections recorded for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedFrame {
    pub frame_index: u64,
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// A recorded detection stream, sorted by strictly increasing frame index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionLog {
    frames: Vec<LoggedFrame>,
    #[serde(skip)]
    cursor: usize,
    #[serde(skip)]
    warned_past_end: bool,
}

impl DetectionLog {
    /// Build a log from frames; fails unless indices strictly increase.
    pub fn from_frames(frames: Vec<LoggedFrame>) -> MediaResult<Self> {
        let log = Self {
            frames,
            cursor: 0,
            warned_past_end: false,
        };
        log.validate()?;
        Ok(log)
    }

    pub fn from_json(json: &str) -> MediaResult<Self> {
        let log: Self = serde_json::from_str(json)?;
        log.validate()?;
        Ok(log)
    }

    /// Load a log from disk.
    pub async fn load(path: impl AsRef<Path>) -> MediaResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        let json = tokio::fs::read_to_string(path).await?;
        let log = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            frames = log.frames.len(),
            detections = log.total_detections(),
            "Loaded detection log"
        );
        Ok(log)
    }

    fn validate(&self) -> MediaResult<()> {
        for pair in self.frames.windows(2) {
            if pair[1].frame_index <= pair[0].frame_index {
                return Err(MediaError::invalid_detection_log(format!(
                    "frame {} follows frame {}; indices must strictly increase",
                    pair[1].frame_index, pair[0].frame_index
                )));
            }
        }
        for frame in &self.frames {
            for det in &frame.detections {
                if !(0.0..=1.0).contains(&det.confidence) {
                    return Err(MediaError::invalid_detection_log(format!(
                        "confidence {} out of range at frame {}",
                        det.confidence, frame.frame_index
                    )));
                }
                if !det.bbox.is_well_formed() {
                    return Err(MediaError::invalid_detection_log(format!(
                        "malformed bbox {:?} at frame {}",
                        <[f64; 4]>::from(det.bbox),
                        frame.frame_index
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn frames(&self) -> &[LoggedFrame] {
        &self.frames
    }

    pub fn last_frame_index(&self) -> Option<u64> {
        self.frames.last().map(|f| f.frame_index)
    }

    pub fn total_detections(&self) -> usize {
        self.frames.iter().map(|f| f.detections.len()).sum()
    }

    /// Detections for `frame_index`, or empty when the log has none.
    ///
    /// Lookups are amortized O(1) when frames are requested in increasing order.
    pub fn detections_at(&mut self, frame_index: u64) -> FrameDetections {
        if self.cursor > 0 && self.frames[self.cursor - 1].frame_index >= frame_index {
            // Rewound (e.g. a second pass); restart the scan
            self.cursor = 0;
        }
        while let Some(frame) = self.frames.get(self.cursor) {
            if frame.frame_index >= frame_index {
                break;
            }
            self.cursor += 1;
        }
        match self.frames.get(self.cursor) {
            Some(frame) if frame.frame_index == frame_index => frame.detections.clone(),
            _ => Vec::new(),
        }
    }
}

impl PersonDetector for DetectionLog {
    fn name(&self) -> &'static str {
        "detection_log"
    }

    fn detect(&mut self, frame_index: u64, _frame: &RgbImage) -> MediaResult<FrameDetections> {
        if !self.warned_past_end {
            if let Some(last) = self.last_frame_index() {
                if frame_index > last {
                    warn!(
                        frame_index,
                        last_logged_frame = last,
                        "Detection log is shorter than the video; remaining frames have no detections"
                    );
                    self.warned_past_end = true;
                }
            }
        }
        Ok(self.detections_at(frame_index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagskill_models::BoundingBox;

    fn frame(index: u64, n: usize) -> LoggedFrame {
        LoggedFrame {
            frame_index: index,
            detections: (0..n)
                .map(|i| Detection::person(0.9, BoundingBox::from_xywh(i as f64 * 50.0, 0.0, 40.0, 80.0)))
                .collect(),
        }
    }

    #[test]
    fn test_parse_json_log() {
        let log = DetectionLog::from_json(
            r#"{"frames":[{"frame_index":0,"detections":[{"class_id":0,"confidence":0.87,"bbox":[1,2,3,4]}]},
                          {"frame_index":3}]}"#,
        )
        .unwrap();
        assert_eq!(log.frames().len(), 2);
        assert_eq!(log.total_detections(), 1);
        assert_eq!(log.last_frame_index(), Some(3));
    }

    #[test]
    fn test_rejects_unsorted_frames() {
        let err = DetectionLog::from_frames(vec![frame(5, 1), frame(5, 1)]).unwrap_err();
        assert!(matches!(err, MediaError::InvalidDetectionLog(_)));
    }

    #[test]
    fn test_rejects_bad_confidence() {
        let json = r#"{"frames":[{"frame_index":0,"detections":[{"confidence":1.5,"bbox":[0,0,1,1]}]}]}"#;
        assert!(DetectionLog::from_json(json).is_err());
    }

    #[test]
    fn test_rejects_malformed_bbox() {
        let inverted = r#"{"frames":[{"frame_index":0,"detections":[{"confidence":0.9,"bbox":[10,0,5,8]}]}]}"#;
        assert!(matches!(
            DetectionLog::from_json(inverted),
            Err(MediaError::InvalidDetectionLog(_))
        ));

        let nan = LoggedFrame {
            frame_index: 0,
            detections: vec![Detection::person(0.9, BoundingBox::new(f64::NAN, 0.0, 4.0, 4.0))],
        };
        assert!(matches!(
            DetectionLog::from_frames(vec![nan]),
            Err(MediaError::InvalidDetectionLog(_))
        ));

        let infinite = LoggedFrame {
            frame_index: 0,
            detections: vec![Detection::person(0.9, BoundingBox::new(0.0, 0.0, f64::INFINITY, 4.0))],
        };
        assert!(DetectionLog::from_frames(vec![infinite]).is_err());
    }

    #[test]
    fn test_missing_frames_have_no_detections() {
        let mut log = DetectionLog::from_frames(vec![frame(0, 1), frame(2, 3)]).unwrap();
        assert_eq!(log.detections_at(0).len(), 1);
        assert_eq!(log.detections_at(1).len(), 0);
        assert_eq!(log.detections_at(2).len(), 3);
        assert_eq!(log.detections_at(9).len(), 0);

        // Rewind works
        assert_eq!(log.detections_at(0).len(), 1);
    }

    #[test]
    fn test_detector_replays_log() {
        let mut log = DetectionLog::from_frames(vec![frame(1, 2)]).unwrap();
        let img = RgbImage::new(1, 1);
        assert!(log.detect(0, &img).unwrap().is_empty());
        assert_eq!(log.detect(1, &img).unwrap().len(), 2);
        assert!(log.detect(2, &img).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.json");
        std::fs::write(&path, r#"{"frames":[{"frame_index":4,"detections":[]}]}"#).unwrap();

        let log = DetectionLog::load(&path).await.unwrap();
        assert_eq!(log.last_frame_index(), Some(4));

        assert!(DetectionLog::load(dir.path().join("missing.json")).await.is_err());
    }
}
