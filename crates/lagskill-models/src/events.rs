//! Combat events derived from the track stream.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::BoundingBox;

/// A non-player box that was not present in the previous frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncounterBox {
    pub track_id: u32,
    pub bbox: BoundingBox,
    pub confidence: f64,
}

/// New enemies appearing on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnemyEncounter {
    pub frame_index: u64,
    pub time_sec: f64,
    /// Number of previously unseen non-player boxes
    pub new_person_count: u32,
    pub boxes: Vec<EncounterBox>,
}

/// A drop in visible persons attributed to the most recent encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReactionEvent {
    pub encounter_frame: u64,
    pub elimination_frame: u64,
    pub frames_elapsed: u64,
    pub reaction_time_ms: f64,
}

impl ReactionEvent {
    /// Build an event from the two frame indices.
    ///
    /// Callers guarantee `encounter_frame < elimination_frame` and `fps > 0`.
    pub fn new(encounter_frame: u64, elimination_frame: u64, fps: f64) -> Self {
        let frames_elapsed = elimination_frame - encounter_frame;
        Self {
            encounter_frame,
            elimination_frame,
            frames_elapsed,
            reaction_time_ms: frames_elapsed as f64 / fps * 1000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaction_time_from_frames() {
        let event = ReactionEvent::new(10, 40, 30.0);
        assert_eq!(event.frames_elapsed, 30);
        assert!((event.reaction_time_ms - 1000.0).abs() < 1e-9);

        let fast = ReactionEvent::new(100, 106, 60.0);
        assert!((fast.reaction_time_ms - 100.0).abs() < 1e-9);
    }
}
