//! Encounter and elimination detection from per-frame person counts.

use std::collections::HashSet;

use lagskill_models::{EncounterBox, EnemyEncounter, ReactionEvent};
use tracing::debug;

use super::tracker::TrackedBox;

/// Events raised by one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameEvents {
    pub encounter: Option<EnemyEncounter>,
    pub reaction: Option<ReactionEvent>,
}

/// Strictly sequential event state machine.
#[derive(Debug)]
pub struct EventDetector {
    fps: f64,
    horizon_sec: f64,
    prev_count: usize,
    prev_ids: HashSet<u32>,
    encounters: Vec<EnemyEncounter>,
    reactions: Vec<ReactionEvent>,
    /// Whether the most recent encounter has already produced a reaction
    latest_attributed: bool,
}

impl EventDetector {
    pub fn new(fps: f64, horizon_sec: f64) -> Self {
        Self {
            fps,
            horizon_sec,
            prev_count: 0,
            prev_ids: HashSet::new(),
            encounters: Vec::new(),
            reactions: Vec::new(),
            latest_attributed: false,
        }
    }

    /// Observe one frame's tracked boxes. Frames must arrive in index order.
    pub fn observe(&mut self, frame_index: u64, time_sec: f64, boxes: &[TrackedBox]) -> FrameEvents {
        let count = boxes.len();
        let mut events = FrameEvents::default();

        if count > self.prev_count {
            let new_boxes: Vec<EncounterBox> = boxes
                .iter()
                .filter(|b| !b.is_player && !self.prev_ids.contains(&b.track_id))
                .map(|b| EncounterBox {
                    track_id: b.track_id,
                    bbox: b.bbox,
                    confidence: b.confidence,
                })
                .collect();

            if !new_boxes.is_empty() {
                let encounter = EnemyEncounter {
                    frame_index,
                    time_sec,
                    new_person_count: new_boxes.len() as u32,
                    boxes: new_boxes,
                };
                debug!(frame_index, new = encounter.new_person_count, "Enemy encounter");
                self.encounters.push(encounter.clone());
                self.latest_attributed = false;
                events.encounter = Some(encounter);
            }
        } else if count < self.prev_count {
            events.reaction = self.try_attribute(frame_index);
        }

        self.prev_count = count;
        self.prev_ids = boxes.iter().map(|b| b.track_id).collect();
        events
    }

    fn try_attribute(&mut self, frame_index: u64) -> Option<ReactionEvent> {
        if self.fps <= 0.0 || self.latest_attributed {
            return None;
        }
        let last = self.encounters.last()?;
        let elapsed = frame_index.checked_sub(last.frame_index)?;
        if elapsed == 0 || elapsed as f64 >= self.fps * self.horizon_sec {
            return None;
        }

        let event = ReactionEvent::new(last.frame_index, frame_index, self.fps);
        debug!(
            encounter_frame = event.encounter_frame,
            elimination_frame = frame_index,
            reaction_ms = event.reaction_time_ms,
            "Elimination attributed"
        );
        self.latest_attributed = true;
        self.reactions.push(event.clone());
        Some(event)
    }

    pub fn encounters(&self) -> &[EnemyEncounter] {
        &self.encounters
    }

    pub fn reactions(&self) -> &[ReactionEvent] {
        &self.reactions
    }

    pub fn into_parts(self) -> (Vec<EnemyEncounter>, Vec<ReactionEvent>) {
        (self.encounters, self.reactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagskill_models::BoundingBox;

    fn tracked(track_id: u32, is_player: bool) -> TrackedBox {
        TrackedBox {
            track_id,
            bbox: BoundingBox::new(0.0, 0.0, 10.0, 20.0),
            confidence: 0.9,
            is_player,
            estimated_distance: 47.6,
            velocity: (0.0, 0.0),
        }
    }

    #[test]
    fn test_encounter_then_reaction() {
        let mut d = EventDetector::new(30.0, 3.0);
        d.observe(9, 0.3, &[tracked(1, true)]);
        let ev = d.observe(10, 0.33, &[tracked(1, true), tracked(2, false)]);
        let enc = ev.encounter.unwrap();
        assert_eq!(enc.frame_index, 10);
        assert_eq!(enc.new_person_count, 1);
        assert_eq!(enc.boxes[0].track_id, 2);

        let ev = d.observe(40, 1.33, &[tracked(1, true)]);
        let reaction = ev.reaction.unwrap();
        assert_eq!(reaction.frames_elapsed, 30);
        assert!((reaction.reaction_time_ms - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_player_appearance_is_not_an_encounter() {
        let mut d = EventDetector::new(30.0, 3.0);
        let ev = d.observe(0, 0.0, &[tracked(1, true)]);
        assert!(ev.encounter.is_none());
    }

    #[test]
    fn test_single_attribution() {
        let mut d = EventDetector::new(30.0, 3.0);
        d.observe(0, 0.0, &[tracked(1, false), tracked(2, false), tracked(3, false)]);
        let first = d.observe(5, 0.1, &[tracked(1, false), tracked(2, false)]);
        let second = d.observe(6, 0.2, &[tracked(1, false)]);
        assert!(first.reaction.is_some());
        assert!(second.reaction.is_none());
        assert_eq!(d.reactions().len(), 1);
    }

    #[test]
    fn test_reaction_outside_horizon_is_ignored() {
        let mut d = EventDetector::new(30.0, 3.0);
        d.observe(0, 0.0, &[tracked(1, false)]);
        // Exactly 3 seconds later does not count
        let ev = d.observe(90, 3.0, &[]);
        assert!(ev.reaction.is_none());
    }

    #[test]
    fn test_unknown_fps_skips_reactions() {
        let mut d = EventDetector::new(0.0, 3.0);
        let ev = d.observe(0, 0.0, &[tracked(1, false)]);
        assert!(ev.encounter.is_some());
        let ev = d.observe(3, 0.0, &[]);
        assert!(ev.reaction.is_none());
        let (encounters, reactions) = d.into_parts();
        assert_eq!(encounters.len(), 1);
        assert!(reactions.is_empty());
    }

    #[test]
    fn test_returning_track_counts_as_new() {
        let mut d = EventDetector::new(30.0, 3.0);
        d.observe(0, 0.0, &[tracked(1, false)]);
        d.observe(1, 0.0, &[]);
        // Track 1 was absent in frame 1, so it counts as new again
        let ev = d.observe(2, 0.0, &[tracked(1, false)]);
        assert!(ev.encounter.is_some());
    }
}
