//! Distance/size-based person tracker with a one-time player lock.
//!
//! Detections are matched greedily in detector order. The player track gets
//! first claim on each box; remaining boxes go to the best-scoring recent
//! track or open a new one. Track ids start at 1 and are never reused.

use std::collections::BTreeMap;

use lagskill_models::{BoundingBox, Detection, TrackedDetection};
use tracing::{debug, info};

use super::config::EngineConfig;

/// One recorded track position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    pub frame_index: u64,
}

/// Persistent identity for a detected person.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: u32,
    /// Append-only position history
    pub positions: Vec<TrackPoint>,
    pub first_seen_frame: u64,
    pub last_seen_frame: u64,
    pub last_area: Option<f64>,
    pub player_score: f64,
}

impl Track {
    fn new(id: u32, frame_index: u64) -> Self {
        Self {
            id,
            positions: Vec::new(),
            first_seen_frame: frame_index,
            last_seen_frame: frame_index,
            last_area: None,
            player_score: 0.0,
        }
    }

    /// True when the track was seen at most `frames` frames ago.
    pub fn seen_within(&self, frame_index: u64, frames: u64) -> bool {
        frame_index.saturating_sub(self.last_seen_frame) <= frames
    }

    fn distance_to(&self, x: f64, y: f64) -> Option<f64> {
        self.positions
            .last()
            .map(|p| ((p.x - x).powi(2) + (p.y - y).powi(2)).sqrt())
    }
}

/// A detection with its assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedBox {
    pub track_id: u32,
    pub bbox: BoundingBox,
    pub confidence: f64,
    pub is_player: bool,
    /// `1000 / (box_height + 1)`, display only
    pub estimated_distance: f64,
    pub velocity: (f64, f64),
}

impl TrackedBox {
    pub fn to_timeline(&self) -> TrackedDetection {
        TrackedDetection {
            track_id: self.track_id,
            x: self.bbox.cx(),
            y: self.bbox.cy(),
            confidence: self.confidence,
            is_player: self.is_player,
            estimated_distance: self.estimated_distance,
            velocity: self.velocity,
        }
    }
}

pub struct PersonTracker {
    config: EngineConfig,
    frame_width: f64,
    frame_height: f64,
    tracks: BTreeMap<u32, Track>,
    next_track_id: u32,
    player_id: Option<u32>,
}

impl PersonTracker {
    pub fn new(config: EngineConfig, frame_width: u32, frame_height: u32) -> Self {
        Self {
            config,
            frame_width: frame_width.max(1) as f64,
            frame_height: frame_height.max(1) as f64,
            tracks: BTreeMap::new(),
            next_track_id: 1,
            player_id: None,
        }
    }

    /// Assign identities to one frame's detections.
    ///
    /// Non-person classes are dropped. `is_player` reflects the lock state
    /// before this frame's lock decision.
    pub fn update(&mut self, frame_index: u64, detections: &[Detection]) -> Vec<TrackedBox> {
        let persons: Vec<&Detection> = detections.iter().filter(|d| d.is_person()).collect();
        let largest = largest_box(&persons);

        let mut player_matched = false;
        let mut out = Vec::with_capacity(persons.len());

        for (idx, det) in persons.iter().enumerate() {
            let (cx, cy) = (det.bbox.cx(), det.bbox.cy());
            let area = det.bbox.area();

            let mut track_id = None;
            if !player_matched {
                track_id = self.match_player(frame_index, cx, cy, largest == Some(idx));
                player_matched = track_id.is_some();
            }
            let track_id = match track_id.or_else(|| self.best_match(frame_index, cx, cy, area)) {
                Some(id) => id,
                None => self.allocate(frame_index),
            };

            let velocity = self.record(track_id, frame_index, &det.bbox);

            out.push(TrackedBox {
                track_id,
                bbox: det.bbox,
                confidence: det.confidence,
                is_player: self.player_id == Some(track_id),
                estimated_distance: 1000.0 / (det.bbox.height() + 1.0),
                velocity,
            });
        }

        self.try_lock(frame_index);
        out
    }

    /// Player claim: by distance if recently seen, else as the frame's largest box.
    fn match_player(&self, frame_index: u64, cx: f64, cy: f64, is_largest: bool) -> Option<u32> {
        let pid = self.player_id?;
        let track = self.tracks.get(&pid)?;

        if track.seen_within(frame_index, self.config.player_recency_frames) {
            if let Some(dist) = track.distance_to(cx, cy) {
                if dist < self.config.match_radius_px {
                    return Some(pid);
                }
            }
        }
        is_largest.then_some(pid)
    }

    /// Best-scoring active non-player track.
    ///
    /// Several boxes of one frame may resolve to the same track.
    fn best_match(&self, frame_index: u64, cx: f64, cy: f64, area: f64) -> Option<u32> {
        let cfg = &self.config;
        let mut best_score = 0.0;
        let mut best_id = None;

        for (id, track) in &self.tracks {
            if Some(*id) == self.player_id {
                continue;
            }
            if !track.seen_within(frame_index, cfg.track_horizon_frames) {
                continue;
            }
            let Some(dist) = track.distance_to(cx, cy) else {
                continue;
            };
            if dist >= cfg.match_radius_px {
                continue;
            }

            let distance_score = (100.0 - dist / cfg.distance_score_divisor).max(0.0);
            let size_score = match track.last_area {
                Some(last) if last > 0.0 => (100.0 - (area - last).abs() / last * 100.0).max(0.0),
                _ => cfg.default_size_score,
            };
            let score = cfg.distance_weight * distance_score + cfg.size_weight * size_score;

            if score > best_score {
                best_score = score;
                best_id = Some(*id);
            }
        }

        best_id.filter(|_| best_score > cfg.match_score_threshold)
    }

    fn allocate(&mut self, frame_index: u64) -> u32 {
        let id = self.next_track_id;
        self.next_track_id += 1;
        self.tracks.insert(id, Track::new(id, frame_index));
        debug!(track_id = id, frame_index, "New person track");
        id
    }

    /// Append the position and refresh the track's score; returns its velocity.
    fn record(&mut self, track_id: u32, frame_index: u64, bbox: &BoundingBox) -> (f64, f64) {
        let (cx, cy) = (bbox.cx(), bbox.cy());
        let area = bbox.area();
        let score = {
            let first_seen = self
                .tracks
                .get(&track_id)
                .map_or(frame_index, |t| t.first_seen_frame);
            self.player_score(cx, cy, area, frame_index.saturating_sub(first_seen))
        };

        let Some(track) = self.tracks.get_mut(&track_id) else {
            return (0.0, 0.0);
        };
        let velocity = track
            .positions
            .last()
            .map_or((0.0, 0.0), |p| (cx - p.x, cy - p.y));

        track.positions.push(TrackPoint {
            x: cx,
            y: cy,
            frame_index,
        });
        track.last_seen_frame = frame_index;
        track.last_area = Some(area);
        track.player_score = score;
        velocity
    }

    /// Likelihood that a box is the player's own character.
    fn player_score(&self, cx: f64, cy: f64, area: f64, frames_tracked: u64) -> f64 {
        let cfg = &self.config;
        let (w, h) = (self.frame_width, self.frame_height);

        let size = area / (w * h) * 100.0 * cfg.player_area_weight;
        let lower_half = if cy > h / 2.0 {
            cfg.player_lower_half_weight * (cy / h * 50.0)
        } else {
            0.0
        };
        let centered = (cfg.player_center_max - (cx - w / 2.0).abs() / w * 100.0).max(0.0);
        let longevity = (frames_tracked as f64 / 2.0).min(cfg.player_longevity_cap);

        size + lower_half + centered + longevity
    }

    fn try_lock(&mut self, frame_index: u64) {
        // 0-based index: frame N is the (N + 1)th frame seen
        if self.player_id.is_some() || frame_index < self.config.lock_min_frame {
            return;
        }

        let mut best_score = 0.0;
        let mut best_id = None;
        for (id, track) in &self.tracks {
            if !track.seen_within(frame_index, self.config.lock_recency_frames) {
                continue;
            }
            if track.player_score > best_score {
                best_score = track.player_score;
                best_id = Some(*id);
            }
        }

        if let Some(id) = best_id.filter(|_| best_score > self.config.lock_score_threshold) {
            self.player_id = Some(id);
            info!(
                track_id = id,
                frame_index,
                player_score = best_score,
                "Player locked"
            );
        }
    }

    pub fn player_id(&self) -> Option<u32> {
        self.player_id
    }

    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Number of distinct track ids allocated so far.
    pub fn total_tracks(&self) -> u32 {
        self.next_track_id - 1
    }

    /// Tracks seen within the matching horizon.
    pub fn active_track_count(&self, frame_index: u64) -> usize {
        self.tracks
            .values()
            .filter(|t| t.seen_within(frame_index, self.config.track_horizon_frames))
            .count()
    }
}

/// Index of the strictly largest positive-area box; first wins on ties.
fn largest_box(persons: &[&Detection]) -> Option<usize> {
    let mut best_area = 0.0;
    let mut best = None;
    for (idx, det) in persons.iter().enumerate() {
        let area = det.bbox.area();
        if area > best_area {
            best_area = area;
            best = Some(idx);
        }
    }
    best
}
