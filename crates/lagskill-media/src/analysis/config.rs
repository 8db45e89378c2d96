//! Heuristic constants for the analysis engine.
//!
//! The defaults are the calibrated values; changing them changes every
//! downstream metric, so treat them as a versioned baseline.

use serde::{Deserialize, Serialize};

/// Configuration for tracking, event detection, scoring and clip composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Tracking ===
    /// Maximum center distance for any track match in pixels (default: 300)
    pub match_radius_px: f64,

    /// Player must have been seen within this many frames to match by distance (default: 10)
    pub player_recency_frames: u64,

    /// Non-player tracks older than this are inactive (default: 15)
    pub track_horizon_frames: u64,

    /// Weight of the distance score in the match score (default: 0.7)
    pub distance_weight: f64,

    /// Weight of the size-similarity score in the match score (default: 0.3)
    pub size_weight: f64,

    /// Pixels per distance-score point (default: 3.0)
    pub distance_score_divisor: f64,

    /// Size score used when a track has no prior area (default: 50)
    pub default_size_score: f64,

    /// Match score a candidate must exceed (default: 30)
    pub match_score_threshold: f64,

    // === Player lock ===
    /// Weight of screen-area percentage in the player score (default: 5)
    pub player_area_weight: f64,

    /// Weight of the lower-half position bonus (default: 2)
    pub player_lower_half_weight: f64,

    /// Maximum horizontal-centering bonus (default: 50)
    pub player_center_max: f64,

    /// Cap on the longevity bonus, earned at one point per two frames (default: 50)
    pub player_longevity_cap: f64,

    /// Lock is considered only after more than this many frames were seen (default: 5)
    pub lock_min_frame: u64,

    /// Candidates must have been seen within this many frames (default: 3)
    pub lock_recency_frames: u64,

    /// Player score a candidate must exceed to be locked (default: 50)
    pub lock_score_threshold: f64,

    // === Events ===
    /// Maximum encounter-to-elimination gap in seconds (default: 3.0)
    pub event_horizon_sec: f64,

    // === Aggregation ===
    /// Reaction placeholders used when no reaction was measured (default: 250/200/300 ms)
    pub reaction_placeholder_avg_ms: f64,
    pub reaction_placeholder_min_ms: f64,
    pub reaction_placeholder_max_ms: f64,

    /// Motion std points per stability point (default: 10)
    pub stability_divisor: f64,

    /// Fps that earns the full fps term of the performance score (default: 60)
    pub reference_fps: f64,

    /// Heat map cell size in pixels (default: 10)
    pub heat_cell_px: u32,

    // === Highlight scoring ===
    /// Persons for the multi-enemy bonus (default: 3) and its points per person (default: 30)
    pub multi_enemy_min_persons: u32,
    pub multi_enemy_points: f64,

    /// Persons for the combat bonus (default: 2) and its points per person (default: 20)
    pub combat_min_persons: u32,
    pub combat_points: f64,

    /// Motion above this scores `motion_weight * motion` (defaults: 15, 2)
    pub intense_motion_threshold: f64,
    pub motion_weight: f64,

    /// Encounter within this many seconds adds `encounter_bonus` (defaults: 2.0, 40)
    pub encounter_window_sec: f64,
    pub encounter_bonus: f64,

    /// Elimination within this many seconds adds a bonus (default: 1.0)
    pub elimination_window_sec: f64,

    /// Reactions faster than this are quick kills (default: 300 ms)
    pub quick_kill_ms: f64,
    pub quick_kill_bonus: f64,
    pub elimination_bonus: f64,

    /// Score a timeline entry must exceed to become a candidate (default: 50)
    pub candidate_threshold: f64,

    /// Moments closer than this are merged (default: 5.0 s)
    pub merge_window_sec: f64,

    /// Maximum moments kept after merging (default: 5)
    pub max_moments: usize,

    // === Composition ===
    /// Clip length per moment (default: 4.0 s)
    pub clip_duration_sec: f64,

    /// Black transition between clips (default: 0.5 s)
    pub transition_sec: f64,

    /// Fps used for sizing when the source has none (default: 30)
    pub fallback_fps: f64,

    /// Height of the overlay band at the top of each clip frame (default: 80 px)
    pub overlay_band_px: u32,

    /// Opacity of the overlay band (default: 0.6)
    pub overlay_opacity: f32,

    // === Annotation ===
    /// Velocity arrows are drawn above this speed in px/frame (default: 2)
    pub arrow_min_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Tracking
            match_radius_px: 300.0,
            player_recency_frames: 10,
            track_horizon_frames: 15,
            distance_weight: 0.7,
            size_weight: 0.3,
            distance_score_divisor: 3.0,
            default_size_score: 50.0,
            match_score_threshold: 30.0,

            // Player lock
            player_area_weight: 5.0,
            player_lower_half_weight: 2.0,
            player_center_max: 50.0,
            player_longevity_cap: 50.0,
            lock_min_frame: 5,
            lock_recency_frames: 3,
            lock_score_threshold: 50.0,

            // Events
            event_horizon_sec: 3.0,

            // Aggregation
            reaction_placeholder_avg_ms: 250.0,
            reaction_placeholder_min_ms: 200.0,
            reaction_placeholder_max_ms: 300.0,
            stability_divisor: 10.0,
            reference_fps: 60.0,
            heat_cell_px: 10,

            // Highlight scoring
            multi_enemy_min_persons: 3,
            multi_enemy_points: 30.0,
            combat_min_persons: 2,
            combat_points: 20.0,
            intense_motion_threshold: 15.0,
            motion_weight: 2.0,
            encounter_window_sec: 2.0,
            encounter_bonus: 40.0,
            elimination_window_sec: 1.0,
            quick_kill_ms: 300.0,
            quick_kill_bonus: 50.0,
            elimination_bonus: 30.0,
            candidate_threshold: 50.0,
            merge_window_sec: 5.0,
            max_moments: 5,

            // Composition
            clip_duration_sec: 4.0,
            transition_sec: 0.5,
            fallback_fps: 30.0,
            overlay_band_px: 80,
            overlay_opacity: 0.6,

            // Annotation
            arrow_min_speed: 2.0,
        }
    }
}

impl EngineConfig {
    /// Create a config with the calibrated defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorter clips and tighter merging for short-form reels.
    pub fn short_form() -> Self {
        Self {
            clip_duration_sec: 3.0,
            transition_sec: 0.25,
            merge_window_sec: 3.5,
            ..Self::default()
        }
    }

    /// Reject configurations that would make the engine misbehave.
    pub fn validate(&self) -> Result<(), String> {
        if self.match_radius_px <= 0.0 {
            return Err("match_radius_px must be positive".to_string());
        }
        if self.distance_score_divisor <= 0.0 {
            return Err("distance_score_divisor must be positive".to_string());
        }
        if self.stability_divisor <= 0.0 {
            return Err("stability_divisor must be positive".to_string());
        }
        if self.reference_fps <= 0.0 || self.fallback_fps <= 0.0 {
            return Err("reference_fps and fallback_fps must be positive".to_string());
        }
        if self.heat_cell_px == 0 {
            return Err("heat_cell_px must be at least 1".to_string());
        }
        if self.clip_duration_sec <= 0.0 || self.transition_sec < 0.0 {
            return Err("clip_duration_sec must be positive and transition_sec non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err("overlay_opacity must be within 0..1".to_string());
        }
        Ok(())
    }
}
