//! End-of-pass performance aggregation.

use lagskill_models::{PerformanceMetrics, ReactionEvent, ReactionSummary};

use super::config::EngineConfig;

/// Running counters accumulated frame by frame.
#[derive(Debug, Default, Clone)]
pub struct PerformanceAggregator {
    frame_count: u64,
    total_person_observations: u64,
    max_persons: u32,
    motion_samples: Vec<f64>,
    persons_per_frame: Vec<u32>,
}

/// Inputs available only once the pass is complete.
#[derive(Debug, Clone, Copy)]
pub struct PassSummary<'a> {
    pub fps: f64,
    pub reactions: &'a [ReactionEvent],
    pub encounter_count: usize,
    pub total_persons_tracked: u32,
    pub player_track_id: Option<u32>,
}

impl PerformanceAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame. `motion` is `None` for the first frame.
    pub fn record_frame(&mut self, person_count: u32, motion: Option<f64>) {
        self.frame_count += 1;
        self.total_person_observations += person_count as u64;
        self.max_persons = self.max_persons.max(person_count);
        self.persons_per_frame.push(person_count);
        if let Some(m) = motion {
            self.motion_samples.push(m);
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn persons_per_frame(&self) -> &[u32] {
        &self.persons_per_frame
    }

    pub fn finalize(&self, summary: PassSummary<'_>, config: &EngineConfig) -> PerformanceMetrics {
        let avg_characters = if self.frame_count > 0 {
            self.total_person_observations as f64 / self.frame_count as f64
        } else {
            0.0
        };

        let (avg_motion, motion_std) = mean_and_std(&self.motion_samples);
        let fps_stability = if self.motion_samples.is_empty() {
            100.0
        } else {
            100.0 - (motion_std / config.stability_divisor).min(100.0)
        };

        let video_fps = summary.fps.max(0.0);
        let fps_term = (video_fps / config.reference_fps * 100.0).min(100.0);
        let performance_score = (0.4 * fps_stability
            + 0.3 * (100.0 - avg_motion.min(100.0))
            + 0.3 * fps_term)
            .clamp(0.0, 100.0);

        let scene_complexity_score = avg_characters + 0.5 * self.max_persons as f64;
        let frame_time_ms = if video_fps > 0.0 { 1000.0 / video_fps } else { 0.0 };
        let stutter_score = avg_motion / (video_fps + 1e-6);

        PerformanceMetrics {
            total_frames: self.frame_count,
            video_fps,
            frame_time_ms,
            avg_characters,
            max_characters: self.max_persons,
            scene_complexity_score,
            avg_motion_intensity: avg_motion,
            motion_std,
            fps_stability,
            performance_score,
            stutter_score,
            reaction: summarize_reactions(summary.reactions, config),
            encounter_count: summary.encounter_count,
            elimination_count: summary.reactions.len(),
            total_persons_tracked: summary.total_persons_tracked,
            player_detected: summary.player_track_id.is_some(),
            player_track_id: summary.player_track_id,
        }
    }
}

/// Mean and population standard deviation; `(0, 0)` for no samples.
pub fn mean_and_std(samples: &[f64]) -> (f64, f64) {
    if samples.is_empty() {
        return (0.0, 0.0);
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let variance = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub fn summarize_reactions(reactions: &[ReactionEvent], config: &EngineConfig) -> ReactionSummary {
    if reactions.is_empty() {
        return ReactionSummary {
            avg_ms: config.reaction_placeholder_avg_ms,
            min_ms: config.reaction_placeholder_min_ms,
            max_ms: config.reaction_placeholder_max_ms,
            event_count: 0,
            measured: false,
        };
    }
    let times: Vec<f64> = reactions.iter().map(|r| r.reaction_time_ms).collect();
    ReactionSummary {
        avg_ms: times.iter().sum::<f64>() / times.len() as f64,
        min_ms: times.iter().copied().fold(f64::INFINITY, f64::min),
        max_ms: times.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        event_count: times.len(),
        measured: true,
    }
}
