//! Run results: engine metrics and the reports written by the worker.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::game_preset::GamePreset;
use crate::highlight::{HighlightMoment, MomentTag};
use crate::ids::{ReelId, RunId};
use crate::timeline::TimelineEntry;

/// Reaction-time statistics over all recorded reaction events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReactionSummary {
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Number of reaction events the statistics are drawn from
    pub event_count: usize,
    /// False when the values are placeholders because no event was recorded
    pub measured: bool,
}

/// Aggregate metrics computed once at the end of an analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceMetrics {
    pub total_frames: u64,
    /// Nominal source fps (0 when unknown)
    pub video_fps: f64,
    pub frame_time_ms: f64,
    pub avg_characters: f64,
    pub max_characters: u32,
    pub scene_complexity_score: f64,
    pub avg_motion_intensity: f64,
    /// Population standard deviation of motion samples
    pub motion_std: f64,
    /// `100 - min(motion_std / 10, 100)`, reported as motion stability
    pub fps_stability: f64,
    pub performance_score: f64,
    pub stutter_score: f64,
    pub reaction: ReactionSummary,
    pub encounter_count: usize,
    pub elimination_count: usize,
    /// Number of distinct track ids allocated
    pub total_persons_tracked: u32,
    pub player_detected: bool,
    pub player_track_id: Option<u32>,
}

/// Percentile ranking of one metric against a game's community benchmarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Benchmark {
    /// Label such as "Top 10%" or "Below Average"
    pub percentile: String,
    pub rank: u8,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Benchmarks {
    pub reaction_time: Benchmark,
    pub fps: Benchmark,
    pub performance: Benchmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    Excellent,
    NeedsWork,
    Upgrade,
    Good,
    Average,
}

/// Overall assessment of system and player performance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    #[serde(rename = "type")]
    pub kind: VerdictKind,
    pub title: String,
    pub description: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncounterDetail {
    pub encounter_num: u32,
    pub time_sec: f64,
    pub new_enemies: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReactionDetail {
    pub encounter_num: u32,
    pub reaction_time_ms: i64,
    /// Time of the encounter the reaction is attributed to
    pub time_sec: f64,
}

/// Structured result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    pub run_id: RunId,
    pub status: String,
    pub filename: String,
    pub game_preset: GamePreset,
    pub created_at: DateTime<Utc>,

    pub player_detected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_track_id: Option<u32>,

    pub avg_characters: f64,
    pub max_characters: u32,
    pub total_frames: u64,
    pub total_persons_tracked: u32,
    pub scene_complexity_score: f64,
    pub video_fps: f64,
    pub frame_time_ms: f64,
    pub avg_motion_intensity: f64,
    pub motion_stability: f64,
    pub stutter_score: f64,
    pub performance_score: f64,

    pub estimated_reaction_time_ms: i64,
    pub min_reaction_time_ms: i64,
    pub max_reaction_time_ms: i64,
    /// False when the reaction values are placeholders
    pub reaction_time_measured: bool,
    pub sudden_enemy_encounters: usize,
    pub successful_eliminations: usize,

    pub persons_per_frame: Vec<u32>,
    pub encounter_details: Vec<EncounterDetail>,
    pub reaction_time_details: Vec<ReactionDetail>,
    /// Enemy density grid normalized to 0..100; empty when no enemy was seen
    pub heat_map: Vec<Vec<f64>>,
    pub timeline: Vec<TimelineEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_video: Option<String>,

    pub verdict: Verdict,
    pub benchmarks: Benchmarks,
    pub tips: Vec<String>,
}

/// Compact moment entry in a reel report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MomentSummary {
    pub number: u32,
    /// Rounded to 0.1 s
    pub time_sec: f64,
    pub score: i64,
    pub types: Vec<MomentTag>,
    pub description: String,
    pub start_frame: u64,
    pub end_frame: u64,
}

impl From<&HighlightMoment> for MomentSummary {
    fn from(m: &HighlightMoment) -> Self {
        Self {
            number: m.number,
            time_sec: (m.time_sec * 10.0).round() / 10.0,
            score: m.score as i64,
            types: m.tags.clone(),
            description: m.description.clone(),
            start_frame: m.start_frame,
            end_frame: m.end_frame,
        }
    }
}

/// Outcome of the highlight path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HighlightReelReport {
    Success {
        run_id: RunId,
        reel_id: ReelId,
        filename: String,
        highlight_video: String,
        num_highlights: usize,
        /// Seconds of clip footage in the reel, transitions excluded
        total_duration_sec: f64,
        moments: Vec<MomentSummary>,
        created_at: DateTime<Utc>,
    },
    NoHighlights {
        run_id: RunId,
        filename: String,
        message: String,
        suggestions: Vec<String>,
    },
}

impl HighlightReelReport {
    /// Report for a run that produced no moments.
    pub fn no_highlights(run_id: RunId, filename: impl Into<String>) -> Self {
        HighlightReelReport::NoHighlights {
            run_id,
            filename: filename.into(),
            message: "No exciting moments detected in this video. Try uploading gameplay with more action!"
                .to_string(),
            suggestions: vec![
                "Include combat sequences".to_string(),
                "Upload longer gameplay (2-5 minutes)".to_string(),
                "Ensure video has clear enemy encounters".to_string(),
            ],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, HighlightReelReport::Success { .. })
    }
}
