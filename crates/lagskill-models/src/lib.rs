//! Shared data models for the LagSkill gameplay analysis engine.
//!
//! This crate provides Serde-serializable types for:
//! - Detector input (boxes, per-frame detections)
//! - The per-frame timeline and combat events
//! - Highlight candidates and selected moments
//! - Performance metrics, coaching data, and run reports
//! - Game presets with benchmark tables

pub mod detection;
pub mod events;
pub mod game_preset;
pub mod highlight;
pub mod ids;
pub mod report;
pub mod timeline;

// Re-export common types
pub use detection::{BoundingBox, Detection, FrameDetections, PERSON_CLASS_ID};
pub use events::{EncounterBox, EnemyEncounter, ReactionEvent};
pub use game_preset::{BenchmarkTable, GamePreset, GamePresetParseError};
pub use highlight::{HighlightCandidate, HighlightMoment, MomentTag};
pub use ids::{ReelId, RunId};
pub use report::{
    AnalysisReport, Benchmark, Benchmarks, EncounterDetail, HighlightReelReport, MomentSummary,
    PerformanceMetrics, ReactionDetail, ReactionSummary, Verdict, VerdictKind,
};
pub use timeline::{frame_time, TimelineEntry, TrackedDetection};
