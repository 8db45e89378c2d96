//! Tracking, event detection and highlight selection.
//!
//! Data flows forward only:
//!
//! ```text
//! detections ─┬─> PersonTracker ──> EventDetector ──┐
//! frames ─────┴─> FrameMotionEstimator ─────────────┴─> PerformanceAggregator
//!                                                      └─> highlights (score, merge, cap, plan)
//! ```
//!
//! `AnalysisContext` owns all per-run state.

pub mod aggregate;
pub mod config;
pub mod context;
pub mod events;
pub mod heatmap;
pub mod highlights;
pub mod motion;
pub mod tracker;

pub use aggregate::{mean_and_std, summarize_reactions, PassSummary, PerformanceAggregator};
pub use config::EngineConfig;
pub use context::{AnalysisContext, AnalysisResult, FrameOutcome};
pub use events::{EventDetector, FrameEvents};
pub use heatmap::HeatMap;
pub use highlights::{
    clip_frames, detect_candidates, merge_candidates, plan_clips, score_entry, select_moments,
    transition_frames,
};
pub use motion::{motion_intensity, FrameMotionEstimator};
pub use tracker::{PersonTracker, Track, TrackPoint, TrackedBox};
