//! Gameplay analysis worker.
//!
//! This crate provides:
//! - Analysis and highlight reel jobs over a video plus its detection log
//! - Report assembly with benchmarks, verdicts and coaching tips
//! - Run-scoped structured logging and Prometheus metrics
//! - The `lagskill-worker` command-line interface

pub mod cli;
pub mod coaching;
pub mod config;
pub mod error;
pub mod jobs;
pub mod logging;
pub mod metrics;
pub mod report;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use jobs::{
    run_analysis, run_highlights, AnalyzeOutput, AnalyzeRequest, HighlightsOutput,
    HighlightsRequest,
};
pub use logging::RunLogger;
