#![deny(unreachable_patterns)]
//! Gameplay analysis engine and FFmpeg frame I/O.
//!
//! This crate provides:
//! - Person tracking with a persistent player lock
//! - Enemy encounter and reaction detection
//! - Performance aggregation and highlight selection
//! - Raw RGB frame decoding/encoding through FFmpeg pipes
//! - Frame annotation and highlight reel composition

pub mod analysis;
pub mod command;
pub mod detection;
pub mod error;
pub mod frames;
pub mod pipeline;
pub mod probe;
pub mod render;

pub use analysis::{AnalysisContext, AnalysisResult, EngineConfig, FrameOutcome};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand};
pub use detection::{DetectionLog, LoggedFrame, PersonDetector};
pub use error::{MediaError, MediaResult};
pub use frames::{
    FfmpegFrameReader, FfmpegFrameWriter, FrameSink, FrameSource, MemoryFrameSink,
    MemoryFrameSource, SourceInfo,
};
pub use pipeline::{AnalysisPipeline, HighlightOutcome};
pub use probe::{probe_video, VideoInfo};
pub use render::{ClipComposer, CompositionSummary};
