//! Frame sources and sinks.
//!
//! The engine consumes decoded RGB frames in index order and writes rendered
//! frames to a sink. Two implementations are provided:
//!
//! - `FfmpegFrameReader` / `FfmpegFrameWriter`: raw RGB24 piped through FFmpeg
//! - `MemoryFrameSource` / `MemoryFrameSink`: in-memory buffers

pub mod ffmpeg;
pub mod memory;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

pub use ffmpeg::{FfmpegFrameReader, FfmpegFrameWriter};
pub use memory::{MemoryFrameSink, MemoryFrameSource};

/// Static properties of a frame source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Nominal frame rate; may be 0 when unknown
    pub fps: f64,
    /// Frame count reported by the container, if any
    pub frame_count: Option<u64>,
}

impl SourceInfo {
    pub fn new(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            frame_count: None,
        }
    }

    pub fn with_frame_count(mut self, frame_count: u64) -> Self {
        self.frame_count = Some(frame_count);
        self
    }

    /// Fps to use for time-based sizing, substituting `fallback` when unknown.
    pub fn effective_fps(&self, fallback: f64) -> f64 {
        if self.fps > 0.0 {
            self.fps
        } else {
            fallback
        }
    }
}

/// Sequential reader of decoded frames.
pub trait FrameSource: Send {
    fn info(&self) -> SourceInfo;

    /// Read the next frame, or `None` at end of stream.
    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>>;

    /// Position the source so the next read returns frame `frame_index`.
    fn seek(&mut self, frame_index: u64) -> MediaResult<()>;
}

/// Writer of rendered frames.
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &RgbImage) -> MediaResult<()>;

    /// Flush and close the sink. Further writes fail.
    fn finish(&mut self) -> MediaResult<()>;

    fn frames_written(&self) -> u64;
}

/// Fail with `FrameSizeMismatch` unless `frame` has the expected dimensions.
pub fn ensure_frame_size(
    frame_index: u64,
    frame: &RgbImage,
    width: u32,
    height: u32,
) -> MediaResult<()> {
    if frame.width() != width || frame.height() != height {
        return Err(MediaError::frame_size_mismatch(
            frame_index,
            (width, height),
            frame.dimensions(),
        ));
    }
    Ok(())
}
