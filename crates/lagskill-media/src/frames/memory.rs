//! In-memory frame source and sink.

use std::sync::{Arc, Mutex, MutexGuard};

use image::{Rgb, RgbImage};

use super::{ensure_frame_size, FrameSink, FrameSource, SourceInfo};
use crate::error::{MediaError, MediaResult};

/// Frame source backed by a vector of images.
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    frames: Vec<RgbImage>,
    info: SourceInfo,
    cursor: usize,
}

impl MemoryFrameSource {
    /// Create a source; dimensions are taken from the first frame (0x0 when empty).
    pub fn new(frames: Vec<RgbImage>, fps: f64) -> Self {
        let (width, height) = frames.first().map(|f| f.dimensions()).unwrap_or((0, 0));
        let info = SourceInfo::new(width, height, fps).with_frame_count(frames.len() as u64);
        Self {
            frames,
            info,
            cursor: 0,
        }
    }

    /// `count` frames of a single color.
    pub fn solid(count: usize, width: u32, height: u32, fps: f64, color: [u8; 3]) -> Self {
        Self::from_fn(count, width, height, fps, |_| {
            RgbImage::from_pixel(width, height, Rgb(color))
        })
    }

    /// Build frames with a generator called once per frame index.
    pub fn from_fn<F>(count: usize, width: u32, height: u32, fps: f64, mut f: F) -> Self
    where
        F: FnMut(usize) -> RgbImage,
    {
        let frames: Vec<RgbImage> = (0..count).map(&mut f).collect();
        let mut source = Self::new(frames, fps);
        source.info.width = width;
        source.info.height = height;
        source
    }

    /// Override the reported frame count (e.g. to simulate a lying container).
    pub fn with_reported_frame_count(mut self, frame_count: Option<u64>) -> Self {
        self.info.frame_count = frame_count;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for MemoryFrameSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        let frame = self.frames.get(self.cursor).cloned();
        if frame.is_some() {
            self.cursor += 1;
        }
        Ok(frame)
    }

    fn seek(&mut self, frame_index: u64) -> MediaResult<()> {
        self.cursor = usize::try_from(frame_index)
            .map_err(|_| MediaError::internal("seek index out of range"))?;
        Ok(())
    }
}

/// Frame sink that keeps every written frame.
///
/// Clones share the same buffer, so a caller can keep a handle while the
/// composer owns the sink.
#[derive(Debug, Clone)]
pub struct MemoryFrameSink {
    width: u32,
    height: u32,
    frames: Arc<Mutex<Vec<RgbImage>>>,
    finished: Arc<Mutex<bool>>,
}

impl MemoryFrameSink {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(false)),
        }
    }

    /// Snapshot of all frames written so far.
    pub fn frames(&self) -> Vec<RgbImage> {
        lock(&self.frames).clone()
    }

    pub fn is_finished(&self) -> bool {
        *lock(&self.finished)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl FrameSink for MemoryFrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> MediaResult<()> {
        if self.is_finished() {
            return Err(MediaError::sink_failed("write after finish"));
        }
        let mut frames = lock(&self.frames);
        ensure_frame_size(frames.len() as u64, frame, self.width, self.height)?;
        frames.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> MediaResult<()> {
        *lock(&self.finished) = true;
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        lock(&self.frames).len() as u64
    }
}
