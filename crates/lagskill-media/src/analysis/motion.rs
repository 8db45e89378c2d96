//! Frame-difference motion intensity.

use image::{imageops, GrayImage, RgbImage};

use crate::error::{MediaError, MediaResult};

/// Mean absolute grayscale difference between two equally sized frames.
pub fn motion_intensity(prev: &GrayImage, current: &GrayImage) -> Option<f64> {
    if prev.dimensions() != current.dimensions() {
        return None;
    }
    let pixels = prev.as_raw().len();
    if pixels == 0 {
        return Some(0.0);
    }
    let total: u64 = prev
        .as_raw()
        .iter()
        .zip(current.as_raw())
        .map(|(a, b)| a.abs_diff(*b) as u64)
        .sum();
    Some(total as f64 / pixels as f64)
}

/// Stateful estimator fed one frame at a time.
#[derive(Debug, Default)]
pub struct FrameMotionEstimator {
    prev: Option<GrayImage>,
}

impl FrameMotionEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed frame `frame_index`; returns `None` for the first frame.
    pub fn update(&mut self, frame_index: u64, frame: &RgbImage) -> MediaResult<Option<f64>> {
        let gray = imageops::grayscale(frame);
        let motion = match &self.prev {
            Some(prev) => Some(motion_intensity(prev, &gray).ok_or_else(|| {
                MediaError::frame_size_mismatch(frame_index, prev.dimensions(), gray.dimensions())
            })?),
            None => None,
        };
        self.prev = Some(gray);
        Ok(motion)
    }
}
