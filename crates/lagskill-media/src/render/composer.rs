//! Highlight reel composition.
//!
//! Output order is `clip_1, transition, clip_2, ..., clip_k`; no transition
//! follows the last clip.

use image::RgbImage;
use lagskill_models::HighlightMoment;
use tracing::{debug, info};

use super::canvas::{blend_rect, fill_rect, BLACK, WHITE, YELLOW};
use super::font::{draw_text, text_height, text_width};
use crate::analysis::{clip_frames, transition_frames, EngineConfig};
use crate::error::MediaResult;
use crate::frames::{ensure_frame_size, FrameSink, FrameSource, SourceInfo};

/// Counts of what was written to the reel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositionSummary {
    pub clips: usize,
    pub clip_frames_written: u64,
    pub transition_frames_written: u64,
    pub fps: f64,
}

impl CompositionSummary {
    pub fn total_frames(&self) -> u64 {
        self.clip_frames_written + self.transition_frames_written
    }

    pub fn duration_sec(&self) -> f64 {
        if self.fps > 0.0 {
            self.total_frames() as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Extracts, overlays and concatenates highlight clips.
pub struct ClipComposer<'a> {
    config: &'a EngineConfig,
}

impl<'a> ClipComposer<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Compose `moments` (already time-ordered, with clip windows) into a sink.
    ///
    /// `open_sink` is only called when there is at least one moment; with
    /// none, returns `Ok(None)`.
    pub fn compose<S, F>(
        &self,
        source: &mut dyn FrameSource,
        moments: &[HighlightMoment],
        open_sink: F,
    ) -> MediaResult<Option<CompositionSummary>>
    where
        S: FrameSink,
        F: FnOnce(&SourceInfo) -> MediaResult<S>,
    {
        if moments.is_empty() {
            debug!("No moments to compose");
            return Ok(None);
        }

        let info = source.info();
        let fps = info.effective_fps(self.config.fallback_fps);
        let clip_len = clip_frames(info.fps, self.config);
        let transition_len = transition_frames(info.fps, self.config);

        let mut sink = open_sink(&info)?;
        let mut summary = CompositionSummary {
            clips: 0,
            clip_frames_written: 0,
            transition_frames_written: 0,
            fps,
        };

        for (i, moment) in moments.iter().enumerate() {
            let written = self.write_clip(source, &mut sink, moment, &info, clip_len)?;
            summary.clips += 1;
            summary.clip_frames_written += written;

            debug!(
                moment = moment.number,
                start_frame = moment.start_frame,
                end_frame = moment.end_frame,
                frames = written,
                "Clip written"
            );

            if i + 1 < moments.len() {
                let card = transition_card(info.width, info.height);
                for _ in 0..transition_len {
                    sink.write_frame(&card)?;
                }
                summary.transition_frames_written += transition_len;
            }
        }

        sink.finish()?;

        info!(
            clips = summary.clips,
            frames = summary.total_frames(),
            duration_sec = summary.duration_sec(),
            "Highlight reel composed"
        );

        Ok(Some(summary))
    }

    fn write_clip<S: FrameSink>(
        &self,
        source: &mut dyn FrameSource,
        sink: &mut S,
        moment: &HighlightMoment,
        info: &SourceInfo,
        clip_len: u64,
    ) -> MediaResult<u64> {
        if moment.end_frame <= moment.start_frame {
            return Ok(0);
        }
        source.seek(moment.start_frame)?;

        let mut written = 0u64;
        for frame_index in moment.start_frame..moment.end_frame {
            let Some(mut frame) = source.read_frame()? else {
                break;
            };
            ensure_frame_size(frame_index, &frame, info.width, info.height)?;
            self.draw_overlay(&mut frame, moment, written, clip_len);
            sink.write_frame(&frame)?;
            written += 1;
        }
        Ok(written)
    }

    fn draw_overlay(&self, frame: &mut RgbImage, moment: &HighlightMoment, written: u64, clip_len: u64) {
        let w = frame.width() as i64;
        let h = frame.height() as i64;

        blend_rect(
            frame,
            0,
            0,
            w,
            self.config.overlay_band_px as i64,
            BLACK,
            self.config.overlay_opacity,
        );

        draw_text(frame, 20, 14, &format!("HIGHLIGHT #{}", moment.number), 3, YELLOW);

        let caption_y = 14 + text_height(3) as i64 + 10;
        draw_text(frame, 20, caption_y, &moment.tag_caption(), 2, WHITE);

        let score = format!("SCORE {:.0}", moment.score);
        let score_x = w - 20 - text_width(&score, 2) as i64;
        draw_text(frame, score_x, caption_y, &score, 2, WHITE);

        let progress = (written as f64 / clip_len.max(1) as f64).min(1.0);
        let bar = (progress * (w - 40).max(0) as f64) as i64;
        fill_rect(frame, 20, h - 30, 20 + bar, h - 20, YELLOW);
    }
}

/// Black frame captioned `NEXT HIGHLIGHT`.
pub fn transition_card(width: u32, height: u32) -> RgbImage {
    let mut card = RgbImage::from_pixel(width, height, BLACK);
    let text = "NEXT HIGHLIGHT";
    let scale = if width >= 400 { 4 } else { 1 };
    let x = (width as i64 - text_width(text, scale) as i64) / 2;
    let y = (height as i64 - text_height(scale) as i64) / 2;
    draw_text(&mut card, x, y, text, scale, WHITE);
    card
}
