//! Single-pass analysis driver.
//!
//! Reads frames in index order, asks the detector for each, feeds the
//! per-run [`AnalysisContext`] and optionally writes annotated frames.

use std::time::Instant;

use lagskill_models::HighlightMoment;
use tracing::{debug, info, warn};

use crate::analysis::{AnalysisContext, AnalysisResult, EngineConfig};
use crate::detection::PersonDetector;
use crate::error::{MediaError, MediaResult};
use crate::frames::{FrameSink, FrameSource, SourceInfo};
use crate::render::{annotate_frame, ClipComposer, CompositionSummary, FrameStatus};

/// Frames between progress log lines.
const PROGRESS_INTERVAL: u64 = 300;

/// Highlight selection plus the composed reel, if any.
#[derive(Debug, Clone)]
pub struct HighlightOutcome {
    pub moments: Vec<HighlightMoment>,
    /// `None` when no moment was selected
    pub composition: Option<CompositionSummary>,
}

impl HighlightOutcome {
    pub fn has_highlights(&self) -> bool {
        !self.moments.is_empty()
    }
}

pub struct AnalysisPipeline {
    config: EngineConfig,
}

impl AnalysisPipeline {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one analysis pass over `source`.
    ///
    /// An empty or unreadable source fails the run. When `annotated` is
    /// given, every analyzed frame is annotated and written to it.
    pub fn analyze(
        &self,
        source: &mut dyn FrameSource,
        detector: &mut dyn PersonDetector,
        mut annotated: Option<&mut dyn FrameSink>,
    ) -> MediaResult<AnalysisResult> {
        let info = source.info();
        if info.fps <= 0.0 {
            warn!(fps = info.fps, "Source reports no frame rate, time-based features degrade");
        }

        let started = Instant::now();
        info!(
            width = info.width,
            height = info.height,
            fps = info.fps,
            expected_frames = ?info.frame_count,
            detector = detector.name(),
            "Starting analysis pass"
        );

        let mut ctx = AnalysisContext::new(self.config.clone(), info);

        while let Some(frame) = source.read_frame()? {
            let frame_index = ctx.next_frame_index();
            let detections = detector.detect(frame_index, &frame)?;
            let outcome = ctx.process_frame(&frame, &detections)?;

            if let Some(encounter) = &outcome.events.encounter {
                debug!(
                    frame = frame_index,
                    new_enemies = encounter.new_person_count,
                    "Enemy encounter"
                );
            }

            if let Some(sink) = annotated.as_deref_mut() {
                let mut canvas = frame;
                annotate_frame(
                    &mut canvas,
                    &outcome.boxes,
                    &FrameStatus {
                        frame_index,
                        player_id: outcome.player_id,
                        fps: info.fps,
                    },
                    self.config.arrow_min_speed,
                );
                sink.write_frame(&canvas)?;
            }

            if (frame_index + 1) % PROGRESS_INTERVAL == 0 {
                debug!(
                    frames = frame_index + 1,
                    expected = ?info.frame_count,
                    player = ?outcome.player_id,
                    "Analysis progress"
                );
            }
        }

        if ctx.frames_processed() == 0 {
            return Err(MediaError::EmptySource);
        }

        if let Some(sink) = annotated {
            sink.finish()?;
        }

        let result = ctx.finish();
        info!(
            frames = result.metrics.total_frames,
            persons_tracked = result.metrics.total_persons_tracked,
            player = ?result.metrics.player_track_id,
            encounters = result.encounters.len(),
            reactions = result.reactions.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis pass complete"
        );

        Ok(result)
    }

    /// Select highlight moments from a finished pass and compose them.
    ///
    /// The sink is opened only when at least one moment was selected.
    pub fn compose_highlights<S, F>(
        &self,
        analysis: &AnalysisResult,
        source: &mut dyn FrameSource,
        open_sink: F,
    ) -> MediaResult<HighlightOutcome>
    where
        S: FrameSink,
        F: FnOnce(&SourceInfo) -> MediaResult<S>,
    {
        let moments = analysis.select_highlights(&self.config);
        info!(moments = moments.len(), "Highlight moments selected");

        let composition = ClipComposer::new(&self.config).compose(source, &moments, open_sink)?;
        Ok(HighlightOutcome {
            moments,
            composition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DetectionLog, LoggedFrame};
    use crate::frames::{MemoryFrameSink, MemoryFrameSource};

    #[test]
    fn test_empty_source_fails() {
        let pipeline = AnalysisPipeline::new(EngineConfig::default());
        let mut source = MemoryFrameSource::new(Vec::new(), 30.0);
        let mut detector = DetectionLog::from_frames(Vec::new()).unwrap();
        let err = pipeline.analyze(&mut source, &mut detector, None).unwrap_err();
        assert!(matches!(err, MediaError::EmptySource));
    }

    #[test]
    fn test_annotated_output_gets_every_frame() {
        let pipeline = AnalysisPipeline::new(EngineConfig::default());
        let mut source = MemoryFrameSource::solid(12, 64, 64, 30.0, [20, 20, 20]);
        let mut detector = DetectionLog::from_frames(vec![LoggedFrame {
            frame_index: 3,
            detections: Vec::new(),
        }])
        .unwrap();
        let mut sink = MemoryFrameSink::new(64, 64);

        let result = pipeline
            .analyze(&mut source, &mut detector, Some(&mut sink))
            .unwrap();
        assert_eq!(result.metrics.total_frames, 12);
        assert_eq!(sink.frames_written(), 12);
        assert!(sink.is_finished());
    }

    #[test]
    fn test_no_highlights_opens_no_sink() {
        let pipeline = AnalysisPipeline::new(EngineConfig::default());
        let mut source = MemoryFrameSource::solid(10, 32, 32, 30.0, [0, 0, 0]);
        let mut detector = DetectionLog::from_frames(Vec::new()).unwrap();
        let analysis = pipeline.analyze(&mut source, &mut detector, None).unwrap();

        let outcome = pipeline
            .compose_highlights(&analysis, &mut source, |_| -> MediaResult<MemoryFrameSink> {
                Err(MediaError::sink_failed("should not open"))
            })
            .unwrap();
        assert!(!outcome.has_highlights());
        assert!(outcome.composition.is_none());
    }
}
