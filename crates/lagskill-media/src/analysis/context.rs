//! Per-run analysis state.

use image::RgbImage;
use lagskill_models::{
    frame_time, Detection, EnemyEncounter, HighlightMoment, PerformanceMetrics, ReactionEvent,
    TimelineEntry,
};

use super::aggregate::{PassSummary, PerformanceAggregator};
use super::config::EngineConfig;
use super::events::{EventDetector, FrameEvents};
use super::heatmap::HeatMap;
use super::highlights::{detect_candidates, plan_clips, select_moments};
use super::motion::FrameMotionEstimator;
use super::tracker::{PersonTracker, TrackedBox};
use crate::error::MediaResult;
use crate::frames::{ensure_frame_size, SourceInfo};

/// What one processed frame produced.
#[derive(Debug, Clone)]
pub struct FrameOutcome {
    pub frame_index: u64,
    pub boxes: Vec<TrackedBox>,
    pub events: FrameEvents,
    /// Locked player after this frame's lock decision
    pub player_id: Option<u32>,
}

impl FrameOutcome {
    pub fn enemy_count(&self) -> usize {
        self.boxes.iter().filter(|b| !b.is_player).count()
    }
}

/// All mutable state of one analysis run. Nothing is shared between runs.
pub struct AnalysisContext {
    config: EngineConfig,
    info: SourceInfo,
    motion: FrameMotionEstimator,
    tracker: PersonTracker,
    events: EventDetector,
    aggregator: PerformanceAggregator,
    heat_map: HeatMap,
    timeline: Vec<TimelineEntry>,
    next_frame: u64,
}

impl AnalysisContext {
    pub fn new(config: EngineConfig, info: SourceInfo) -> Self {
        Self {
            motion: FrameMotionEstimator::new(),
            tracker: PersonTracker::new(config.clone(), info.width, info.height),
            events: EventDetector::new(info.fps, config.event_horizon_sec),
            aggregator: PerformanceAggregator::new(),
            heat_map: HeatMap::new(info.width, info.height, config.heat_cell_px),
            timeline: Vec::new(),
            next_frame: 0,
            config,
            info,
        }
    }

    /// Index the next processed frame will receive.
    pub fn next_frame_index(&self) -> u64 {
        self.next_frame
    }

    /// Process a decoded frame and its detections.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        detections: &[Detection],
    ) -> MediaResult<FrameOutcome> {
        let frame_index = self.next_frame;
        ensure_frame_size(frame_index, frame, self.info.width, self.info.height)?;
        let motion = self.motion.update(frame_index, frame)?;
        Ok(self.observe(motion, detections))
    }

    /// Process a frame given its precomputed motion sample.
    ///
    /// `motion` must be `None` exactly for the first frame.
    pub fn observe(&mut self, motion: Option<f64>, detections: &[Detection]) -> FrameOutcome {
        let frame_index = self.next_frame;
        self.next_frame += 1;
        let time_sec = frame_time(frame_index, self.info.fps);

        let boxes = self.tracker.update(frame_index, detections);
        let person_count = boxes.len() as u32;

        for b in boxes.iter().filter(|b| !b.is_player) {
            self.heat_map.add(b.bbox.cx(), b.bbox.cy());
        }

        self.timeline.push(TimelineEntry {
            frame_index,
            time_sec,
            person_count,
            motion_intensity: motion.unwrap_or(0.0),
            detections: boxes.iter().map(TrackedBox::to_timeline).collect(),
        });

        let events = self.events.observe(frame_index, time_sec, &boxes);
        self.aggregator.record_frame(person_count, motion);

        FrameOutcome {
            frame_index,
            boxes,
            events,
            player_id: self.tracker.player_id(),
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.next_frame
    }

    pub fn player_id(&self) -> Option<u32> {
        self.tracker.player_id()
    }

    pub fn tracker(&self) -> &PersonTracker {
        &self.tracker
    }

    /// Close the pass and compute aggregate metrics.
    pub fn finish(self) -> AnalysisResult {
        let player_track_id = self.tracker.player_id();
        let total_persons_tracked = self.tracker.total_tracks();
        let persons_per_frame = self.aggregator.persons_per_frame().to_vec();
        let heat_map = self.heat_map.normalized();
        let (encounters, reactions) = self.events.into_parts();

        let metrics = self.aggregator.finalize(
            PassSummary {
                fps: self.info.fps,
                reactions: &reactions,
                encounter_count: encounters.len(),
                total_persons_tracked,
                player_track_id,
            },
            &self.config,
        );

        AnalysisResult {
            source: self.info,
            metrics,
            timeline: self.timeline,
            encounters,
            reactions,
            persons_per_frame,
            heat_map,
        }
    }
}

/// Everything a completed analysis pass produced.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub source: SourceInfo,
    pub metrics: PerformanceMetrics,
    pub timeline: Vec<TimelineEntry>,
    pub encounters: Vec<EnemyEncounter>,
    pub reactions: Vec<ReactionEvent>,
    pub persons_per_frame: Vec<u32>,
    /// Normalized enemy heat map; empty when no enemy was seen
    pub heat_map: Vec<Vec<f64>>,
}

impl AnalysisResult {
    /// Score, merge and cap highlight moments, then attach clip windows.
    pub fn select_highlights(&self, config: &EngineConfig) -> Vec<HighlightMoment> {
        let fps = self.source.fps;
        let candidates =
            detect_candidates(&self.timeline, &self.encounters, &self.reactions, fps, config);
        let selected = select_moments(candidates, config);
        plan_clips(selected, fps, self.metrics.total_frames, config)
    }
}
