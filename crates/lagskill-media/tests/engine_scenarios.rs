//! End-to-end engine scenarios over in-memory frames.

use lagskill_media::analysis::{select_moments, PersonTracker};
use lagskill_media::{
    AnalysisPipeline, DetectionLog, EngineConfig, LoggedFrame, MediaError, MediaResult,
    MemoryFrameSink, MemoryFrameSource,
};
use lagskill_models::{BoundingBox, Detection, HighlightCandidate, MomentTag};

fn person(cx: f64, cy: f64, w: f64, h: f64) -> Detection {
    Detection::person(0.9, BoundingBox::centered(cx, cy, w, h))
}

fn log_from_fn<F>(frames: u64, f: F) -> DetectionLog
where
    F: Fn(u64) -> Vec<Detection>,
{
    let frames = (0..frames)
        .map(|frame_index| LoggedFrame {
            frame_index,
            detections: f(frame_index),
        })
        .collect();
    DetectionLog::from_frames(frames).unwrap()
}

fn candidate(time_sec: f64, score: f64) -> HighlightCandidate {
    HighlightCandidate {
        frame_index: (time_sec * 30.0).round() as u64,
        time_sec,
        score,
        tags: vec![MomentTag::MultiEnemy],
        person_count: 3,
        motion: 0.0,
    }
}

#[test]
fn empty_video_reports_defaults() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(10, 64, 48, 30.0, [30, 30, 30]);
    let mut detector = log_from_fn(10, |_| Vec::new());

    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    let m = &result.metrics;

    assert_eq!(m.total_frames, 10);
    assert_eq!(m.avg_characters, 0.0);
    assert!(!m.player_detected);
    assert_eq!(m.player_track_id, None);
    assert_eq!(m.encounter_count, 0);
    assert_eq!(m.elimination_count, 0);
    assert!(!m.reaction.measured);
    // Static frames: full stability, no motion, 30/60 fps term
    assert!((m.performance_score - 85.0).abs() < 1e-9);
    assert!(result.heat_map.is_empty());
    assert_eq!(result.timeline.len(), 10);
}

#[test]
fn empty_source_is_terminal() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::new(Vec::new(), 30.0);
    let mut detector = log_from_fn(0, |_| Vec::new());
    assert!(matches!(
        pipeline.analyze(&mut source, &mut detector, None),
        Err(MediaError::EmptySource)
    ));
}

#[test]
fn encounter_then_elimination_measures_reaction() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(45, 1280, 720, 30.0, [0, 0, 0]);
    // Player: large lower-center box for the whole clip. Enemy: top-left,
    // more than 400px from the player, visible for frames 10..=39.
    let mut detector = log_from_fn(45, |f| match f {
        10..=39 => vec![person(640.0, 500.0, 300.0, 400.0), person(240.0, 100.0, 20.0, 40.0)],
        _ => vec![person(640.0, 500.0, 300.0, 400.0)],
    });

    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();

    assert_eq!(result.metrics.player_track_id, Some(1));
    // Frame 0 is the player's first sighting, before the lock
    assert_eq!(result.encounters.len(), 2);
    let encounter = &result.encounters[1];
    assert_eq!(encounter.frame_index, 10);
    assert_eq!(encounter.new_person_count, 1);
    assert_eq!(encounter.boxes[0].track_id, 2);

    assert_eq!(result.reactions.len(), 1);
    let reaction = &result.reactions[0];
    assert_eq!(reaction.encounter_frame, 10);
    assert_eq!(reaction.elimination_frame, 40);
    assert!((reaction.reaction_time_ms - 1000.0).abs() < 1e-9);

    assert!(result.metrics.reaction.measured);
    assert_eq!(result.metrics.total_persons_tracked, 2);
}

#[test]
fn new_box_after_empty_stretch_is_the_only_encounter() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(45, 1280, 720, 30.0, [0, 0, 0]);
    let mut detector = log_from_fn(45, |f| match f {
        10..=39 => vec![person(840.0, 100.0, 20.0, 40.0)],
        _ => Vec::new(),
    });

    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();

    assert_eq!(result.encounters.len(), 1);
    assert_eq!(result.encounters[0].frame_index, 10);
    assert_eq!(result.reactions.len(), 1);
    assert!((result.reactions[0].reaction_time_ms - 1000.0).abs() < 1e-9);
    assert!(!result.metrics.player_detected);
}

#[test]
fn six_frame_clip_locks_the_player() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut detector = log_from_fn(6, |_| vec![person(640.0, 500.0, 300.0, 400.0)]);
    let mut source = MemoryFrameSource::solid(6, 1280, 720, 30.0, [0, 0, 0]);
    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    assert!(result.metrics.player_detected);
    assert_eq!(result.metrics.player_track_id, Some(1));

    let mut detector = log_from_fn(5, |_| vec![person(640.0, 500.0, 300.0, 400.0)]);
    let mut source = MemoryFrameSource::solid(5, 1280, 720, 30.0, [0, 0, 0]);
    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    assert!(!result.metrics.player_detected);
}

#[test]
fn duplicate_detection_raises_no_encounter() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(3, 1280, 720, 30.0, [0, 0, 0]);
    let mut detector = log_from_fn(3, |f| match f {
        2 => vec![person(400.0, 300.0, 40.0, 80.0), person(402.0, 300.0, 40.0, 80.0)],
        _ => vec![person(400.0, 300.0, 40.0, 80.0)],
    });

    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();

    let frames: Vec<u64> = result.encounters.iter().map(|e| e.frame_index).collect();
    assert_eq!(frames, vec![0]);
    assert_eq!(result.metrics.total_persons_tracked, 1);
}

#[test]
fn single_attribution_per_encounter() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(60, 1280, 720, 30.0, [0, 0, 0]);
    let mut detector = log_from_fn(60, |f| match f {
        0..=9 => Vec::new(),
        10..=19 => vec![
            person(100.0, 150.0, 20.0, 40.0),
            person(500.0, 150.0, 20.0, 40.0),
            person(900.0, 150.0, 20.0, 40.0),
        ],
        20..=29 => vec![person(100.0, 150.0, 20.0, 40.0), person(500.0, 150.0, 20.0, 40.0)],
        30..=39 => vec![person(100.0, 150.0, 20.0, 40.0)],
        _ => Vec::new(),
    });

    let result = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    assert_eq!(result.encounters.len(), 1);
    // Three drops, one encounter: only the first drop is attributed
    assert_eq!(result.reactions.len(), 1);
    assert_eq!(result.reactions[0].elimination_frame, 20);
}

#[test]
fn track_ids_are_monotonic_and_never_reused() {
    let config = EngineConfig::default();
    let mut tracker = PersonTracker::new(config, 1280, 720);

    let first = tracker.update(0, &[person(200.0, 200.0, 30.0, 60.0)]);
    let mut seen = vec![first[0].track_id];

    // Gone long enough to fall out of the matching horizon
    for frame in 1..20 {
        tracker.update(frame, &[]);
    }
    let second = tracker.update(20, &[person(200.0, 200.0, 30.0, 60.0)]);
    assert!(second[0].track_id > seen[0]);
    seen.push(second[0].track_id);

    let third = tracker.update(21, &[person(200.0, 200.0, 30.0, 60.0), person(1000.0, 200.0, 30.0, 60.0)]);
    assert_eq!(third[0].track_id, seen[1]);
    assert!(third[1].track_id > seen[1]);
    assert_eq!(tracker.total_tracks(), 3);
}

#[test]
fn player_lock_survives_larger_box() {
    let mut tracker = PersonTracker::new(EngineConfig::default(), 1280, 720);
    for frame in 0..10 {
        tracker.update(frame, &[person(640.0, 500.0, 400.0, 400.0)]);
    }
    let locked = tracker.player_id().unwrap();

    for frame in 10..30 {
        tracker.update(
            frame,
            &[person(640.0, 500.0, 400.0, 400.0), person(200.0, 300.0, 500.0, 600.0)],
        );
    }
    assert_eq!(tracker.player_id(), Some(locked));
}

#[test]
fn merge_keeps_the_better_nearby_moment() {
    let config = EngineConfig::default();
    let selected = select_moments(vec![candidate(10.0, 80.0), candidate(12.0, 60.0)], &config);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].time_sec, 10.0);
}

#[test]
fn cap_drops_the_weakest_of_six() {
    let config = EngineConfig::default();
    let candidates = vec![
        candidate(0.0, 70.0),
        candidate(10.0, 95.0),
        candidate(20.0, 51.0),
        candidate(30.0, 88.0),
        candidate(40.0, 60.0),
        candidate(50.0, 75.0),
    ];
    let selected = select_moments(candidates, &config);
    assert_eq!(selected.len(), 5);
    assert!(selected.iter().all(|c| c.score != 51.0));
    assert!(selected.windows(2).all(|w| w[0].time_sec < w[1].time_sec));
}

#[test]
fn highlight_reel_from_crowded_video() {
    let config = EngineConfig::default();
    let pipeline = AnalysisPipeline::new(config);
    let (w, h) = (96, 64);
    let mut source = MemoryFrameSource::solid(600, w, h, 30.0, [60, 60, 60]);
    let mut detector = log_from_fn(600, |_| {
        vec![
            person(15.0, 20.0, 10.0, 20.0),
            person(48.0, 20.0, 10.0, 20.0),
            person(80.0, 20.0, 10.0, 20.0),
        ]
    });

    let analysis = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    assert_eq!(analysis.encounters.len(), 1);
    assert_eq!(analysis.metrics.max_characters, 3);

    let sink = MemoryFrameSink::new(w, h);
    let handle = sink.clone();
    let outcome = pipeline
        .compose_highlights(&analysis, &mut source, move |_| Ok(sink))
        .unwrap();

    let times: Vec<f64> = outcome.moments.iter().map(|m| m.time_sec).collect();
    assert_eq!(times, vec![0.0, 5.0, 10.0, 15.0]);
    assert_eq!(outcome.moments[0].score, 130.0);
    assert_eq!(
        outcome.moments[0].tags,
        vec![MomentTag::MultiEnemy, MomentTag::EnemyEncounter]
    );
    assert_eq!((outcome.moments[1].start_frame, outcome.moments[1].end_frame), (90, 210));

    let summary = outcome.composition.unwrap();
    assert_eq!(summary.clips, 4);
    assert_eq!(summary.clip_frames_written, 480);
    assert_eq!(summary.transition_frames_written, 45);
    assert_eq!(handle.frames().len(), 525);
    assert!(handle.is_finished());
}

#[test]
fn quiet_video_produces_no_reel() {
    let pipeline = AnalysisPipeline::new(EngineConfig::default());
    let mut source = MemoryFrameSource::solid(90, 64, 48, 30.0, [0, 0, 0]);
    let mut detector = log_from_fn(90, |_| vec![person(20.0, 20.0, 10.0, 20.0)]);

    let analysis = pipeline.analyze(&mut source, &mut detector, None).unwrap();
    let outcome = pipeline
        .compose_highlights(&analysis, &mut source, |_| -> MediaResult<MemoryFrameSink> {
            Err(MediaError::sink_failed("no reel expected"))
        })
        .unwrap();
    assert!(outcome.moments.is_empty());
    assert!(outcome.composition.is_none());
}
