//! Report assembly from engine results.

use chrono::Utc;
use lagskill_media::{AnalysisResult, HighlightOutcome};
use lagskill_models::{
    frame_time, AnalysisReport, EncounterDetail, GamePreset, HighlightReelReport, MomentSummary,
    ReactionDetail, ReelId, RunId,
};

use crate::coaching::{self, CoachingInputs};

/// Round to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Per-run values that are not part of the engine result.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub run_id: RunId,
    pub filename: String,
    pub preset: GamePreset,
    pub annotated_video: Option<String>,
    pub timeline_cap: usize,
    pub summary_cap: usize,
}

pub fn build_analysis_report(result: &AnalysisResult, opts: &ReportOptions) -> AnalysisReport {
    let m = &result.metrics;
    let fps = m.video_fps;

    let encounter_details = result
        .encounters
        .iter()
        .take(opts.summary_cap)
        .enumerate()
        .map(|(i, e)| EncounterDetail {
            encounter_num: i as u32 + 1,
            time_sec: round_to(e.time_sec, 2),
            new_enemies: e.new_person_count,
        })
        .collect();

    let reaction_time_details = result
        .reactions
        .iter()
        .take(opts.summary_cap)
        .enumerate()
        .map(|(i, r)| ReactionDetail {
            encounter_num: i as u32 + 1,
            reaction_time_ms: r.reaction_time_ms.round() as i64,
            time_sec: round_to(frame_time(r.encounter_frame, fps), 2),
        })
        .collect();

    let coaching_inputs = CoachingInputs {
        fps,
        stability: m.fps_stability,
        reaction_ms: m.reaction.avg_ms,
        performance_score: m.performance_score,
        encounters: m.encounter_count,
        eliminations: m.elimination_count,
    };

    AnalysisReport {
        run_id: opts.run_id.clone(),
        status: "analyzed".to_string(),
        filename: opts.filename.clone(),
        game_preset: opts.preset,
        created_at: Utc::now(),
        player_detected: m.player_detected,
        player_track_id: m.player_track_id,
        avg_characters: round_to(m.avg_characters, 3),
        max_characters: m.max_characters,
        total_frames: m.total_frames,
        total_persons_tracked: m.total_persons_tracked,
        scene_complexity_score: round_to(m.scene_complexity_score, 3),
        video_fps: round_to(fps, 2),
        frame_time_ms: round_to(m.frame_time_ms, 2),
        avg_motion_intensity: round_to(m.avg_motion_intensity, 2),
        motion_stability: round_to(m.fps_stability, 2),
        stutter_score: round_to(m.stutter_score, 4),
        performance_score: round_to(m.performance_score, 2),
        estimated_reaction_time_ms: m.reaction.avg_ms as i64,
        min_reaction_time_ms: m.reaction.min_ms as i64,
        max_reaction_time_ms: m.reaction.max_ms as i64,
        reaction_time_measured: m.reaction.measured,
        sudden_enemy_encounters: m.encounter_count,
        successful_eliminations: m.elimination_count,
        persons_per_frame: result
            .persons_per_frame
            .iter()
            .take(opts.timeline_cap)
            .copied()
            .collect(),
        encounter_details,
        reaction_time_details,
        heat_map: result.heat_map.clone(),
        timeline: result.timeline.iter().take(opts.timeline_cap).cloned().collect(),
        annotated_video: opts.annotated_video.clone(),
        verdict: coaching::verdict(&coaching_inputs),
        benchmarks: coaching::benchmarks(opts.preset, &coaching_inputs),
        tips: coaching::tips(&coaching_inputs),
    }
}

/// Reel report; `no_highlights` when nothing was composed.
pub fn build_reel_report(
    run_id: RunId,
    reel_id: ReelId,
    filename: &str,
    outcome: &HighlightOutcome,
) -> HighlightReelReport {
    let Some(composition) = outcome.composition.filter(|_| outcome.has_highlights()) else {
        return HighlightReelReport::no_highlights(run_id, filename);
    };

    let clip_duration_sec = if composition.fps > 0.0 {
        composition.clip_frames_written as f64 / composition.fps
    } else {
        0.0
    };

    HighlightReelReport::Success {
        run_id,
        highlight_video: reel_id.video_filename(),
        reel_id,
        filename: filename.to_string(),
        num_highlights: outcome.moments.len(),
        total_duration_sec: round_to(clip_duration_sec, 2),
        moments: outcome.moments.iter().map(MomentSummary::from).collect(),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagskill_media::analysis::{AnalysisContext, EngineConfig};
    use lagskill_media::frames::SourceInfo;
    use lagskill_media::CompositionSummary;
    use lagskill_models::{BoundingBox, Detection, HighlightCandidate, HighlightMoment, MomentTag};

    fn options(timeline_cap: usize) -> ReportOptions {
        ReportOptions {
            run_id: RunId::from_string("run-1"),
            filename: "match.mp4".to_string(),
            preset: GamePreset::Valorant,
            annotated_video: None,
            timeline_cap,
            summary_cap: 10,
        }
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.23456, 3), 1.235);
        assert_eq!(round_to(59.999, 2), 60.0);
    }

    #[test]
    fn test_report_caps_and_placeholders() {
        let mut ctx = AnalysisContext::new(EngineConfig::default(), SourceInfo::new(640, 360, 30.0));
        ctx.observe(None, &[]);
        for _ in 1..150 {
            ctx.observe(
                Some(0.0),
                &[Detection::person(0.8, BoundingBox::centered(100.0, 100.0, 20.0, 40.0))],
            );
        }
        let result = ctx.finish();
        let report = build_analysis_report(&result, &options(100));

        assert_eq!(report.total_frames, 150);
        assert_eq!(report.timeline.len(), 100);
        assert_eq!(report.persons_per_frame.len(), 100);
        assert_eq!(report.estimated_reaction_time_ms, 250);
        assert!(!report.reaction_time_measured);
        assert_eq!(report.avg_characters, 0.993);
        assert_eq!(report.sudden_enemy_encounters, 1);
        // reaction, fps, stability, combat, overall
        assert_eq!(report.tips.len(), 5);
    }

    #[test]
    fn test_reel_report_variants() {
        let none = HighlightOutcome {
            moments: Vec::new(),
            composition: None,
        };
        let report = build_reel_report(RunId::new(), ReelId::new(), "a.mp4", &none);
        assert!(!report.is_success());

        let moment = HighlightMoment::from_candidate(
            1,
            HighlightCandidate {
                frame_index: 300,
                time_sec: 10.0,
                score: 95.4,
                tags: vec![MomentTag::MultiEnemy, MomentTag::IntenseAction],
                person_count: 3,
                motion: 2.7,
            },
            240,
            360,
        );
        let some = HighlightOutcome {
            moments: vec![moment],
            composition: Some(CompositionSummary {
                clips: 1,
                clip_frames_written: 120,
                transition_frames_written: 0,
                fps: 30.0,
            }),
        };
        let reel_id = ReelId::from_string("reel-1");
        match build_reel_report(RunId::new(), reel_id, "a.mp4", &some) {
            HighlightReelReport::Success {
                highlight_video,
                num_highlights,
                total_duration_sec,
                moments,
                ..
            } => {
                assert_eq!(highlight_video, "highlights_reel-1.mp4");
                assert_eq!(num_highlights, 1);
                assert_eq!(total_duration_sec, 4.0);
                assert_eq!(moments[0].score, 95);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }
}
