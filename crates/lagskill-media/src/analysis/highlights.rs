//! Highlight scoring, merging and clip-window planning.
//!
//! Selection is greedy: candidates are visited best-first and kept unless an
//! already accepted moment lies inside the merge window.

use std::cmp::Ordering;

use lagskill_models::{
    EnemyEncounter, HighlightCandidate, HighlightMoment, MomentTag, ReactionEvent, TimelineEntry,
};

use super::config::EngineConfig;

/// Score a single timeline entry; returns a candidate when it beats the threshold.
pub fn score_entry(
    entry: &TimelineEntry,
    encounters: &[EnemyEncounter],
    reactions: &[ReactionEvent],
    fps: f64,
    config: &EngineConfig,
) -> Option<HighlightCandidate> {
    let persons = entry.person_count;
    let motion = entry.motion_intensity;
    let mut score = 0.0;
    let mut tags = Vec::new();

    if persons >= config.multi_enemy_min_persons {
        score += config.multi_enemy_points * persons as f64;
        tags.push(MomentTag::MultiEnemy);
    } else if persons >= config.combat_min_persons {
        score += config.combat_points * persons as f64;
        tags.push(MomentTag::Combat);
    }

    if motion > config.intense_motion_threshold {
        score += config.motion_weight * motion;
        tags.push(MomentTag::IntenseAction);
    }

    let near = |frame: u64, window_sec: f64| {
        (entry.frame_index.abs_diff(frame) as f64) < fps * window_sec
    };

    if encounters
        .iter()
        .any(|e| near(e.frame_index, config.encounter_window_sec))
    {
        score += config.encounter_bonus;
        tags.push(MomentTag::EnemyEncounter);
    }

    if let Some(reaction) = reactions
        .iter()
        .find(|r| near(r.elimination_frame, config.elimination_window_sec))
    {
        if reaction.reaction_time_ms < config.quick_kill_ms {
            score += config.quick_kill_bonus;
            tags.push(MomentTag::QuickKill);
        } else {
            score += config.elimination_bonus;
            tags.push(MomentTag::Elimination);
        }
    }

    (score > config.candidate_threshold).then(|| HighlightCandidate {
        frame_index: entry.frame_index,
        time_sec: entry.time_sec,
        score,
        tags,
        person_count: persons,
        motion,
    })
}

/// Score every timeline entry, keeping those above the threshold in scan order.
pub fn detect_candidates(
    timeline: &[TimelineEntry],
    encounters: &[EnemyEncounter],
    reactions: &[ReactionEvent],
    fps: f64,
    config: &EngineConfig,
) -> Vec<HighlightCandidate> {
    timeline
        .iter()
        .filter_map(|entry| score_entry(entry, encounters, reactions, fps, config))
        .collect()
}

/// Drop candidates that fall inside the merge window of a better one.
///
/// Result is ordered by score descending (ties keep scan order).
pub fn merge_candidates(
    mut candidates: Vec<HighlightCandidate>,
    config: &EngineConfig,
) -> Vec<HighlightCandidate> {
    // Stable: equal scores keep their scan order
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut accepted: Vec<HighlightCandidate> = Vec::new();
    for candidate in candidates {
        let conflicts = |m: &HighlightCandidate| {
            (m.time_sec - candidate.time_sec).abs() < config.merge_window_sec
        };
        if !accepted.iter().any(conflicts) {
            accepted.push(candidate);
        } else if accepted
            .iter()
            .filter(|m| conflicts(*m))
            .all(|m| candidate.score > m.score)
        {
            accepted.retain(|m| !conflicts(m));
            accepted.push(candidate);
        }
    }
    accepted
}

/// Merge, keep the best `max_moments`, then order by time.
pub fn select_moments(
    candidates: Vec<HighlightCandidate>,
    config: &EngineConfig,
) -> Vec<HighlightCandidate> {
    let mut merged = merge_candidates(candidates, config);
    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    merged.truncate(config.max_moments);
    merged.sort_by(|a, b| {
        a.time_sec
            .partial_cmp(&b.time_sec)
            .unwrap_or(Ordering::Equal)
            .then(a.frame_index.cmp(&b.frame_index))
    });
    merged
}

/// Frames per clip for a given fps, falling back when fps is unknown.
pub fn clip_frames(fps: f64, config: &EngineConfig) -> u64 {
    let fps = if fps > 0.0 { fps } else { config.fallback_fps };
    (config.clip_duration_sec * fps).round().max(1.0) as u64
}

/// Frames of black transition between clips.
pub fn transition_frames(fps: f64, config: &EngineConfig) -> u64 {
    let fps = if fps > 0.0 { fps } else { config.fallback_fps };
    (config.transition_sec * fps).round().max(0.0) as u64
}

/// Number the selected moments and attach their clip windows.
///
/// Windows are centered on the moment and truncated at `total_frames`.
pub fn plan_clips(
    selected: Vec<HighlightCandidate>,
    fps: f64,
    total_frames: u64,
    config: &EngineConfig,
) -> Vec<HighlightMoment> {
    let clip = clip_frames(fps, config);
    selected
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| {
            let start = candidate.frame_index.saturating_sub(clip / 2).min(total_frames);
            let end = (start + clip).min(total_frames);
            HighlightMoment::from_candidate(i as u32 + 1, candidate, start, end)
        })
        .collect()
}
