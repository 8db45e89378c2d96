//! Highlight moment models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason a timeline entry scored as exciting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MomentTag {
    /// Three or more persons on screen
    MultiEnemy,
    /// Exactly two persons on screen
    Combat,
    /// Motion intensity above the action threshold
    IntenseAction,
    /// An encounter happened close by
    EnemyEncounter,
    /// A fast elimination happened close by
    QuickKill,
    /// A slower elimination happened close by
    Elimination,
}

impl MomentTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            MomentTag::MultiEnemy => "multi_enemy",
            MomentTag::Combat => "combat",
            MomentTag::IntenseAction => "intense_action",
            MomentTag::EnemyEncounter => "enemy_encounter",
            MomentTag::QuickKill => "quick_kill",
            MomentTag::Elimination => "elimination",
        }
    }

    /// Short human-readable phrase used in moment descriptions.
    pub fn phrase(&self) -> &'static str {
        match self {
            MomentTag::MultiEnemy => "Multiple enemies",
            MomentTag::Combat => "Close combat",
            MomentTag::IntenseAction => "Intense action",
            MomentTag::EnemyEncounter => "Enemy encounter",
            MomentTag::QuickKill => "Quick elimination",
            MomentTag::Elimination => "Elimination",
        }
    }
}

impl fmt::Display for MomentTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A timeline entry whose excitement score passed the candidate threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightCandidate {
    pub frame_index: u64,
    pub time_sec: f64,
    pub score: f64,
    /// Tags in scoring order
    pub tags: Vec<MomentTag>,
    pub person_count: u32,
    pub motion: f64,
}

/// A selected moment with its clip window in the source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HighlightMoment {
    /// 1-based position in the reel
    pub number: u32,
    pub frame_index: u64,
    pub time_sec: f64,
    pub score: f64,
    pub tags: Vec<MomentTag>,
    pub person_count: u32,
    pub motion: f64,
    /// First source frame of the clip (inclusive)
    pub start_frame: u64,
    /// Last source frame of the clip (exclusive)
    pub end_frame: u64,
    pub description: String,
}

impl HighlightMoment {
    /// Promote a candidate to a numbered moment with a clip window.
    pub fn from_candidate(
        number: u32,
        candidate: HighlightCandidate,
        start_frame: u64,
        end_frame: u64,
    ) -> Self {
        let description = describe(&candidate);
        Self {
            number,
            frame_index: candidate.frame_index,
            time_sec: candidate.time_sec,
            score: candidate.score,
            tags: candidate.tags,
            person_count: candidate.person_count,
            motion: candidate.motion,
            start_frame,
            end_frame,
            description,
        }
    }

    /// Number of source frames in the clip window.
    pub fn clip_len(&self) -> u64 {
        self.end_frame.saturating_sub(self.start_frame)
    }

    /// Overlay caption: the first two tags, uppercased.
    pub fn tag_caption(&self) -> String {
        self.tags
            .iter()
            .take(2)
            .map(|t| t.as_str().to_uppercase())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn describe(candidate: &HighlightCandidate) -> String {
    match candidate.tags.first() {
        Some(MomentTag::MultiEnemy) => format!("{} enemies on screen", candidate.person_count),
        Some(tag) => tag.phrase().to_string(),
        None => "Highlight".to_string(),
    }
}
