//! Benchmark percentiles, verdicts and coaching tips.

use lagskill_models::{Benchmark, BenchmarkTable, Benchmarks, GamePreset, Verdict, VerdictKind};

/// Report values the coaching rules look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoachingInputs {
    pub fps: f64,
    /// Motion stability, 0..100
    pub stability: f64,
    pub reaction_ms: f64,
    pub performance_score: f64,
    pub encounters: usize,
    pub eliminations: usize,
}

fn tier(percentile: &str, rank: u8, color: &str) -> Benchmark {
    Benchmark {
        percentile: percentile.to_string(),
        rank,
        color: color.to_string(),
    }
}

/// Rank `value` against a table; `lower_is_better` flips the comparisons.
pub fn rank(value: f64, table: &BenchmarkTable, lower_is_better: bool) -> Benchmark {
    let beats = |threshold: f64| {
        if lower_is_better {
            value <= threshold
        } else {
            value >= threshold
        }
    };

    if beats(table.top1) {
        tier("Top 1%", 99, "purple")
    } else if beats(table.top10) {
        tier("Top 10%", 90, "gold")
    } else if beats(table.top25) {
        tier("Top 25%", 75, "green")
    } else if beats(table.avg) {
        tier("Above Average", 60, "blue")
    } else {
        tier("Below Average", 40, "gray")
    }
}

pub fn benchmarks(preset: GamePreset, inputs: &CoachingInputs) -> Benchmarks {
    Benchmarks {
        reaction_time: rank(inputs.reaction_ms, &preset.reaction_time(), true),
        fps: rank(inputs.fps, &preset.fps(), false),
        performance: rank(inputs.performance_score, &preset.performance(), false),
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Overall verdict; the first matching rule wins.
pub fn verdict(inputs: &CoachingInputs) -> Verdict {
    let good_fps = inputs.fps >= 60.0;
    let good_stability = inputs.stability >= 70.0;
    let good_reaction = inputs.reaction_ms <= 250.0;
    let excellent_reaction = inputs.reaction_ms <= 200.0;

    if good_fps && good_stability && excellent_reaction {
        return Verdict {
            kind: VerdictKind::Excellent,
            title: "Excellent Performance!".to_string(),
            description: "Your system is running smoothly and your skills are on point. You're in the top tier!".to_string(),
            recommendations: strings(&[
                "Keep practicing to maintain your edge",
                "Try more challenging scenarios",
                "Consider competitive play",
                "Share your setup with others",
            ]),
        };
    }

    if good_fps && good_stability && !good_reaction {
        return Verdict {
            kind: VerdictKind::NeedsWork,
            title: "Your Skills Need Work".to_string(),
            description: "Your system is performing well, but your reaction time and gameplay mechanics could use improvement.".to_string(),
            recommendations: strings(&[
                "Practice reaction time drills daily",
                "Focus on crosshair placement",
                "Review your gameplay to identify mistakes",
                "Work on game sense and positioning",
            ]),
        };
    }

    if !good_fps || !good_stability {
        return Verdict {
            kind: VerdictKind::Upgrade,
            title: "System Upgrade Recommended".to_string(),
            description: "Your hardware is holding you back. Low FPS or instability is affecting your performance.".to_string(),
            recommendations: strings(&[
                "Lower graphics settings for better FPS",
                "Close background applications",
                "Consider hardware upgrades (GPU/CPU)",
                "Check for driver updates",
                "Monitor temperatures during gameplay",
            ]),
        };
    }

    if good_fps && good_reaction {
        return Verdict {
            kind: VerdictKind::Good,
            title: "Good Performance".to_string(),
            description: "You're doing well! Your system and skills are both solid. Keep it up!".to_string(),
            recommendations: strings(&[
                "Continue regular practice",
                "Fine-tune your sensitivity settings",
                "Watch pro player streams for tips",
                "Stay consistent with your routine",
            ]),
        };
    }

    Verdict {
        kind: VerdictKind::Average,
        title: "Average Performance".to_string(),
        description: "You're doing okay, but there's room for improvement in both system and skills.".to_string(),
        recommendations: strings(&[
            "Optimize your game settings",
            "Practice aim training regularly",
            "Review your hardware specs",
            "Join community forums for tips",
        ]),
    }
}

/// Coaching tips: reaction, fps, stability, combat (when there were encounters), overall.
pub fn tips(inputs: &CoachingInputs) -> Vec<String> {
    let mut tips = Vec::with_capacity(5);
    let reaction = inputs.reaction_ms;
    let fps = inputs.fps;
    let stability = inputs.stability;

    tips.push(
        if reaction < 180.0 {
            "Outstanding reaction speed! You're in the top 5% of players."
        } else if reaction < 220.0 {
            "Excellent reaction time - you have the reflexes for competitive play."
        } else if reaction < 260.0 {
            "Good reaction time, but there's room for improvement with daily aim training."
        } else {
            "Reaction time needs work - try aim trainers like Aim Lab or Kovaak's for 15 minutes daily."
        }
        .to_string(),
    );

    tips.push(
        if fps >= 144.0 {
            "System running smoothly at high FPS - no performance bottlenecks detected."
        } else if fps >= 90.0 {
            "Good FPS, but competitive players benefit from 144+ FPS for smoother gameplay."
        } else if fps >= 60.0 {
            "Decent FPS, but consider lowering graphics settings for better responsiveness."
        } else {
            "Low FPS detected - this is significantly impacting your performance. Lower settings or upgrade GPU."
        }
        .to_string(),
    );

    tips.push(
        if stability >= 85.0 {
            "Frame times are very stable - smooth and consistent gameplay experience."
        } else if stability >= 70.0 {
            "Frame times are mostly stable with minor variance during intense scenes."
        } else if stability >= 50.0 {
            "Noticeable frame time variance - close background applications and check CPU usage."
        } else {
            "Significant frame drops and stuttering detected - system bottleneck likely affecting gameplay."
        }
        .to_string(),
    );

    if inputs.encounters > 0 {
        let rate = inputs.eliminations as f64 / inputs.encounters as f64 * 100.0;
        let pct = rate as i64;
        tips.push(if rate >= 70.0 {
            format!("Strong combat performance - {pct}% success rate in enemy encounters.")
        } else if rate >= 50.0 {
            format!("Decent combat performance ({pct}% success rate) - focus on positioning and crosshair placement.")
        } else {
            format!("Low combat success rate ({pct}%) - work on pre-aiming common angles and reaction drills.")
        });
    }

    if fps < 60.0 && reaction > 250.0 {
        tips.push("Both system and skills need attention - start by optimizing settings, then practice aim training.".to_string());
    } else if fps < 60.0 {
        tips.push("Your skills are solid, but your system is the main bottleneck - prioritize hardware upgrades.".to_string());
    } else if reaction > 250.0 {
        tips.push("Your system is fine - focus on consistent practice and aim training to improve reaction time.".to_string());
    }

    tips
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(fps: f64, stability: f64, reaction_ms: f64) -> CoachingInputs {
        CoachingInputs {
            fps,
            stability,
            reaction_ms,
            performance_score: 80.0,
            encounters: 0,
            eliminations: 0,
        }
    }

    #[test]
    fn test_reaction_rank_lower_is_better() {
        let table = GamePreset::Valorant.reaction_time();
        assert_eq!(rank(150.0, &table, true).percentile, "Top 1%");
        assert_eq!(rank(181.0, &table, true).percentile, "Top 25%");
        assert_eq!(rank(250.0, &table, true).rank, 60);
        assert_eq!(rank(251.0, &table, true).color, "gray");
    }

    #[test]
    fn test_fps_rank_higher_is_better() {
        let table = GamePreset::Valorant.fps();
        assert_eq!(rank(240.0, &table, false).percentile, "Top 1%");
        assert_eq!(rank(144.0, &table, false).percentile, "Top 10%");
        assert_eq!(rank(30.0, &table, false).percentile, "Below Average");
    }

    #[test]
    fn test_verdict_order() {
        assert_eq!(verdict(&inputs(60.0, 90.0, 200.0)).kind, VerdictKind::Excellent);
        assert_eq!(verdict(&inputs(60.0, 90.0, 300.0)).kind, VerdictKind::NeedsWork);
        assert_eq!(verdict(&inputs(30.0, 90.0, 200.0)).kind, VerdictKind::Upgrade);
        assert_eq!(verdict(&inputs(60.0, 50.0, 200.0)).kind, VerdictKind::Upgrade);
        assert_eq!(verdict(&inputs(60.0, 90.0, 240.0)).kind, VerdictKind::Good);
    }

    #[test]
    fn test_tips() {
        let t = tips(&inputs(30.0, 40.0, 300.0));
        assert_eq!(t.len(), 4);
        assert!(t[0].starts_with("Reaction time needs work"));
        assert!(t[3].starts_with("Both system and skills"));

        let mut with_combat = inputs(144.0, 90.0, 170.0);
        with_combat.encounters = 3;
        with_combat.eliminations = 2;
        let t = tips(&with_combat);
        assert_eq!(t.len(), 4);
        assert!(t[3].contains("66% success rate"));
    }
}
