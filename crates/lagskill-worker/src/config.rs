//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use lagskill_media::EngineConfig;
use lagskill_models::GamePreset;

use crate::error::{WorkerError, WorkerResult};

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Directory for reports, annotated videos and reels
    pub output_dir: PathBuf,
    /// Timeline entries kept in a report
    pub timeline_cap: usize,
    /// Encounter and reaction detail rows kept in a report
    pub summary_cap: usize,
    /// Benchmark tables used when a run does not name one
    pub default_preset: GamePreset,
    /// Write an annotated copy of every analyzed video
    pub annotate: bool,
    /// Use the short-form engine preset (shorter clips, tighter merging)
    pub short_form: bool,
    /// Prometheus listener; metrics are disabled when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            timeline_cap: 100,
            summary_cap: 10,
            default_preset: GamePreset::Valorant,
            annotate: false,
            short_form: false,
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        let defaults = Self::default();

        let metrics_addr = match std::env::var("METRICS_ADDR") {
            Ok(s) if !s.trim().is_empty() => Some(s.trim().parse().map_err(|e| {
                WorkerError::config_error(format!("METRICS_ADDR '{}': {}", s, e))
            })?),
            _ => None,
        };

        let config = Self {
            output_dir: std::env::var("LAGSKILL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            timeline_cap: std::env::var("LAGSKILL_TIMELINE_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeline_cap),
            summary_cap: std::env::var("LAGSKILL_SUMMARY_CAP")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.summary_cap),
            default_preset: std::env::var("LAGSKILL_GAME_PRESET")
                .map(|s| GamePreset::parse_or_default(&s))
                .unwrap_or(defaults.default_preset),
            annotate: env_flag("LAGSKILL_ANNOTATE").unwrap_or(defaults.annotate),
            short_form: env_flag("LAGSKILL_SHORT_FORM").unwrap_or(defaults.short_form),
            metrics_addr,
        };
        config
            .engine_config()
            .validate()
            .map_err(WorkerError::config_error)?;
        Ok(config)
    }

    /// Engine tuning for this worker.
    pub fn engine_config(&self) -> EngineConfig {
        if self.short_form {
            EngineConfig::short_form()
        } else {
            EngineConfig::default()
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
