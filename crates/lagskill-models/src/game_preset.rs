//! Game presets and their community benchmark tables.
//!
//! Each preset carries thresholds for three metrics:
//!
//! - reaction time (milliseconds, lower is better)
//! - video fps (higher is better)
//! - performance score (higher is better)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Game the footage was recorded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum GamePreset {
    #[default]
    Valorant,
    Csgo,
    Bgmi,
}

/// Threshold ladder for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BenchmarkTable {
    pub avg: f64,
    pub top25: f64,
    pub top10: f64,
    pub top1: f64,
}

impl BenchmarkTable {
    const fn new(avg: f64, top25: f64, top10: f64, top1: f64) -> Self {
        Self {
            avg,
            top25,
            top10,
            top1,
        }
    }
}

impl GamePreset {
    pub const ALL: &'static [GamePreset] = &[GamePreset::Valorant, GamePreset::Csgo, GamePreset::Bgmi];

    pub fn as_str(&self) -> &'static str {
        match self {
            GamePreset::Valorant => "valorant",
            GamePreset::Csgo => "csgo",
            GamePreset::Bgmi => "bgmi",
        }
    }

    /// Parse a preset name, falling back to the default for unknown names.
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    pub fn reaction_time(&self) -> BenchmarkTable {
        match self {
            GamePreset::Valorant => BenchmarkTable::new(250.0, 210.0, 180.0, 150.0),
            GamePreset::Csgo => BenchmarkTable::new(240.0, 200.0, 170.0, 140.0),
            GamePreset::Bgmi => BenchmarkTable::new(280.0, 240.0, 200.0, 160.0),
        }
    }

    pub fn fps(&self) -> BenchmarkTable {
        match self {
            GamePreset::Valorant => BenchmarkTable::new(60.0, 90.0, 144.0, 240.0),
            GamePreset::Csgo => BenchmarkTable::new(80.0, 120.0, 200.0, 300.0),
            GamePreset::Bgmi => BenchmarkTable::new(45.0, 60.0, 90.0, 120.0),
        }
    }

    pub fn performance(&self) -> BenchmarkTable {
        match self {
            GamePreset::Valorant => BenchmarkTable::new(60.0, 75.0, 85.0, 95.0),
            GamePreset::Csgo => BenchmarkTable::new(65.0, 78.0, 88.0, 96.0),
            GamePreset::Bgmi => BenchmarkTable::new(55.0, 70.0, 82.0, 93.0),
        }
    }
}

impl fmt::Display for GamePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GamePreset {
    type Err = GamePresetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "valorant" => Ok(GamePreset::Valorant),
            "csgo" | "cs2" | "cs" => Ok(GamePreset::Csgo),
            "bgmi" | "pubg" => Ok(GamePreset::Bgmi),
            _ => Err(GamePresetParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown game preset: {0}")]
pub struct GamePresetParseError(String);
