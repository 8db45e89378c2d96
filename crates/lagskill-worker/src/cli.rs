//! Command-line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use lagskill_models::GamePreset;

#[derive(Debug, Parser)]
#[command(name = "lagskill-worker")]
#[command(about = "Gameplay analysis and highlight reels", long_about = None)]
pub struct Cli {
    /// Output directory (overrides LAGSKILL_OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a gameplay video and write a JSON report
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Also write an annotated copy of the video
        #[arg(long)]
        annotate: bool,
    },
    /// Analyze a video and compose its highlight reel
    Highlights {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the JSON schemas of the report formats
    Schema,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Gameplay video
    pub video: PathBuf,

    /// Detection log JSON for the video
    #[arg(short, long)]
    pub detections: PathBuf,

    /// Benchmark preset: valorant, csgo or bgmi
    #[arg(short, long)]
    pub preset: Option<String>,
}

impl InputArgs {
    pub fn game_preset(&self) -> Option<GamePreset> {
        self.preset.as_deref().map(GamePreset::parse_or_default)
    }
}
