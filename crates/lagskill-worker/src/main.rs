//! Gameplay analysis worker binary.

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lagskill_models::{AnalysisReport, HighlightReelReport};
use lagskill_worker::cli::{Cli, Command};
use lagskill_worker::{
    metrics, run_analysis, run_highlights, AnalyzeRequest, HighlightsRequest, WorkerConfig,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let mut env_filter = EnvFilter::from_default_env();
    if let Ok(directive) = "lagskill=info".parse() {
        env_filter = env_filter.add_directive(directive);
    }

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = WorkerConfig::from_env().context("loading worker config")?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    match cli.command {
        Command::Schema => {
            let schemas = serde_json::json!({
                "analysis_report": schemars::schema_for!(AnalysisReport),
                "highlight_reel_report": schemars::schema_for!(HighlightReelReport),
            });
            println!("{}", serde_json::to_string_pretty(&schemas)?);
            return Ok(());
        }
        Command::Analyze { .. } | Command::Highlights { .. } => {}
    }

    info!("Starting lagskill-worker");
    info!("Worker config: {:?}", config);

    if let Some(addr) = config.metrics_addr {
        metrics::init_metrics(addr).context("starting metrics exporter")?;
        info!(%addr, "Metrics exporter listening");
    }

    match cli.command {
        Command::Analyze { input, annotate } => {
            let preset = input.game_preset();
            let output = run_analysis(
                &config,
                AnalyzeRequest {
                    video: input.video,
                    detections: input.detections,
                    preset,
                    annotate: annotate.then_some(true),
                },
            )
            .await
            .context("analysis failed")?;
            println!("{}", output.report_path.display());
        }
        Command::Highlights { input } => {
            let preset = input.game_preset();
            let output = run_highlights(
                &config,
                HighlightsRequest {
                    video: input.video,
                    detections: input.detections,
                    preset,
                },
            )
            .await
            .context("highlight reel failed")?;
            println!("{}", output.report_path.display());
        }
        Command::Schema => {}
    }

    Ok(())
}
