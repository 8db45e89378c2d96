//! Analysis job: one pass, one JSON report.

use std::path::PathBuf;
use std::time::Instant;

use lagskill_media::{AnalysisPipeline, FfmpegFrameWriter, FrameSink, FrameSource, PersonDetector};
use lagskill_models::{AnalysisReport, GamePreset, RunId};
use tracing::{info, Instrument};

use super::{analyze_blocking, file_name, load_inputs, write_json};
use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::logging::RunLogger;
use crate::metrics;
use crate::report::{build_analysis_report, ReportOptions};

const OPERATION: &str = "analyze";

#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub video: PathBuf,
    pub detections: PathBuf,
    /// Falls back to the configured default preset
    pub preset: Option<GamePreset>,
    /// Falls back to the configured annotation toggle
    pub annotate: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct AnalyzeOutput {
    pub run_id: RunId,
    pub report: AnalysisReport,
    pub report_path: PathBuf,
}

/// Annotated copy of the analyzed video.
pub struct AnnotatedOutput {
    pub sink: Box<dyn FrameSink>,
    /// File name recorded in the report
    pub name: String,
}

/// Analyze a video file with its detection log.
pub async fn run_analysis(config: &WorkerConfig, req: AnalyzeRequest) -> WorkerResult<AnalyzeOutput> {
    let run_id = RunId::new();
    let logger = RunLogger::new(&run_id, OPERATION);
    let span = logger.create_span();

    let result = async {
        logger.log_start(&req.video.display().to_string());
        let inputs = load_inputs(&req.video, &req.detections).await?;
        tokio::fs::create_dir_all(&config.output_dir).await?;

        let annotated = if req.annotate.unwrap_or(config.annotate) {
            let name = format!("annotated_{}.mp4", run_id);
            let info = inputs.source.info();
            let fps = info.effective_fps(config.engine_config().fallback_fps);
            let writer = FfmpegFrameWriter::create(
                config.output_dir.join(&name),
                info.width,
                info.height,
                fps,
            )?;
            logger.log_progress(&format!("writing annotated video {}", name));
            Some(AnnotatedOutput {
                sink: Box::new(writer),
                name,
            })
        } else {
            None
        };

        analyze_source(
            config,
            &run_id,
            &file_name(&req.video),
            req.preset.unwrap_or(config.default_preset),
            inputs.source,
            inputs.detector,
            annotated,
        )
        .await
    }
    .instrument(span)
    .await;

    match &result {
        Ok(output) => logger.log_completion(&format!(
            "{} frames, report at {}",
            output.report.total_frames,
            output.report_path.display()
        )),
        Err(e) => {
            logger.log_error(&e.to_string());
            metrics::record_run_failed(OPERATION, e);
        }
    }
    result
}

/// Analyze an already opened source and write the report.
pub async fn analyze_source(
    config: &WorkerConfig,
    run_id: &RunId,
    filename: &str,
    preset: GamePreset,
    source: Box<dyn FrameSource>,
    detector: Box<dyn PersonDetector>,
    annotated: Option<AnnotatedOutput>,
) -> WorkerResult<AnalyzeOutput> {
    let pipeline = AnalysisPipeline::new(config.engine_config());
    let (sink, annotated_name) = match annotated {
        Some(a) => (Some(a.sink), Some(a.name)),
        None => (None, None),
    };

    let started = Instant::now();
    let (result, _source) = analyze_blocking(pipeline, source, detector, sink).await?;
    let elapsed = started.elapsed().as_secs_f64();
    metrics::record_analysis(OPERATION, result.metrics.total_frames, elapsed);

    let report = build_analysis_report(
        &result,
        &ReportOptions {
            run_id: run_id.clone(),
            filename: filename.to_string(),
            preset,
            annotated_video: annotated_name,
            timeline_cap: config.timeline_cap,
            summary_cap: config.summary_cap,
        },
    );

    let report_path = config.output_dir.join(format!("analysis_{}.json", run_id));
    write_json(&report_path, &report).await?;
    metrics::record_run_completed(OPERATION);

    info!(
        run_id = %run_id,
        frames = report.total_frames,
        player_detected = report.player_detected,
        encounters = report.sudden_enemy_encounters,
        eliminations = report.successful_eliminations,
        elapsed_secs = elapsed,
        "Analysis report written"
    );

    Ok(AnalyzeOutput {
        run_id: run_id.clone(),
        report,
        report_path,
    })
}
