//! Highlight reel job: analysis pass, moment selection, reel composition.

use std::path::PathBuf;
use std::time::Instant;

use lagskill_media::{
    AnalysisPipeline, AnalysisResult, FfmpegFrameWriter, FrameSink, FrameSource, HighlightOutcome,
    MediaResult, PersonDetector, SourceInfo,
};
use lagskill_models::{GamePreset, HighlightMoment, HighlightReelReport, ReelId, RunId};
use tracing::{info, warn, Instrument};

use super::{file_name, load_inputs, run_blocking, write_json};
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::RunLogger;
use crate::metrics;
use crate::report::{build_analysis_report, build_reel_report, ReportOptions};

const OPERATION: &str = "highlights";

#[derive(Debug, Clone)]
pub struct HighlightsRequest {
    pub video: PathBuf,
    pub detections: PathBuf,
    pub preset: Option<GamePreset>,
}

#[derive(Debug, Clone)]
pub struct HighlightsOutput {
    pub run_id: RunId,
    pub report: HighlightReelReport,
    pub report_path: PathBuf,
    pub moments: Vec<HighlightMoment>,
}

/// Build a highlight reel from a video file and its detection log.
pub async fn run_highlights(
    config: &WorkerConfig,
    req: HighlightsRequest,
) -> WorkerResult<HighlightsOutput> {
    let run_id = RunId::new();
    let logger = RunLogger::new(&run_id, OPERATION);
    let span = logger.create_span();

    let result = async {
        logger.log_start(&req.video.display().to_string());
        let inputs = load_inputs(&req.video, &req.detections).await?;
        tokio::fs::create_dir_all(&config.output_dir).await?;

        let reel_id = ReelId::new();
        let reel_path = config.output_dir.join(reel_id.video_filename());
        let fallback_fps = config.engine_config().fallback_fps;

        highlight_source(
            config,
            &run_id,
            reel_id,
            &file_name(&req.video),
            req.preset.unwrap_or(config.default_preset),
            inputs.source,
            inputs.detector,
            move |info: &SourceInfo| {
                FfmpegFrameWriter::create(
                    &reel_path,
                    info.width,
                    info.height,
                    info.effective_fps(fallback_fps),
                )
            },
        )
        .await
    }
    .instrument(span)
    .await;

    match &result {
        Ok(output) => logger.log_completion(&format!(
            "{} highlights, report at {}",
            output.moments.len(),
            output.report_path.display()
        )),
        Err(e) => {
            logger.log_error(&e.to_string());
            metrics::record_run_failed(OPERATION, e);
        }
    }
    result
}

/// Analyze an opened source, then select and compose its highlights.
///
/// A composition failure still writes the analysis report before failing
/// the run.
#[allow(clippy::too_many_arguments)]
pub async fn highlight_source<S, F>(
    config: &WorkerConfig,
    run_id: &RunId,
    reel_id: ReelId,
    filename: &str,
    preset: GamePreset,
    mut source: Box<dyn FrameSource>,
    mut detector: Box<dyn PersonDetector>,
    open_sink: F,
) -> WorkerResult<HighlightsOutput>
where
    S: FrameSink + 'static,
    F: FnOnce(&SourceInfo) -> MediaResult<S> + Send + 'static,
{
    let pipeline = AnalysisPipeline::new(config.engine_config());
    let started = Instant::now();

    let (analysis, composed): (AnalysisResult, MediaResult<HighlightOutcome>) =
        run_blocking(move || {
            let analysis = pipeline.analyze(source.as_mut(), detector.as_mut(), None)?;
            let composed = pipeline.compose_highlights(&analysis, source.as_mut(), open_sink);
            Ok((analysis, composed))
        })
        .await?;

    let elapsed = started.elapsed().as_secs_f64();
    metrics::record_analysis(OPERATION, analysis.metrics.total_frames, elapsed);

    let outcome = match composed {
        Ok(outcome) => outcome,
        Err(e) => {
            let report = build_analysis_report(
                &analysis,
                &ReportOptions {
                    run_id: run_id.clone(),
                    filename: filename.to_string(),
                    preset,
                    annotated_video: None,
                    timeline_cap: config.timeline_cap,
                    summary_cap: config.summary_cap,
                },
            );
            let path = config.output_dir.join(format!("analysis_{}.json", run_id));
            write_json(&path, &report).await?;
            warn!(
                run_id = %run_id,
                error = %e,
                analysis_report = %path.display(),
                "Composition failed, analysis report kept"
            );
            return Err(WorkerError::composition_failed(e.to_string()));
        }
    };

    metrics::record_highlights(outcome.moments.len());
    let report = build_reel_report(run_id.clone(), reel_id, filename, &outcome);
    let report_path = config.output_dir.join(format!("highlights_{}.json", run_id));
    write_json(&report_path, &report).await?;
    metrics::record_run_completed(OPERATION);

    info!(
        run_id = %run_id,
        highlights = outcome.moments.len(),
        reel_frames = outcome.composition.map(|c| c.total_frames()).unwrap_or(0),
        elapsed_secs = elapsed,
        "Highlight report written"
    );

    Ok(HighlightsOutput {
        run_id: run_id.clone(),
        report,
        report_path,
        moments: outcome.moments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagskill_media::{DetectionLog, LoggedFrame, MediaError, MemoryFrameSink, MemoryFrameSource};
    use lagskill_models::{BoundingBox, Detection};

    fn config(dir: &std::path::Path) -> WorkerConfig {
        WorkerConfig {
            output_dir: dir.to_path_buf(),
            ..WorkerConfig::default()
        }
    }

    /// Three people on screen for the whole video.
    fn crowded_log(frames: u64) -> DetectionLog {
        let people: Vec<Detection> = [15.0, 48.0, 80.0]
            .iter()
            .map(|&cx| Detection::person(0.9, BoundingBox::centered(cx, 20.0, 10.0, 20.0)))
            .collect();
        DetectionLog::from_frames(
            (0..frames)
                .map(|frame_index| LoggedFrame {
                    frame_index,
                    detections: people.clone(),
                })
                .collect(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_quiet_video_reports_no_highlights() {
        let dir = tempfile::tempdir().unwrap();
        let output = highlight_source(
            &config(dir.path()),
            &RunId::from_string("run-q"),
            ReelId::new(),
            "quiet.mp4",
            GamePreset::Valorant,
            Box::new(MemoryFrameSource::solid(60, 32, 32, 30.0, [0, 0, 0])),
            Box::new(DetectionLog::from_frames(Vec::new()).unwrap()),
            |_: &SourceInfo| -> MediaResult<MemoryFrameSink> {
                panic!("sink must not be opened")
            },
        )
        .await
        .unwrap();

        assert!(output.moments.is_empty());
        assert!(!output.report.is_success());
        let json: serde_json::Value = serde_json::from_str(
            &tokio::fs::read_to_string(dir.path().join("highlights_run-q.json"))
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(json["status"], "no_highlights");
    }

    #[tokio::test]
    async fn test_crowded_video_composes_reel() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryFrameSink::new(96, 64);
        let handle = sink.clone();

        let output = highlight_source(
            &config(dir.path()),
            &RunId::new(),
            ReelId::from_string("reel-x"),
            "crowded.mp4",
            GamePreset::Valorant,
            Box::new(MemoryFrameSource::solid(600, 96, 64, 30.0, [40, 40, 40])),
            Box::new(crowded_log(600)),
            move |_: &SourceInfo| Ok(sink),
        )
        .await
        .unwrap();

        assert!(!output.moments.is_empty());
        match &output.report {
            HighlightReelReport::Success {
                highlight_video,
                num_highlights,
                ..
            } => {
                assert_eq!(highlight_video, "highlights_reel-x.mp4");
                assert_eq!(*num_highlights, output.moments.len());
            }
            other => panic!("unexpected report: {other:?}"),
        }
        assert_eq!(output.moments.len(), 4);
        assert!(handle.is_finished());
        assert_eq!(handle.frames().len(), 525);
    }

    #[tokio::test]
    async fn test_composition_failure_keeps_analysis_report() {
        let dir = tempfile::tempdir().unwrap();
        let err = highlight_source(
            &config(dir.path()),
            &RunId::from_string("run-f"),
            ReelId::new(),
            "crowded.mp4",
            GamePreset::Valorant,
            Box::new(MemoryFrameSource::solid(600, 96, 64, 30.0, [40, 40, 40])),
            Box::new(crowded_log(600)),
            |_: &SourceInfo| -> MediaResult<MemoryFrameSink> {
                Err(MediaError::sink_failed("disk full"))
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, WorkerError::CompositionFailed(_)));
        assert!(dir.path().join("analysis_run-f.json").exists());
        assert!(!dir.path().join("highlights_run-f.json").exists());
    }
}
