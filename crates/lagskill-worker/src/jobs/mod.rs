//! Analysis and highlight jobs.
//!
//! Each job runs one single-pass engine run on a blocking thread; the async
//! side only loads inputs and writes outputs.

pub mod analyze;
pub mod highlights;

use std::path::Path;

use lagskill_media::{
    probe_video, AnalysisPipeline, AnalysisResult, DetectionLog, FfmpegFrameReader, FrameSink,
    FrameSource, PersonDetector, VideoInfo,
};
use serde::Serialize;
use tracing::warn;

use crate::error::{WorkerError, WorkerResult};

pub use analyze::{run_analysis, AnalyzeOutput, AnalyzeRequest};
pub use highlights::{run_highlights, HighlightsOutput, HighlightsRequest};

/// Decoded video plus its replayed detections.
pub struct JobInputs {
    pub video: VideoInfo,
    pub source: Box<dyn FrameSource>,
    pub detector: Box<dyn PersonDetector>,
}

/// Probe the video, load the detection log and open a frame reader.
pub async fn load_inputs(video: &Path, detections: &Path) -> WorkerResult<JobInputs> {
    if !video.exists() {
        return Err(WorkerError::input_not_found(video.display().to_string()));
    }
    if !detections.exists() {
        return Err(WorkerError::input_not_found(detections.display().to_string()));
    }

    let info = probe_video(video).await?;
    let log = DetectionLog::load(detections).await?;
    if let (Some(last), true) = (log.last_frame_index(), info.frame_count > 0) {
        if last + 1 < info.frame_count {
            warn!(
                last_logged_frame = last,
                frame_count = info.frame_count,
                "Detection log ends before the video"
            );
        }
    }

    let path = video.to_path_buf();
    let probe = info.clone();
    let reader = run_blocking(move || Ok(FfmpegFrameReader::open(path, &probe)?)).await?;

    Ok(JobInputs {
        video: info,
        source: Box::new(reader),
        detector: Box::new(log),
    })
}

/// Run a blocking closure on the blocking pool.
pub async fn run_blocking<T, F>(f: F) -> WorkerResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> WorkerResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| WorkerError::job_failed(format!("blocking task failed: {}", e)))?
}

/// One analysis pass on a blocking thread. Returns the source for reuse.
pub async fn analyze_blocking(
    pipeline: AnalysisPipeline,
    mut source: Box<dyn FrameSource>,
    mut detector: Box<dyn PersonDetector>,
    mut annotated: Option<Box<dyn FrameSink>>,
) -> WorkerResult<(AnalysisResult, Box<dyn FrameSource>)> {
    run_blocking(move || {
        let sink = annotated.as_deref_mut().map(|s| s as &mut dyn FrameSink);
        let result = pipeline.analyze(source.as_mut(), detector.as_mut(), sink)?;
        Ok((result, source))
    })
    .await
}

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> WorkerResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

/// Display name of an input file.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
