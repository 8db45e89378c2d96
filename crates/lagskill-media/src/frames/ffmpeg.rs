//! Raw RGB24 frame I/O through FFmpeg pipes.

use std::io::{BufReader, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout};

use image::RgbImage;
use tracing::{debug, warn};

use super::{ensure_frame_size, FrameSink, FrameSource, SourceInfo};
use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::probe::VideoInfo;

/// Decodes a video file into RGB frames via `ffmpeg ... -f rawvideo pipe:1`.
pub struct FfmpegFrameReader {
    path: PathBuf,
    info: SourceInfo,
    child: Option<Child>,
    stdout: Option<BufReader<ChildStdout>>,
    frame_bytes: usize,
}

impl FfmpegFrameReader {
    /// Open a reader positioned at frame 0.
    pub fn open(path: impl AsRef<Path>, video: &VideoInfo) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(MediaError::FileNotFound(path));
        }
        if video.width == 0 || video.height == 0 {
            return Err(MediaError::InvalidVideo(format!(
                "{} has no frame dimensions",
                path.display()
            )));
        }

        let info = SourceInfo::new(video.width, video.height, video.fps)
            .with_frame_count(video.frame_count);
        let frame_bytes = video.width as usize * video.height as usize * 3;

        let mut reader = Self {
            path,
            info,
            child: None,
            stdout: None,
            frame_bytes,
        };
        reader.spawn_at(0)?;
        Ok(reader)
    }

    fn spawn_at(&mut self, frame_index: u64) -> MediaResult<()> {
        self.stop();

        let mut cmd = FfmpegCommand::decode_to_pipe(&self.path);
        let mut skip = 0u64;
        if frame_index > 0 {
            if self.info.fps > 0.0 {
                cmd = cmd.seek(frame_index as f64 / self.info.fps);
            } else {
                // No time base to seek with; decode from the start and discard
                skip = frame_index;
            }
        }
        let cmd = cmd.raw_rgb_output();

        debug!(
            path = %self.path.display(),
            frame_index,
            "Starting FFmpeg decoder"
        );

        let mut child = cmd.to_command()?.spawn().map_err(|e| {
            MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None)
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;

        self.child = Some(child);
        self.stdout = Some(BufReader::new(stdout));

        for _ in 0..skip {
            if self.read_frame()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Reap the decoder once its output is exhausted.
    fn finish_stream(&mut self) -> MediaResult<()> {
        self.stdout = None;
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(MediaError::ffmpeg_failed(
                    "FFmpeg decoder exited with non-zero status",
                    None,
                    status.code(),
                ));
            }
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameReader {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn read_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut buf = vec![0u8; self.frame_bytes];
        match stdout.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                self.finish_stream()?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        RgbImage::from_raw(self.info.width, self.info.height, buf)
            .map(Some)
            .ok_or_else(|| MediaError::internal("raw frame buffer has wrong length"))
    }

    fn seek(&mut self, frame_index: u64) -> MediaResult<()> {
        self.spawn_at(frame_index)
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Encodes RGB frames written to stdin into an H.264 MP4 file.
pub struct FfmpegFrameWriter {
    path: PathBuf,
    width: u32,
    height: u32,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    written: u64,
}

impl FfmpegFrameWriter {
    /// Spawn the encoder. The output file is overwritten.
    pub fn create(path: impl AsRef<Path>, width: u32, height: u32, fps: f64) -> MediaResult<Self> {
        let path = path.as_ref().to_path_buf();
        if width == 0 || height == 0 {
            return Err(MediaError::sink_failed("cannot encode zero-sized frames"));
        }

        let cmd = FfmpegCommand::encode_from_pipe(&path)
            .raw_rgb_input(width, height, fps)
            .video_codec("libx264")
            .preset("veryfast")
            .crf(20)
            .output_args(["-pix_fmt", "yuv420p", "-movflags", "+faststart"]);

        let mut child = cmd.to_command()?.spawn().map_err(|e| {
            MediaError::sink_failed(format!("Failed to spawn FFmpeg encoder: {}", e))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaError::sink_failed("Failed to capture FFmpeg stdin"))?;

        debug!(path = %path.display(), width, height, fps, "Started FFmpeg encoder");

        Ok(Self {
            path,
            width,
            height,
            child: Some(child),
            stdin: Some(stdin),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for FfmpegFrameWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> MediaResult<()> {
        ensure_frame_size(self.written, frame, self.width, self.height)?;
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| MediaError::sink_failed("encoder already finished"))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| MediaError::sink_failed(format!("FFmpeg encoder pipe: {}", e)))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> MediaResult<()> {
        // Closing stdin signals end of input
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            let status = child.wait()?;
            if !status.success() {
                return Err(MediaError::ffmpeg_failed(
                    format!("FFmpeg encoder failed for {}", self.path.display()),
                    None,
                    status.code(),
                ));
            }
        }
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}

impl Drop for FfmpegFrameWriter {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!(path = %self.path.display(), "Encoder dropped before finish, killing FFmpeg");
            self.stdin = None;
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
