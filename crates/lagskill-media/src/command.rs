//! FFmpeg command builder for raw-frame pipes.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{MediaError, MediaResult};

/// Input or output endpoint of an FFmpeg invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    File(PathBuf),
    /// `pipe:0` for input, `pipe:1` for output
    Pipe,
}

impl Endpoint {
    fn input_arg(&self) -> String {
        match self {
            Endpoint::File(p) => p.to_string_lossy().to_string(),
            Endpoint::Pipe => "pipe:0".to_string(),
        }
    }

    fn output_arg(&self) -> String {
        match self {
            Endpoint::File(p) => p.to_string_lossy().to_string(),
            Endpoint::Pipe => "pipe:1".to_string(),
        }
    }
}

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: Endpoint,
    output: Endpoint,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    overwrite: bool,
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: Endpoint, output: Endpoint) -> Self {
        Self {
            input,
            output,
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Decode a video file to raw frames on stdout.
    pub fn decode_to_pipe(input: impl AsRef<Path>) -> Self {
        Self::new(Endpoint::File(input.as_ref().to_path_buf()), Endpoint::Pipe)
    }

    /// Encode raw frames from stdin into a file.
    pub fn encode_from_pipe(output: impl AsRef<Path>) -> Self {
        Self::new(Endpoint::Pipe, Endpoint::File(output.as_ref().to_path_buf()))
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position (before input).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format!("{:.3}", seconds))
    }

    /// Describe raw RGB24 frames on the input side.
    pub fn raw_rgb_input(self, width: u32, height: u32, fps: f64) -> Self {
        self.input_arg("-f")
            .input_arg("rawvideo")
            .input_arg("-pix_fmt")
            .input_arg("rgb24")
            .input_arg("-s")
            .input_arg(format!("{}x{}", width, height))
            .input_arg("-r")
            .input_arg(format!("{:.3}", fps))
    }

    /// Emit raw RGB24 frames on the output side.
    pub fn raw_rgb_output(self) -> Self {
        self.output_args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24"])
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.input_arg());

        args.extend(self.output_args.clone());

        args.push(self.output.output_arg());

        args
    }

    /// Build a process with pipes attached to whichever side is `Endpoint::Pipe`.
    ///
    /// Stderr is discarded: a full stderr pipe would stall a long decode.
    pub fn to_command(&self) -> MediaResult<Command> {
        let ffmpeg = check_ffmpeg()?;
        let mut cmd = Command::new(ffmpeg);
        cmd.args(self.build_args());
        cmd.stdin(match self.input {
            Endpoint::Pipe => Stdio::piped(),
            Endpoint::File(_) => Stdio::null(),
        });
        cmd.stdout(match self.output {
            Endpoint::Pipe => Stdio::piped(),
            Endpoint::File(_) => Stdio::null(),
        });
        cmd.stderr(Stdio::null());
        Ok(cmd)
    }
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_args() {
        let cmd = FfmpegCommand::decode_to_pipe("game.mp4")
            .seek(10.0)
            .raw_rgb_output();

        let args = cmd.build_args();
        let ss = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(ss < input);
        assert_eq!(args[ss + 1], "10.000");
        assert_eq!(args[input + 1], "game.mp4");
        assert!(args.contains(&"rgb24".to_string()));
        assert_eq!(args.last().unwrap(), "pipe:1");
        assert!(!args.contains(&"-progress".to_string()));
    }

    #[test]
    fn test_encode_args() {
        let cmd = FfmpegCommand::encode_from_pipe("out.mp4")
            .raw_rgb_input(1280, 720, 30.0)
            .video_codec("libx264")
            .crf(20);

        let args = cmd.build_args();
        let size = args.iter().position(|a| a == "-s").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        assert!(size < input);
        assert_eq!(args[size + 1], "1280x720");
        assert_eq!(args[input + 1], "pipe:0");
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().unwrap(), "out.mp4");
    }
}
