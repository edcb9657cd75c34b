// Audio extraction
// Decodes the audio track of a video container through an ffmpeg subprocess

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

use super::ingest::AudioSignal;

/// Sample rate the capture videos are decoded at
pub const DEFAULT_DECODE_SAMPLE_RATE: u32 = 44100;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Source video not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("Invalid decoded stream: {0}")]
    InvalidStream(String),
}

/// Turns a video container into mono audio
pub trait AudioDecoder {
    fn decode(&self, video_path: &Path) -> Result<AudioSignal, DecodeError>;
}

/// Decoder backed by the `ffmpeg` binary
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    /// Program to invoke, usually just "ffmpeg" on PATH
    program: PathBuf,

    /// Output sample rate in Hz
    sample_rate: u32,
}

impl FfmpegDecoder {
    pub fn new(program: impl Into<PathBuf>, sample_rate: u32) -> Self {
        FfmpegDecoder {
            program: program.into(),
            sample_rate,
        }
    }
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new("ffmpeg", DEFAULT_DECODE_SAMPLE_RATE)
    }
}

impl AudioDecoder for FfmpegDecoder {
    fn decode(&self, video_path: &Path) -> Result<AudioSignal, DecodeError> {
        if !video_path.exists() {
            return Err(DecodeError::SourceNotFound(video_path.to_path_buf()));
        }

        // Mono, fixed rate, raw f32 little endian on stdout
        let mut cmd = Command::new(&self.program);
        cmd.arg("-nostdin")
            .arg("-i")
            .arg(video_path)
            .arg("-vn")
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-f")
            .arg("f32le")
            .arg("-acodec")
            .arg("pcm_f32le")
            .arg("pipe:1");

        cmd.stdin(Stdio::null())
            .stderr(Stdio::null())
            .stdout(Stdio::piped());

        log::debug!("Running FFmpeg: {:?}", cmd);

        let mut child = cmd
            .spawn()
            .map_err(|e| DecodeError::Ffmpeg(format!("Failed to spawn FFmpeg: {}", e)))?;

        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| DecodeError::Ffmpeg("Failed to capture FFmpeg stdout".to_string()))?;

        let mut buffer = Vec::new();
        stdout
            .read_to_end(&mut buffer)
            .map_err(|e| DecodeError::Ffmpeg(format!("Failed to read FFmpeg output: {}", e)))?;

        let status = child
            .wait()
            .map_err(|e| DecodeError::Ffmpeg(format!("FFmpeg process error: {}", e)))?;

        if !status.success() {
            return Err(DecodeError::Ffmpeg(format!(
                "FFmpeg exited with code: {:?}",
                status.code()
            )));
        }

        let samples = bytes_to_f32_samples(&buffer)?;

        log::debug!(
            "Decoded {} samples ({:.2}s) from {}",
            samples.len(),
            samples.len() as f64 / self.sample_rate as f64,
            video_path.display()
        );

        Ok(AudioSignal::new(samples, self.sample_rate))
    }
}

/// Convert raw little-endian f32 bytes into samples
fn bytes_to_f32_samples(bytes: &[u8]) -> Result<Vec<f32>, DecodeError> {
    if bytes.len() % 4 != 0 {
        return Err(DecodeError::InvalidStream(format!(
            "{} bytes is not a whole number of f32 samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}
