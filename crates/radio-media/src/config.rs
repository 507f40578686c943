//! Encoder configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MediaError, MediaResult};

/// Encoder and supervisor configuration.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    /// Encoder binary name or path
    pub binary: String,
    /// Streaming endpoint the encoder pushes to (e.g. icecast://source:pw@host:8000/live)
    pub stream_target: Option<String>,
    /// Manifest file the encoder reads
    pub manifest_path: Option<PathBuf>,
    pub audio_codec: String,
    pub audio_bitrate: String,
    pub sample_rate: u32,
    /// Output container format
    pub format: String,
    pub content_type: String,
    /// Encoder log level
    pub log_level: String,
    /// Delay before restarting after an unexpected exit
    pub restart_backoff: Duration,
    /// How long to wait for a graceful exit before killing
    pub stop_timeout: Duration,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
            stream_target: None,
            manifest_path: Some(PathBuf::from("playlist.txt")),
            audio_codec: "libmp3lame".to_string(),
            audio_bitrate: "128k".to_string(),
            sample_rate: 44100,
            format: "mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            log_level: "error".to_string(),
            restart_backoff: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(10),
        }
    }
}

impl EncoderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            binary: std::env::var("ENCODER_BIN").unwrap_or_else(|_| "ffmpeg".to_string()),
            stream_target: std::env::var("STREAM_TARGET_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            manifest_path: Some(
                std::env::var("MANIFEST_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("playlist.txt")),
            ),
            audio_codec: std::env::var("ENCODER_AUDIO_CODEC")
                .unwrap_or_else(|_| "libmp3lame".to_string()),
            audio_bitrate: std::env::var("ENCODER_AUDIO_BITRATE")
                .unwrap_or_else(|_| "128k".to_string()),
            sample_rate: std::env::var("ENCODER_SAMPLE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(44100),
            format: std::env::var("ENCODER_FORMAT").unwrap_or_else(|_| "mp3".to_string()),
            content_type: std::env::var("ENCODER_CONTENT_TYPE")
                .unwrap_or_else(|_| "audio/mpeg".to_string()),
            log_level: std::env::var("ENCODER_LOG_LEVEL").unwrap_or_else(|_| "error".to_string()),
            restart_backoff: Duration::from_millis(
                std::env::var("ENCODER_RESTART_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            ),
            stop_timeout: Duration::from_secs(
                std::env::var("ENCODER_STOP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
        }
    }

    /// Manifest path, or a configuration error when unset.
    pub fn manifest_path(&self) -> MediaResult<&Path> {
        self.manifest_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| MediaError::configuration("manifest path is not set"))
    }

    /// Streaming endpoint, or a configuration error when unset.
    pub fn stream_target(&self) -> MediaResult<&str> {
        self.stream_target
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| MediaError::configuration("stream target URL is not set"))
    }

    /// Everything `start()` needs, validated.
    pub fn launch_target(&self) -> MediaResult<(&Path, &str)> {
        let endpoint = self.stream_target()?;
        let manifest = self.manifest_path()?;
        Ok((manifest, endpoint))
    }
}
