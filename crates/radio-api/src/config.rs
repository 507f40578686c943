//! API and playback configuration.

use std::path::PathBuf;
use std::time::Duration;

use radio_models::{PlaybackMode, PlaybackModeParseError};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second, per client IP
    pub rate_limit_rps: u32,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Shared secret expected in `x-api-key`; admin routes are closed when unset
    pub admin_api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            request_timeout: Duration::from_secs(30),
            max_body_size: 1024 * 1024, // 1MB
            environment: "development".to_string(),
            admin_api_key: None,
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            admin_api_key: std::env::var("ADMIN_API_KEY")
                .ok()
                .filter(|s| !s.is_empty()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

/// How the station builds its manifest and where it keeps audio.
#[derive(Debug, Clone)]
pub struct RadioConfig {
    pub mode: PlaybackMode,
    /// Authoritative remote manifest
    pub remote_manifest_url: Option<String>,
    /// Persistent download cache, absolute
    pub cache_dir: PathBuf,
    /// JSON file backing the playlist store; in-memory when unset
    pub playlist_store_path: Option<PathBuf>,
    /// Start the encoder at boot
    pub autostart: bool,
    /// Delay between stopping and restarting the encoder on a manifest change
    pub restart_delay: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            mode: PlaybackMode::default(),
            remote_manifest_url: None,
            cache_dir: absolute(PathBuf::from("cache")),
            playlist_store_path: None,
            autostart: true,
            restart_delay: Duration::from_millis(1000),
        }
    }
}

impl RadioConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Result<Self, PlaybackModeParseError> {
        let mode = match std::env::var("PLAYBACK_MODE") {
            Ok(s) if !s.trim().is_empty() => s.parse()?,
            _ => PlaybackMode::default(),
        };

        Ok(Self {
            mode,
            remote_manifest_url: std::env::var("REMOTE_MANIFEST_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            cache_dir: absolute(
                std::env::var("CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("cache")),
            ),
            playlist_store_path: std::env::var("PLAYLIST_STORE_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            autostart: std::env::var("AUTOSTART")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            restart_delay: Duration::from_millis(
                std::env::var("RESTART_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            ),
        })
    }
}

/// Manifest entries must not depend on the encoder's working directory.
fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
