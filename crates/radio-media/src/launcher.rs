//! Encoder process launching.

use std::path::Path;
use std::process::Stdio;

use tokio::process::{Child, Command};
use tracing::debug;

use crate::command::{check_encoder, EncoderCommand};
use crate::config::EncoderConfig;
use crate::error::{MediaError, MediaResult};

/// Spawns the encoder subprocess for a manifest and endpoint.
///
/// The supervisor owns the returned child. Implementations should pipe
/// stderr so it can be forwarded to the log.
pub trait EncoderLauncher: Send + Sync {
    fn launch(&self, manifest: &Path, endpoint: &str) -> MediaResult<Child>;
}

/// Launches the configured ffmpeg-compatible binary.
#[derive(Debug, Clone)]
pub struct FfmpegLauncher {
    config: EncoderConfig,
}

impl FfmpegLauncher {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }
}

impl EncoderLauncher for FfmpegLauncher {
    fn launch(&self, manifest: &Path, endpoint: &str) -> MediaResult<Child> {
        let program = check_encoder(&self.config.binary)?;

        let cmd = EncoderCommand::for_stream(&self.config, manifest, endpoint);
        let args = cmd.build_args();
        debug!("Running encoder: {} {}", program.display(), args.join(" "));

        Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::launch(cmd.program(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_launch_error() {
        let launcher = FfmpegLauncher::new(EncoderConfig {
            binary: "no-such-encoder-binary-xyz".to_string(),
            ..Default::default()
        });
        let err = launcher
            .launch(Path::new("playlist.txt"), "icecast://localhost/live")
            .unwrap_err();
        assert!(err.is_launch());
    }
}
