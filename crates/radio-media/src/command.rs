//! Encoder command builder.

use std::path::{Path, PathBuf};

use crate::config::EncoderConfig;
use crate::error::{MediaError, MediaResult};

/// Builder for the streaming encoder's command line.
#[derive(Debug, Clone)]
pub struct EncoderCommand {
    /// Encoder binary
    program: String,
    /// Manifest file path
    input: PathBuf,
    /// Streaming endpoint
    output: String,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Log level
    log_level: String,
}

impl EncoderCommand {
    /// Create a new encoder command.
    pub fn new(program: impl Into<String>, manifest: impl AsRef<Path>, endpoint: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            input: manifest.as_ref().to_path_buf(),
            output: endpoint.into(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Build the standard live-streaming command for a manifest.
    pub fn for_stream(config: &EncoderConfig, manifest: &Path, endpoint: &str) -> Self {
        Self::new(config.binary.clone(), manifest, endpoint)
            .log_level(config.log_level.clone())
            .realtime()
            .concat_input()
            .loop_forever()
            .no_video()
            .audio_codec(config.audio_codec.clone())
            .audio_bitrate(config.audio_bitrate.clone())
            .sample_rate(config.sample_rate)
            .format(config.format.clone())
            .content_type(config.content_type.clone())
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Read input at its native rate, as a live source must.
    pub fn realtime(self) -> Self {
        self.input_arg("-re")
    }

    /// Read the input as a concat manifest with absolute paths allowed.
    pub fn concat_input(self) -> Self {
        self.input_args(["-f", "concat", "-safe", "0"])
    }

    /// Loop the whole manifest indefinitely.
    pub fn loop_forever(self) -> Self {
        self.input_args(["-stream_loop", "-1"])
    }

    /// Drop any video streams (cover art).
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Set output sample rate.
    pub fn sample_rate(self, rate: u32) -> Self {
        self.output_arg("-ar").output_arg(rate.to_string())
    }

    /// Set output container format.
    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Set the content type announced to the streaming server.
    pub fn content_type(self, mime: impl Into<String>) -> Self {
        self.output_arg("-content_type").output_arg(mime)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-loglevel".to_string(),
            self.log_level.clone(),
        ];

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.clone());

        args
    }
}

/// Resolve the encoder binary on PATH.
pub fn check_encoder(binary: &str) -> MediaResult<PathBuf> {
    which::which(binary).map_err(|e| MediaError::launch(binary, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(args: &[String], needle: &str) -> usize {
        args.iter()
            .position(|a| a == needle)
            .unwrap_or_else(|| panic!("{} missing from {:?}", needle, args))
    }

    #[test]
    fn test_stream_command_layout() {
        let config = EncoderConfig::default();
        let cmd = EncoderCommand::for_stream(
            &config,
            Path::new("/srv/radio/playlist.txt"),
            "icecast://source:pw@localhost:8000/live",
        );
        let args = cmd.build_args();

        let input = position(&args, "-i");
        assert_eq!(args[input + 1], "/srv/radio/playlist.txt");
        assert!(position(&args, "concat") < input);
        assert!(position(&args, "-re") < input);
        assert!(position(&args, "-stream_loop") < input);
        assert!(position(&args, "-c:a") > input);
        assert_eq!(args[position(&args, "-c:a") + 1], "libmp3lame");
        assert_eq!(args[position(&args, "-b:a") + 1], "128k");
        assert_eq!(args.last().unwrap(), "icecast://source:pw@localhost:8000/live");
        assert_eq!(cmd.program(), "ffmpeg");
    }

    #[test]
    fn test_log_level_override() {
        let args = EncoderCommand::new("ffmpeg", "in.txt", "out")
            .log_level("warning")
            .build_args();
        assert_eq!(args[position(&args, "-loglevel") + 1], "warning");
    }

    #[test]
    fn test_check_encoder_missing_binary() {
        let err = check_encoder("definitely-not-an-encoder-binary").unwrap_err();
        assert!(err.is_launch());
    }
}
