//! Encoder supervision for the radio engine.
//!
//! This crate provides:
//! - Concat manifest generation with atomic on-disk replacement
//! - Type-safe encoder command building
//! - A supervisor owning the encoder subprocess with crash recovery
//! - Cache directory scanning and unbiased shuffling

pub mod command;
pub mod config;
pub mod error;
pub mod fs_utils;
pub mod launcher;
pub mod manifest;
pub mod metrics;
pub mod supervisor;

pub use command::{check_encoder, EncoderCommand};
pub use config::EncoderConfig;
pub use error::{MediaError, MediaResult};
pub use fs_utils::write_atomic;
pub use launcher::{EncoderLauncher, FfmpegLauncher};
pub use manifest::{
    generate, is_audio_file, parse_file_entries, scan_audio_files, shuffle, ManifestFormatError,
    AUDIO_EXTENSIONS, MANIFEST_HEADER,
};
pub use supervisor::Supervisor;
