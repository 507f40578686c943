//! Cache synchronization for the radio engine.
//!
//! This crate provides:
//! - Remote manifest fetch and validation
//! - Idempotent, filename-keyed downloads into a persistent cache directory
//! - Resolution of arbitrary URI lists through the same cache
//! - Cache directory scanning for shuffle playback

pub mod config;
pub mod error;
pub mod metrics;
pub mod synchronizer;

pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use synchronizer::{cache_filename, scan, CacheSynchronizer};
