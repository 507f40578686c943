//! Shared data models for the radio engine.
//!
//! This crate provides Serde-serializable types for:
//! - Playlist entries and their ordering
//! - Playback modes selected at deployment time
//! - Encoder process status snapshots
//! - Cache synchronization reports

pub mod encoder;
pub mod mode;
pub mod playlist;
pub mod sync;

// Re-export common types
pub use encoder::{EncoderState, EncoderStatus, ExitInfo};
pub use mode::{PlaybackMode, PlaybackModeParseError};
pub use playlist::{EntryId, EntryKind, NewPlaylistEntry, OrderUpdate, PlaylistEntry};
pub use sync::{is_remote_uri, CacheEntry, SyncReport};
