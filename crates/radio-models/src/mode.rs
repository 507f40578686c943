//! Playback mode selected at deployment time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the manifest is produced on every regenerate.
///
/// Modes are mutually exclusive and never mixed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackMode {
    /// Play the remote master manifest in its own order, through the cache.
    RemoteDriven,
    /// Play whatever audio sits in the cache directory, shuffled.
    AutonomousShuffle,
    /// Play the playlist store's active entries in order, remote ones through the cache.
    #[default]
    HybridCache,
}

impl PlaybackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaybackMode::RemoteDriven => "remote",
            PlaybackMode::AutonomousShuffle => "shuffle",
            PlaybackMode::HybridCache => "hybrid",
        }
    }

    /// Whether the playlist store drives manifest contents.
    pub fn uses_store(&self) -> bool {
        matches!(self, PlaybackMode::HybridCache)
    }
}

impl fmt::Display for PlaybackMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlaybackMode {
    type Err = PlaybackModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" | "remote_driven" => Ok(PlaybackMode::RemoteDriven),
            "shuffle" | "autonomous_shuffle" => Ok(PlaybackMode::AutonomousShuffle),
            "hybrid" | "hybrid_cache" => Ok(PlaybackMode::HybridCache),
            _ => Err(PlaybackModeParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown playback mode: {0}")]
pub struct PlaybackModeParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("remote".parse::<PlaybackMode>().unwrap(), PlaybackMode::RemoteDriven);
        assert_eq!(
            "Autonomous_Shuffle".parse::<PlaybackMode>().unwrap(),
            PlaybackMode::AutonomousShuffle
        );
        assert_eq!(" hybrid ".parse::<PlaybackMode>().unwrap(), PlaybackMode::HybridCache);
        assert!("mixed".parse::<PlaybackMode>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [
            PlaybackMode::RemoteDriven,
            PlaybackMode::AutonomousShuffle,
            PlaybackMode::HybridCache,
        ] {
            assert_eq!(mode.to_string().parse::<PlaybackMode>().unwrap(), mode);
        }
    }
}
