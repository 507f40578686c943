//! Playlist entry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum title length accepted by the store.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Unique identifier for a playlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Generate a new random entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for EntryId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

/// What a playlist entry is, for scheduling and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    #[default]
    Song,
    Jingle,
    Advertisement,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Song => "song",
            EntryKind::Jingle => "jingle",
            EntryKind::Advertisement => "advertisement",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A playable item owned by the playlist store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub id: EntryId,
    pub title: String,
    /// Remote URL or local path of the audio file
    pub source_uri: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub kind: EntryKind,
    /// Position in the play order (lower plays first)
    pub order: i64,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl PlaylistEntry {
    /// Build a stored entry from a creation request at the given order.
    pub fn from_new(new: NewPlaylistEntry, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::new(),
            title: new.title.trim().to_string(),
            source_uri: new.audio_url.trim().to_string(),
            duration_seconds: new.duration_seconds,
            kind: new.kind,
            order,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for adding an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPlaylistEntry {
    pub title: String,
    pub audio_url: String,
    pub duration_seconds: f64,
    #[serde(default, rename = "type")]
    pub kind: EntryKind,
}

impl NewPlaylistEntry {
    /// Validate the request.
    pub fn validate(&self) -> Result<(), String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("title is required".to_string());
        }
        if title.chars().count() > MAX_TITLE_LENGTH {
            return Err(format!(
                "title exceeds maximum length of {} characters",
                MAX_TITLE_LENGTH
            ));
        }
        if self.audio_url.trim().is_empty() {
            return Err("audio_url is required".to_string());
        }
        if !self.duration_seconds.is_finite() || self.duration_seconds < 0.0 {
            return Err("duration_seconds must be a non-negative number".to_string());
        }
        Ok(())
    }
}

/// One element of a bulk reorder request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(alias = "uuid")]
    pub id: EntryId,
    pub order: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_entry(title: &str, url: &str, duration: f64) -> NewPlaylistEntry {
        NewPlaylistEntry {
            title: title.to_string(),
            audio_url: url.to_string(),
            duration_seconds: duration,
            kind: EntryKind::Song,
        }
    }

    #[test]
    fn test_validate_new_entry() {
        assert!(new_entry("Intro", "https://cdn.example.com/intro.mp3", 12.5)
            .validate()
            .is_ok());
        assert!(new_entry("  ", "https://cdn.example.com/a.mp3", 1.0)
            .validate()
            .is_err());
        assert!(new_entry("Song", "", 1.0).validate().is_err());
        assert!(new_entry("Song", "/music/a.mp3", -1.0).validate().is_err());
        assert!(new_entry("Song", "/music/a.mp3", f64::NAN).validate().is_err());
        assert!(new_entry(&"x".repeat(MAX_TITLE_LENGTH + 1), "/a.mp3", 1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_kind_uses_type_field() {
        let json = r#"{"title":"Ad","audio_url":"/ads/a.mp3","duration_seconds":30,"type":"advertisement"}"#;
        let parsed: NewPlaylistEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, EntryKind::Advertisement);

        let json = r#"{"title":"Song","audio_url":"/a.mp3","duration_seconds":30}"#;
        let parsed: NewPlaylistEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, EntryKind::Song);
    }

    #[test]
    fn test_order_update_accepts_uuid_alias() {
        let json = r#"{"uuid":"6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f","order":2}"#;
        let parsed: OrderUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.order, 2);
        assert_eq!(parsed.id.to_string(), "6f1c2d3e-4a5b-4c6d-8e9f-0a1b2c3d4e5f");
    }

    #[test]
    fn test_from_new_trims_and_activates() {
        let entry = PlaylistEntry::from_new(new_entry(" Jingle ", " /j.mp3 ", 3.0), 7);
        assert_eq!(entry.title, "Jingle");
        assert_eq!(entry.source_uri, "/j.mp3");
        assert_eq!(entry.order, 7);
        assert!(entry.active);
    }
}
