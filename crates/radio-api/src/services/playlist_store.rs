//! Playlist entry store.
//!
//! Entries live in memory behind an async `RwLock`. When a backing path is
//! configured, the full list is rewritten atomically as JSON after every
//! mutation and loaded again at boot.

use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use radio_media::write_atomic;
use radio_models::{EntryId, NewPlaylistEntry, OrderUpdate, PlaylistEntry};

use crate::error::{ApiError, ApiResult};

/// Ordered store of playlist entries.
pub struct PlaylistStore {
    entries: RwLock<Vec<PlaylistEntry>>,
    path: Option<PathBuf>,
}

impl PlaylistStore {
    /// A store that forgets everything on restart.
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Open a JSON-backed store, loading existing entries if the file exists.
    pub async fn open(path: PathBuf) -> ApiResult<Self> {
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Vec<PlaylistEntry>>(&bytes).map_err(|e| {
                ApiError::internal(format!("corrupt playlist store {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ApiError::internal(format!(
                    "failed to read playlist store {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        info!(
            entries = entries.len(),
            path = %path.display(),
            "Playlist store loaded"
        );

        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    /// Append an entry after the current last one.
    pub async fn add(&self, new: NewPlaylistEntry) -> ApiResult<PlaylistEntry> {
        new.validate().map_err(ApiError::bad_request)?;

        let mut entries = self.entries.write().await;
        let order = entries.iter().map(|e| e.order).max().map_or(1, |max| max + 1);
        let entry = PlaylistEntry::from_new(new, order);
        entries.push(entry.clone());
        self.persist(&entries).await?;

        info!(id = %entry.id, order, title = %entry.title, "Playlist entry added");
        Ok(entry)
    }

    /// Active entries in play order.
    pub async fn list_active(&self) -> Vec<PlaylistEntry> {
        let entries = self.entries.read().await;
        let mut active: Vec<PlaylistEntry> = entries.iter().filter(|e| e.active).cloned().collect();
        active.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        active
    }

    /// Apply a bulk order change. Unknown ids are skipped.
    ///
    /// Returns how many entries were updated.
    pub async fn reorder(&self, updates: &[OrderUpdate]) -> ApiResult<usize> {
        let mut entries = self.entries.write().await;
        let now = Utc::now();

        let mut updated = 0;
        for update in updates {
            match entries.iter_mut().find(|e| e.id == update.id) {
                Some(entry) => {
                    entry.order = update.order;
                    entry.updated_at = now;
                    updated += 1;
                }
                None => debug!(id = %update.id, "Ignoring reorder for unknown entry"),
            }
        }

        if updated > 0 {
            self.persist(&entries).await?;
        }
        Ok(updated)
    }

    /// Activate or deactivate one entry.
    pub async fn set_active(&self, id: EntryId, active: bool) -> ApiResult<PlaylistEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| ApiError::not_found(format!("playlist entry {}", id)))?;

        entry.active = active;
        entry.updated_at = Utc::now();
        let entry = entry.clone();

        self.persist(&entries).await?;
        Ok(entry)
    }

    async fn persist(&self, entries: &[PlaylistEntry]) -> ApiResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| ApiError::internal(format!("failed to encode playlist store: {}", e)))?;
        write_atomic(path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radio_models::EntryKind;
    use tempfile::TempDir;

    fn new_entry(title: &str, url: &str) -> NewPlaylistEntry {
        NewPlaylistEntry {
            title: title.to_string(),
            audio_url: url.to_string(),
            duration_seconds: 180.0,
            kind: EntryKind::Song,
        }
    }

    #[tokio::test]
    async fn test_add_assigns_increasing_order() {
        let store = PlaylistStore::in_memory();
        let a = store.add(new_entry("A", "/music/a.mp3")).await.unwrap();
        let b = store.add(new_entry("B", "/music/b.mp3")).await.unwrap();
        assert_eq!(a.order, 1);
        assert_eq!(b.order, 2);
    }

    #[tokio::test]
    async fn test_add_rejects_invalid_entry() {
        let store = PlaylistStore::in_memory();
        let err = store.add(new_entry("", "/music/a.mp3")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(store.list_active().await.is_empty());
    }

    #[tokio::test]
    async fn test_order_counts_inactive_entries() {
        let store = PlaylistStore::in_memory();
        let a = store.add(new_entry("A", "/a.mp3")).await.unwrap();
        store.set_active(a.id, false).await.unwrap();

        let b = store.add(new_entry("B", "/b.mp3")).await.unwrap();
        assert_eq!(b.order, 2);

        let active = store.list_active().await;
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    async fn test_reorder_ignores_unknown_ids() {
        let store = PlaylistStore::in_memory();
        let a = store.add(new_entry("A", "/a.mp3")).await.unwrap();
        let b = store.add(new_entry("B", "/b.mp3")).await.unwrap();

        let updated = store
            .reorder(&[
                OrderUpdate { id: a.id, order: 5 },
                OrderUpdate { id: EntryId::new(), order: 0 },
            ])
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let ids: Vec<_> = store.list_active().await.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    #[tokio::test]
    async fn test_set_active_unknown_is_not_found() {
        let store = PlaylistStore::in_memory();
        let err = store.set_active(EntryId::new(), false).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playlist.json");

        let store = PlaylistStore::open(path.clone()).await.unwrap();
        let a = store.add(new_entry("A", "https://cdn.example.com/a.mp3")).await.unwrap();
        store.add(new_entry("B", "/b.mp3")).await.unwrap();
        drop(store);

        let reopened = PlaylistStore::open(path).await.unwrap();
        let active = reopened.list_active().await;
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, a.id);
        assert_eq!(active[0].source_uri, "https://cdn.example.com/a.mp3");
    }
}
