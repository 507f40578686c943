//! Cache synchronization models.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Outcome of a successful cache synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Files fetched during this call
    pub downloaded: usize,
    /// Entries satisfied by files already in the cache
    pub already_cached: usize,
    /// Local paths in the remote manifest's order
    pub local_paths: Vec<PathBuf>,
}

impl SyncReport {
    pub fn total(&self) -> usize {
        self.downloaded + self.already_cached
    }
}

/// A remote file's slot in the cache directory.
///
/// Derived at sync time; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub filename: String,
    pub local_path: PathBuf,
    pub present: bool,
}

/// Whether a manifest source refers to a network location.
pub fn is_remote_uri(uri: &str) -> bool {
    Url::parse(uri)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote_uri() {
        assert!(is_remote_uri("https://cdn.example.com/a.mp3"));
        assert!(is_remote_uri("http://10.0.0.1:8080/b.mp3"));
        assert!(!is_remote_uri("/var/cache/radio/a.mp3"));
        assert!(!is_remote_uri("file:///var/cache/a.mp3"));
        assert!(!is_remote_uri("a.mp3"));
    }
}
