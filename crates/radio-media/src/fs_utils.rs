//! Filesystem utilities for atomic file replacement.
//!
//! Readers of a file replaced through this module observe either the old or
//! the new contents, never a partial write.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{MediaError, MediaResult};

/// Sibling path used while `path` is being written.
///
/// Lives in the same directory so the final rename stays on one filesystem.
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Replace `path` with `contents` atomically.
///
/// The data is written and flushed to a temporary sibling, then renamed over
/// the target. The parent directory is created if needed.
///
/// # Example
///
/// ```ignore
/// use radio_media::fs_utils::write_atomic;
///
/// write_atomic("/srv/radio/playlist.txt", "ffconcat version 1.0\n").await?;
/// ```
pub async fn write_atomic(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> MediaResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = temp_path_for(path);

    let mut file = fs::File::create(&tmp).await?;
    file.write_all(contents.as_ref()).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp, path).await.map_err(|e| {
        // Clean up temp file on failure
        let _ = std::fs::remove_file(&tmp);
        tracing::error!(
            "Failed to rename {} over {}: {}",
            tmp.display(),
            path.display(),
            e
        );
        MediaError::from(e)
    })?;

    tracing::debug!("Atomically replaced {}", path.display());

    Ok(())
}
