//! Concat manifest generation and parsing.
//!
//! The manifest is the encoder's only input: a version header followed by
//! one `file '<path>'` line per track, in play order. A manifest with no
//! tracks still carries the header plus a comment so the encoder's parser
//! never sees an empty file.

use std::path::{Path, PathBuf};

use rand::Rng;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::MediaResult;

/// First line of every manifest.
pub const MANIFEST_HEADER: &str = "ffconcat version 1.0";

/// Placeholder written when there is nothing to play.
pub const EMPTY_MANIFEST_COMMENT: &str = "# Playlist empty, waiting for tracks...";

/// File extensions recognized as audio when scanning a directory.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "aac", "m4a", "ogg", "opus", "flac", "wav"];

/// Render a manifest for the given paths, in order.
///
/// Paths containing line breaks cannot be expressed in the format and are
/// skipped with a warning.
pub fn generate<P: AsRef<Path>>(paths: &[P]) -> String {
    let mut content = String::with_capacity(32 + paths.len() * 64);
    content.push_str(MANIFEST_HEADER);
    content.push('\n');

    let mut written = 0usize;
    for path in paths {
        let path = path.as_ref().to_string_lossy();
        if path.contains('\n') || path.contains('\r') {
            warn!(path = %path.escape_debug(), "Skipping path with line break in manifest");
            continue;
        }
        content.push_str("file '");
        content.push_str(&escape_path(&path));
        content.push_str("'\n");
        written += 1;
    }

    if written == 0 {
        content.push_str(EMPTY_MANIFEST_COMMENT);
        content.push('\n');
    }

    debug!(entries = written, "Generated manifest");
    content
}

/// Quote a path for a single-quoted manifest token.
fn escape_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

/// Manifest text did not follow the expected grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestFormatError {
    #[error("missing `{MANIFEST_HEADER}` header")]
    MissingHeader,

    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },
}

/// Extract every `file` entry from a manifest, in order.
///
/// The first non-blank line must be the version header. Comments, blank
/// lines and directives other than `file` are ignored.
pub fn parse_file_entries(text: &str) -> Result<Vec<String>, ManifestFormatError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    match lines.next() {
        Some((_, first)) if first.trim_start_matches('\u{feff}') == MANIFEST_HEADER => {}
        _ => return Err(ManifestFormatError::MissingHeader),
    }

    let mut entries = Vec::new();
    for (line_no, line) in lines {
        if line.starts_with('#') {
            continue;
        }
        let Some(rest) = line.strip_prefix("file") else {
            continue;
        };
        if !rest.starts_with(char::is_whitespace) {
            continue;
        }
        let value = unquote(rest.trim()).map_err(|message| ManifestFormatError::InvalidLine {
            line: line_no,
            message,
        })?;
        if value.is_empty() {
            return Err(ManifestFormatError::InvalidLine {
                line: line_no,
                message: "empty file reference".to_string(),
            });
        }
        entries.push(value);
    }

    Ok(entries)
}

/// Undo the concat token quoting: `'...'` spans and backslash escapes.
fn unquote(token: &str) -> Result<String, String> {
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '\'' => in_quotes = !in_quotes,
            '\\' if !in_quotes => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err("dangling escape".to_string()),
            },
            c if c.is_whitespace() && !in_quotes => {
                return Err("unexpected whitespace after file reference".to_string())
            }
            c => out.push(c),
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    Ok(out)
}

/// Permute `items` in place with an unbiased Fisher-Yates shuffle.
pub fn shuffle<T>(items: &mut [T]) {
    shuffle_with(items, &mut rand::rng());
}

/// Fisher-Yates with a caller-supplied generator.
pub fn shuffle_with<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Whether `path` has a recognized audio extension.
pub fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// List audio files directly inside `dir`, sorted by path.
///
/// A missing directory yields an empty list.
pub async fn scan_audio_files(dir: impl AsRef<Path>) -> MediaResult<Vec<PathBuf>> {
    let dir = dir.as_ref();

    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Audio directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut files = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && is_audio_file(&path) {
            files.push(path);
        }
    }
    files.sort();

    debug!(count = files.len(), dir = %dir.display(), "Scanned audio directory");
    Ok(files)
}
