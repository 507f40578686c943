//! Remote manifest synchronization.
//!
//! A sync fetches the authoritative manifest, validates it, and makes sure
//! every remote file it references exists in the cache directory. Cache
//! identity is the last path segment of the file's URL; a file that is
//! already present under that name is never fetched again.
//!
//! All entries are validated before the first download. Downloads land in
//! `<name>.part` and are renamed into place once complete, so a file that
//! is present is always whole. The first failed download aborts the sync;
//! files that finished before it stay cached for the retry, and partial
//! `.part` files of downloads cut short are removed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use futures_util::{stream, StreamExt, TryStreamExt};
use radio_media::{parse_file_entries, scan_audio_files};
use radio_models::{is_remote_uri, CacheEntry, SyncReport};
use reqwest::{redirect, Client, Response};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::metrics;

/// One manifest entry after validation.
enum Slot {
    /// Passed through untouched
    Local(PathBuf),
    Remote { url: String, filename: String },
}

/// Fetches remote manifests and materializes their files locally.
#[derive(Clone)]
pub struct CacheSynchronizer {
    http: Client,
    config: SyncConfig,
}

impl CacheSynchronizer {
    /// Create a synchronizer with its own HTTP client.
    pub fn new(config: SyncConfig) -> SyncResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .redirect(redirect::Policy::limited(1))
            .user_agent(concat!("radio-cache/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SyncError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Bring `cache_dir` in line with the manifest at `manifest_url`.
    ///
    /// Returns local paths for the manifest's remote entries, in manifest
    /// order. Non-remote entries of the remote manifest are ignored.
    pub async fn sync(&self, manifest_url: &str, cache_dir: &Path) -> SyncResult<SyncReport> {
        info!(url = %manifest_url, cache_dir = %cache_dir.display(), "Synchronizing cache");

        let result = self.sync_remote(manifest_url, cache_dir).await;
        metrics::record_run(result.is_ok());
        let report = result?;
        info!(
            downloaded = report.downloaded,
            already_cached = report.already_cached,
            "Cache synchronized"
        );
        Ok(report)
    }

    async fn sync_remote(&self, manifest_url: &str, cache_dir: &Path) -> SyncResult<SyncReport> {
        let text = self.fetch_manifest(manifest_url).await?;
        let entries = parse_file_entries(&text)?;

        let total = entries.len();
        let remote: Vec<String> = entries.into_iter().filter(|e| is_remote_uri(e)).collect();
        if remote.len() < total {
            debug!(
                skipped = total - remote.len(),
                "Ignoring non-remote entries in remote manifest"
            );
        }

        self.materialize(&remote, cache_dir).await
    }

    /// Resolve an ordered URI list through the cache.
    ///
    /// Remote URIs are downloaded if missing; anything else is taken as a
    /// local path and passed through.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        uris: &[S],
        cache_dir: &Path,
    ) -> SyncResult<SyncReport> {
        let result = self.materialize(uris, cache_dir).await;
        metrics::record_run(result.is_ok());
        result
    }

    /// Fetch the remote manifest as text.
    pub async fn fetch_manifest(&self, url: &str) -> SyncResult<String> {
        let response = self.get(url).await?;
        response
            .text()
            .await
            .map_err(|e| SyncError::fetch(url, e.to_string()))
    }

    async fn materialize<S: AsRef<str>>(
        &self,
        uris: &[S],
        cache_dir: &Path,
    ) -> SyncResult<SyncReport> {
        let mut slots = Vec::with_capacity(uris.len());
        for uri in uris {
            let uri = uri.as_ref().trim();
            if is_remote_uri(uri) {
                slots.push(Slot::Remote {
                    url: uri.to_string(),
                    filename: cache_filename(uri)?,
                });
            } else {
                slots.push(Slot::Local(PathBuf::from(uri)));
            }
        }

        if slots.iter().any(|s| matches!(s, Slot::Remote { .. })) {
            fs::create_dir_all(cache_dir).await?;
        }

        let mut report = SyncReport::default();
        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut jobs = Vec::new();

        for slot in slots {
            let (url, filename) = match slot {
                Slot::Local(path) => {
                    report.local_paths.push(path);
                    continue;
                }
                Slot::Remote { url, filename } => (url, filename),
            };

            let entry = inspect(cache_dir, &filename).await?;

            if let Some(first) = claimed.get(&entry.filename) {
                if *first != url {
                    warn!(
                        filename = %entry.filename,
                        first = %first,
                        url = %url,
                        "Distinct remote files share a cache filename, reusing the first"
                    );
                }
                report.already_cached += 1;
            } else {
                if entry.present {
                    report.already_cached += 1;
                } else {
                    jobs.push((url.clone(), entry.local_path.clone()));
                }
                claimed.insert(entry.filename.clone(), url);
            }

            report.local_paths.push(entry.local_path);
        }

        report.downloaded = jobs.len();
        if !jobs.is_empty() {
            debug!(
                count = jobs.len(),
                parallel = self.config.max_parallel,
                "Downloading missing files"
            );
        }

        let parts: Vec<PathBuf> = jobs.iter().map(|(_, path)| part_path(path)).collect();
        let result = stream::iter(jobs.into_iter().map(Ok::<_, SyncError>))
            .try_for_each_concurrent(self.config.max_parallel.max(1), |(url, path)| async move {
                self.download(&url, &path).await
            })
            .await;

        if let Err(e) = result {
            // Downloads still in flight were dropped mid-write.
            remove_parts(&parts).await;
            return Err(e);
        }

        metrics::record_cached(report.already_cached);
        Ok(report)
    }

    async fn get(&self, url: &str) -> SyncResult<Response> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::fetch(url, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::fetch(url, format!("HTTP {}", status)));
        }
        Ok(response)
    }

    async fn download(&self, url: &str, target: &Path) -> SyncResult<()> {
        let started = Instant::now();
        let response = self.get(url).await?;

        let part = part_path(target);
        let bytes = match write_body(url, response, &part).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&part, target).await {
            let _ = fs::remove_file(&part).await;
            return Err(e.into());
        }

        let elapsed = started.elapsed();
        metrics::record_download(elapsed.as_secs_f64());
        info!(
            url = %url,
            path = %target.display(),
            bytes,
            elapsed_ms = elapsed.as_millis() as u64,
            "Downloaded"
        );
        Ok(())
    }
}

/// Cache filename for a remote URI: its last path segment.
///
/// Empty and dot segments are rejected.
pub fn cache_filename(uri: &str) -> SyncResult<String> {
    let url = Url::parse(uri)
        .map_err(|e| SyncError::validation(format!("invalid URL `{}`: {}", uri, e)))?;

    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
        return Err(SyncError::validation(format!(
            "`{}` has no usable file name",
            uri
        )));
    }
    Ok(segment.to_string())
}

/// Audio files currently in the cache directory, sorted by path.
pub async fn scan(cache_dir: &Path) -> SyncResult<Vec<PathBuf>> {
    Ok(scan_audio_files(cache_dir).await?)
}

async fn inspect(cache_dir: &Path, filename: &str) -> SyncResult<CacheEntry> {
    let local_path = cache_dir.join(filename);
    let present = match fs::metadata(&local_path).await {
        Ok(meta) => meta.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    Ok(CacheEntry {
        filename: filename.to_string(),
        local_path,
        present,
    })
}

fn part_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!("{}.part", name))
}

async fn remove_parts(parts: &[PathBuf]) {
    for part in parts {
        match fs::remove_file(part).await {
            Ok(()) => debug!(path = %part.display(), "Removed partial download"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %part.display(), "Failed to remove partial download: {}", e),
        }
    }
}

async fn write_body(url: &str, response: Response, part: &Path) -> SyncResult<u64> {
    let mut file = fs::File::create(part).await?;
    let mut body = response.bytes_stream();
    let mut written = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| SyncError::fetch(url, e.to_string()))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.sync_all().await?;
    Ok(written)
}
