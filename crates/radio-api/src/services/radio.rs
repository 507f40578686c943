//! Station orchestration: sync, regenerate, encoder lifecycle.
//!
//! Every operation that touches the cache or the manifest runs under one
//! operation lock, so two regenerate requests can never interleave their
//! sync, generate and restart steps.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use radio_cache::{scan, CacheSynchronizer};
use radio_media::{generate, shuffle, Supervisor};
use radio_models::{EncoderStatus, PlaybackMode, SyncReport};

use crate::config::RadioConfig;
use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::services::PlaylistStore;

/// Outcome of a manifest regeneration.
#[derive(Debug, Clone, Serialize)]
pub struct RegenerateReport {
    pub mode: PlaybackMode,
    /// Tracks written to the manifest
    pub entries: usize,
    /// Whether an encoder restart was scheduled
    pub restarted: bool,
    /// Cache resolution of the manifest's remote entries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncReport>,
    /// Library sync performed before regenerating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<SyncReport>,
}

/// Drives synchronizer, generator and supervisor for one station.
pub struct RadioService {
    config: RadioConfig,
    store: Arc<PlaylistStore>,
    synchronizer: CacheSynchronizer,
    supervisor: Supervisor,
    op_lock: Mutex<()>,
}

impl RadioService {
    pub fn new(
        config: RadioConfig,
        store: Arc<PlaylistStore>,
        synchronizer: CacheSynchronizer,
        supervisor: Supervisor,
    ) -> Self {
        Self {
            config,
            store,
            synchronizer,
            supervisor,
            op_lock: Mutex::new(()),
        }
    }

    pub fn mode(&self) -> PlaybackMode {
        self.config.mode
    }

    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    pub fn autostart(&self) -> bool {
        self.config.autostart
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    /// Pull the remote manifest's files into the cache without touching the
    /// manifest or the encoder.
    pub async fn sync_library(&self) -> ApiResult<SyncReport> {
        let _op = self.op_lock.lock().await;
        let result = self.sync_remote().await;
        metrics::record_operation("sync", result.is_ok());
        result
    }

    /// Rebuild the manifest for the configured mode and restart the encoder
    /// onto it if it is running.
    pub async fn regenerate(&self) -> ApiResult<RegenerateReport> {
        let _op = self.op_lock.lock().await;
        let result = self.regenerate_locked().await;
        metrics::record_operation("regenerate", result.is_ok());
        result
    }

    /// Sync, then regenerate and restart.
    pub async fn refresh(&self) -> ApiResult<RegenerateReport> {
        let _op = self.op_lock.lock().await;

        let result = self.refresh_locked().await;
        metrics::record_operation("refresh", result.is_ok());
        result
    }

    /// Regenerate after a playlist store change, when the store drives the
    /// manifest.
    pub async fn playlist_changed(&self) -> ApiResult<Option<RegenerateReport>> {
        if !self.config.mode.uses_store() {
            return Ok(None);
        }
        self.regenerate().await.map(Some)
    }

    pub async fn start(&self) -> ApiResult<EncoderStatus> {
        let _op = self.op_lock.lock().await;
        self.supervisor.start().await?;
        Ok(self.supervisor.status())
    }

    /// Stop the encoder once any regenerate in flight has finished.
    pub async fn stop(&self) -> EncoderStatus {
        let _op = self.op_lock.lock().await;
        self.supervisor.stop().await;
        self.supervisor.status()
    }

    pub fn status(&self) -> EncoderStatus {
        self.supervisor.status()
    }

    /// Prepare the manifest at boot and optionally start the encoder.
    ///
    /// Failures are logged; the service still comes up.
    pub async fn bootstrap(&self, autostart: bool) {
        if let Ok(path) = self.supervisor.config().manifest_path() {
            if !path.exists() {
                info!(path = %path.display(), "No manifest yet, writing an empty one");
                if let Err(e) = self.supervisor.write_manifest(&generate::<&str>(&[])).await {
                    error!("Failed to write initial manifest: {}", e);
                }
            }
        }

        match self.regenerate().await {
            Ok(report) => info!(
                mode = %report.mode,
                entries = report.entries,
                "Initial manifest generated"
            ),
            Err(e) => warn!("Initial manifest generation failed, keeping the existing one: {}", e),
        }

        if autostart {
            if let Err(e) = self.start().await {
                error!("Encoder autostart failed: {}", e);
            }
        }
    }

    /// Stop the encoder for process shutdown.
    pub async fn shutdown(&self) {
        let _op = self.op_lock.lock().await;
        self.supervisor.stop().await;
        info!("Encoder stopped for shutdown");
    }

    async fn refresh_locked(&self) -> ApiResult<RegenerateReport> {
        // Remote mode syncs as part of regenerating.
        let library = match (self.config.mode, &self.config.remote_manifest_url) {
            (PlaybackMode::RemoteDriven, _) | (_, None) => None,
            (_, Some(_)) => Some(self.sync_remote().await?),
        };

        let mut report = self.regenerate_locked().await?;
        report.library = library;
        Ok(report)
    }

    async fn sync_remote(&self) -> ApiResult<SyncReport> {
        let url = self.remote_manifest_url()?;
        Ok(self.synchronizer.sync(url, &self.config.cache_dir).await?)
    }

    fn remote_manifest_url(&self) -> ApiResult<&str> {
        self.config
            .remote_manifest_url
            .as_deref()
            .ok_or_else(|| ApiError::conflict("REMOTE_MANIFEST_URL is not configured"))
    }

    async fn regenerate_locked(&self) -> ApiResult<RegenerateReport> {
        let cache_dir = &self.config.cache_dir;

        let (paths, sync) = match self.config.mode {
            PlaybackMode::RemoteDriven => {
                let report = self.sync_remote().await?;
                (report.local_paths.clone(), Some(report))
            }
            PlaybackMode::AutonomousShuffle => {
                let mut files = scan(cache_dir).await?;
                shuffle(&mut files);
                (files, None)
            }
            PlaybackMode::HybridCache => {
                let uris: Vec<String> = self
                    .store
                    .list_active()
                    .await
                    .into_iter()
                    .map(|e| e.source_uri)
                    .collect();
                let report = self.synchronizer.resolve(&uris, cache_dir).await?;
                (report.local_paths.clone(), Some(report))
            }
        };

        let manifest = generate(&paths);

        // Never start an encoder the operator stopped; just refresh its input.
        let restarted = self
            .supervisor
            .reload_if_armed(&manifest, self.config.restart_delay)
            .await?;

        info!(
            mode = %self.config.mode,
            entries = paths.len(),
            restarted,
            "Manifest regenerated"
        );

        Ok(RegenerateReport {
            mode: self.config.mode,
            entries: paths.len(),
            restarted,
            sync,
            library: None,
        })
    }
}
