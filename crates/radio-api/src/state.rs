//! Application state.

use std::sync::Arc;

use radio_cache::{CacheSynchronizer, SyncConfig};
use radio_media::{EncoderConfig, Supervisor};

use crate::config::{ApiConfig, RadioConfig};
use crate::services::{PlaylistStore, RadioService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<PlaylistStore>,
    pub radio: Arc<RadioService>,
}

impl AppState {
    pub fn new(config: ApiConfig, store: Arc<PlaylistStore>, radio: Arc<RadioService>) -> Self {
        Self {
            config,
            store,
            radio,
        }
    }

    /// Build the full service graph from environment variables.
    ///
    /// Must be called within a Tokio runtime.
    pub async fn from_env(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let radio_config = RadioConfig::from_env()?;

        let store = match &radio_config.playlist_store_path {
            Some(path) => PlaylistStore::open(path.clone()).await?,
            None => PlaylistStore::in_memory(),
        };
        let store = Arc::new(store);

        let synchronizer = CacheSynchronizer::new(SyncConfig::from_env())?;
        let supervisor = Supervisor::with_ffmpeg(EncoderConfig::from_env());

        let radio = RadioService::new(radio_config, Arc::clone(&store), synchronizer, supervisor);

        Ok(Self::new(config, store, Arc::new(radio)))
    }
}
