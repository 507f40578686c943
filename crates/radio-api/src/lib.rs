//! Axum control surface for the radio engine.
//!
//! This crate provides:
//! - Playlist store endpoints used by the admin panel
//! - Sync, regenerate and encoder lifecycle operations
//! - Shared-secret admin authentication and per-IP rate limiting
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::{ApiConfig, RadioConfig};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{PlaylistStore, RadioService};
pub use state::AppState;
