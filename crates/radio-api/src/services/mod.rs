//! Business logic services.

pub mod playlist_store;
pub mod radio;

pub use playlist_store::PlaylistStore;
pub use radio::{RadioService, RegenerateReport};
