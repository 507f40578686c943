//! Request handlers.

pub mod health;
pub mod playlist;
pub mod radio;

pub use health::*;
pub use playlist::*;
pub use radio::*;
