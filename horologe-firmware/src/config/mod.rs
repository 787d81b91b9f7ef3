//! Configuration loading
//!
//! Settings from flash or the embedded `clock.toml`, plus the saved hands
//! position.

pub mod loader;

pub use loader::{embedded_settings, load_position, load_settings};
