//! Configuration types
//!
//! Clock settings, the position checkpoint record (both stored as postcard
//! binary data) and the parser for the embedded `clock.toml` defaults.

pub mod checkpoint;
pub mod settings;
pub mod toml;

pub use checkpoint::{PositionRecord, CHECKPOINT_MAGIC, CHECKPOINT_VERSION, MAX_CHECKPOINT_SIZE};
pub use settings::{
    ClockSettings, SettingChange, SettingsError, DEFAULT_DELAY_TIME_MS, DEFAULT_STEPS_PER_MINUTE,
    MAX_SETTINGS_SIZE,
};
pub use toml::{parse_settings, ParseError};
