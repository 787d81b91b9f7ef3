//! Settings and checkpoint loading
//!
//! Settings come from flash when a valid copy is stored there, otherwise
//! from the embedded `clock.toml`. The checkpoint is optional: anything
//! short of a valid record means the hands are uncalibrated.

use defmt::*;

use horologe_core::config::{
    parse_settings, ClockSettings, PositionRecord, MAX_CHECKPOINT_SIZE, MAX_SETTINGS_SIZE,
};
use horologe_core::motion::Position;
use horologe_core::traits::CheckpointError;
use horologe_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use horologe_hal_rp2040::FlashStorageTrait;

/// Settings persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsLoadError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Stored values are out of range
    Invalid,
}

impl From<FlashError> for SettingsLoadError {
    fn from(e: FlashError) -> Self {
        SettingsLoadError::Flash(e)
    }
}

/// Load clock settings
///
/// Falls back to the embedded defaults, and to the built-in defaults if
/// even those fail to parse.
pub async fn load_settings(
    storage: &mut Rp2040FlashStorage<'_>,
    embedded: &str,
) -> ClockSettings {
    match load_stored_settings(storage).await {
        Ok(settings) => {
            info!("Loaded clock settings from flash");
            return settings;
        }
        Err(SettingsLoadError::Flash(FlashError::NotFound)) => {
            debug!("No settings in flash, using embedded defaults");
        }
        Err(e) => {
            warn!("Failed to load settings: {:?}, using embedded defaults", e);
        }
    }

    embedded_settings(embedded)
}

/// Settings from the embedded `clock.toml`, what a flash reset returns to
pub fn embedded_settings(embedded: &str) -> ClockSettings {
    match parse_settings(embedded) {
        Ok(settings) => settings,
        Err(e) => {
            // Only reachable if clock.toml slipped past the build script
            error!("Failed to parse embedded config: {:?}", e);
            ClockSettings::new()
        }
    }
}

async fn load_stored_settings(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<ClockSettings, SettingsLoadError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = storage.read(StorageKey::ClockSettings, &mut buffer).await?;

    let settings: ClockSettings =
        postcard::from_bytes(&buffer[..len]).map_err(|_| SettingsLoadError::Deserialize)?;
    settings
        .validate()
        .map_err(|_| SettingsLoadError::Invalid)?;
    Ok(settings)
}

/// Load the last saved hands position
///
/// Positions outside the dial of the current settings are discarded, so a
/// changed `steps_per_minute` forces a recalibration.
pub async fn load_position(
    storage: &mut Rp2040FlashStorage<'_>,
    settings: &ClockSettings,
) -> Position {
    match load_checkpoint(storage).await {
        Ok(Some(position)) if settings.dial().contains(position) => {
            info!("Restored hands position {}", position.to_raw());
            position
        }
        Ok(Some(position)) => {
            warn!("Checkpoint {} is off the dial, ignoring", position.to_raw());
            Position::Uncalibrated
        }
        Ok(None) => {
            debug!("No position checkpoint in flash");
            Position::Uncalibrated
        }
        Err(e) => {
            warn!("Failed to load checkpoint: {:?}", e);
            Position::Uncalibrated
        }
    }
}

async fn load_checkpoint(
    storage: &mut Rp2040FlashStorage<'_>,
) -> Result<Option<Position>, CheckpointError> {
    let mut buffer = [0u8; MAX_CHECKPOINT_SIZE];
    let len = match storage.read(StorageKey::ClockPosition, &mut buffer).await {
        Ok(len) => len,
        Err(FlashError::NotFound) => return Ok(None),
        Err(_) => return Err(CheckpointError::Storage),
    };

    let record = PositionRecord::decode(&buffer[..len])?;
    Ok(Some(record.position()))
}
