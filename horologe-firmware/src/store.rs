//! Flash persistence for checkpoints and settings
//!
//! The engine saves checkpoints synchronously, in the middle of a cycle.
//! Flash access is async, so each write is driven to completion in place
//! with `block_on`; the clock task and the console are the only ones
//! waiting on the flash, and they share one executor.

use core::cell::RefCell;

use defmt::*;
use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use horologe_core::config::{
    ClockSettings, PositionRecord, MAX_CHECKPOINT_SIZE, MAX_SETTINGS_SIZE,
};
use horologe_core::motion::Position;
use horologe_core::traits::{CheckpointError, PositionStore};
use horologe_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey};
use horologe_hal_rp2040::FlashStorageTrait;

/// Settings write errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Serialization failed
    Serialize,
    /// Flash operation failed
    Flash(FlashError),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

/// Checkpoint and settings writer over the flash key-value store
pub struct FlashStore {
    storage: Rp2040FlashStorage<'static>,
    last: Option<Position>,
}

impl FlashStore {
    /// Create the store; `last` is the position already on flash
    pub fn new(storage: Rp2040FlashStorage<'static>, last: Position) -> Self {
        Self {
            storage,
            last: Some(last),
        }
    }

    /// Store settings for the next start
    pub fn save_settings(&mut self, settings: &ClockSettings) -> Result<(), StoreError> {
        let mut buffer = [0u8; MAX_SETTINGS_SIZE];
        let bytes =
            postcard::to_slice(settings, &mut buffer).map_err(|_| StoreError::Serialize)?;
        block_on(self.storage.write(StorageKey::ClockSettings, bytes))?;
        info!("Saved clock settings");
        Ok(())
    }

    /// Wipe settings and checkpoint
    pub fn erase_all(&mut self) -> Result<(), StoreError> {
        warn!("Wiping flash");
        block_on(self.storage.erase_all())?;
        // Nothing is on flash now, so the next checkpoint always writes
        self.last = None;
        Ok(())
    }
}

impl PositionStore for FlashStore {
    fn save_position(&mut self, position: Position) -> Result<(), CheckpointError> {
        if self.last == Some(position) {
            trace!("Checkpoint unchanged, skipping write");
            return Ok(());
        }

        let record = PositionRecord::new(position);
        let mut buffer = [0u8; MAX_CHECKPOINT_SIZE];
        let bytes = record.encode(&mut buffer)?;

        block_on(self.storage.write(StorageKey::ClockPosition, bytes)).map_err(|e| {
            warn!("Checkpoint write failed: {:?}", e);
            CheckpointError::Storage
        })?;

        debug!("Saved checkpoint {}", position.to_raw());
        self.last = Some(position);
        Ok(())
    }
}

/// Store shared by the clock task and the console
pub type SharedStore = Mutex<ThreadModeRawMutex, RefCell<FlashStore>>;

/// Copyable handle to the shared store
#[derive(Clone, Copy)]
pub struct StoreHandle(&'static SharedStore);

impl StoreHandle {
    pub fn new(store: &'static SharedStore) -> Self {
        Self(store)
    }

    pub fn save_settings(&self, settings: &ClockSettings) -> Result<(), StoreError> {
        self.0.lock(|store| store.borrow_mut().save_settings(settings))
    }

    pub fn erase_all(&self) -> Result<(), StoreError> {
        self.0.lock(|store| store.borrow_mut().erase_all())
    }
}

impl PositionStore for StoreHandle {
    fn save_position(&mut self, position: Position) -> Result<(), CheckpointError> {
        self.0
            .lock(|store| store.borrow_mut().save_position(position))
    }
}
