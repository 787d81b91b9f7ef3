//! Position checkpoint record
//!
//! The last known hands position, stored in flash as postcard binary with a
//! header and checksum so a torn or stale write is detected on boot.

use serde::{Deserialize, Serialize};

use crate::motion::Position;
use crate::traits::CheckpointError;

/// Magic number identifying a position record
pub const CHECKPOINT_MAGIC: u32 = 0x484F_4C4F; // "HOLO"

/// Current record format version
pub const CHECKPOINT_VERSION: u8 = 1;

/// Upper bound on the encoded record size
pub const MAX_CHECKPOINT_SIZE: usize = 16;

/// Position checkpoint as stored in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PositionRecord {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Steps since 12:00, `-1` when uncalibrated
    pub position: i32,
    /// CRC32 over magic, version and position
    pub crc: u32,
}

impl PositionRecord {
    /// Create a record for a position with a valid CRC
    pub fn new(position: Position) -> Self {
        let mut record = Self {
            magic: CHECKPOINT_MAGIC,
            version: CHECKPOINT_VERSION,
            position: position.to_raw(),
            crc: 0,
        };
        record.update_crc();
        record
    }

    /// Stored position
    pub fn position(&self) -> Position {
        Position::from_raw(self.position)
    }

    /// Check if magic and version match
    pub fn is_valid(&self) -> bool {
        self.magic == CHECKPOINT_MAGIC && self.version == CHECKPOINT_VERSION
    }

    /// Calculate CRC32 over everything but the crc field
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.position.to_le_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }

    /// Serialize into `buffer`, returning the used part
    pub fn encode<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a mut [u8], CheckpointError> {
        postcard::to_slice(self, buffer).map_err(|_| CheckpointError::Serialize)
    }

    /// Deserialize and check a stored record
    pub fn decode(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let record: PositionRecord =
            postcard::from_bytes(bytes).map_err(|_| CheckpointError::Deserialize)?;

        if !record.is_valid() {
            return Err(CheckpointError::InvalidFormat);
        }
        if !record.verify_crc() {
            return Err(CheckpointError::CrcMismatch);
        }
        Ok(record)
    }
}

/// Simple CRC32 update function (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
