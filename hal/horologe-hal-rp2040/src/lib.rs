//! RP2040-specific HAL for the clock firmware
//!
//! This crate provides RP2040-specific implementations of the shared
//! `horologe-hal` and `horologe-core` traits:
//!
//! - Flash storage driver (implements `horologe_hal::FlashStorage`)
//! - On-chip RTC as the wall-clock source (implements `horologe_core::traits::TimeSource`)

#![no_std]

pub mod flash;
pub mod rtc;

// Re-export shared traits from horologe-hal for convenience
pub use horologe_hal::{FlashStorage as FlashStorageTrait, StorageKey};
