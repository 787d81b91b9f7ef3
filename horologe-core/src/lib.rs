//! Board-agnostic core logic for the hollow clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware capability traits (coil driver, wall clock, chime, checkpoint store)
//! - Position tracking on the 12-hour dial
//! - Control commands and the bounded command queue
//! - Direction/catch-up algorithm and motion profiles
//! - The convergence engine that keeps the hands on the current time
//! - Settings, position checkpoint records and the config file parser
//! - The line-oriented control console parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod chime;
pub mod command;
pub mod config;
pub mod console;
pub mod engine;
pub mod motion;
pub mod traits;
