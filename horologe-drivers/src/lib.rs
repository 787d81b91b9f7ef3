//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in horologe-core on top of `embedded-hal` 1.0:
//!
//! - Stepper drivers (ULN2003 unipolar 4-phase, e.g. 28BYJ-48)
//! - Chime outputs (GPIO buzzer)

#![no_std]
#![deny(unsafe_code)]

pub mod chime;
pub mod stepper;
