//! Chime output implementations

pub mod buzzer;

pub use buzzer::{Buzzer, Note, CHIME_TUNE};
