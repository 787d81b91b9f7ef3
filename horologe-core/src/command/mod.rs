//! Control commands
//!
//! Commands travel from the control surface to the convergence engine
//! through the bounded [`CommandQueue`]. Each one is consumed exactly once.

pub mod queue;

pub use queue::{CommandQueue, QUEUE_CAPACITY};

/// Largest step magnitude the packed command word can carry
pub const MAX_STEP_MAGNITUDE: u32 = 0x7F_FFFF;

const TAG_START: u8 = 1;
const TAG_STOP: u8 = 2;
const TAG_STEP: u8 = 3;
const TAG_SET_POSITION: u8 = 4;

const SIGN_BIT: u32 = 1 << 23;

/// A control command for the convergence engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Resume time-based movement
    Start,
    /// Pause time-based movement after the current move
    Stop,
    /// Jog the hands by a signed number of steps
    StepMove(i32),
    /// Tell the clock where the hands really are
    SetPosition {
        /// Hour on the dial (0-11)
        hour: u8,
        /// Minute (0-59)
        minute: u8,
    },
}

impl Command {
    /// Pack into a single 32-bit word
    ///
    /// Layout: tag in bits 24..31. `SetPosition` carries the hour in bits
    /// 16..23 and the minute in bits 8..15. `StepMove` carries the sign in
    /// bit 23 and the magnitude in bits 0..22, clamped to
    /// [`MAX_STEP_MAGNITUDE`].
    pub fn encode(&self) -> u32 {
        match *self {
            Command::Start => (TAG_START as u32) << 24,
            Command::Stop => (TAG_STOP as u32) << 24,
            Command::StepMove(steps) => {
                let sign = if steps < 0 { SIGN_BIT } else { 0 };
                let magnitude = steps.unsigned_abs().min(MAX_STEP_MAGNITUDE);
                ((TAG_STEP as u32) << 24) | sign | magnitude
            }
            Command::SetPosition { hour, minute } => {
                ((TAG_SET_POSITION as u32) << 24) | ((hour as u32) << 16) | ((minute as u32) << 8)
            }
        }
    }

    /// Unpack a word produced by [`Command::encode`]
    ///
    /// Returns `None` for an unknown tag.
    pub fn decode(word: u32) -> Option<Self> {
        match (word >> 24) as u8 {
            TAG_START => Some(Command::Start),
            TAG_STOP => Some(Command::Stop),
            TAG_STEP => {
                let magnitude = (word & MAX_STEP_MAGNITUDE) as i32;
                let steps = if word & SIGN_BIT != 0 {
                    -magnitude
                } else {
                    magnitude
                };
                Some(Command::StepMove(steps))
            }
            TAG_SET_POSITION => Some(Command::SetPosition {
                hour: (word >> 16) as u8,
                minute: (word >> 8) as u8,
            }),
            _ => None,
        }
    }
}

/// Reasons a command submission is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Three commands are already pending
    QueueFull,
    /// The convergence engine has not been started
    NotRunning,
    /// Hour or minute outside the dial
    InvalidPosition,
}

impl CommandError {
    /// Short human-readable description for the control surface
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandError::QueueFull => "command queue full",
            CommandError::NotRunning => "clock not running",
            CommandError::InvalidPosition => "invalid position",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(Command::Start.encode(), 0x0100_0000);
        assert_eq!(Command::Stop.encode(), 0x0200_0000);
        assert_eq!(Command::StepMove(10).encode(), 0x0300_000A);
        assert_eq!(Command::StepMove(-10).encode(), 0x0380_000A);
        assert_eq!(
            Command::SetPosition { hour: 11, minute: 59 }.encode(),
            0x040B_3B00
        );
    }

    #[test]
    fn test_decode_step_sign() {
        assert_eq!(Command::decode(0x0380_0005), Some(Command::StepMove(-5)));
        assert_eq!(Command::decode(0x0300_0005), Some(Command::StepMove(5)));
    }

    #[test]
    fn test_step_magnitude_is_clamped() {
        let word = Command::StepMove(i32::MIN).encode();
        assert_eq!(
            Command::decode(word),
            Some(Command::StepMove(-(MAX_STEP_MAGNITUDE as i32)))
        );
    }

    #[test]
    fn test_decode_unknown_tag() {
        assert_eq!(Command::decode(0), None);
        assert_eq!(Command::decode(0x0500_0000), None);
    }

    #[test]
    fn test_error_text() {
        assert_eq!(CommandError::QueueFull.as_str(), "command queue full");
    }
}
