//! Step timing profiles
//!
//! Normal moves ease in: the first step waits three times the cruising
//! delay and every step after that waits one millisecond less, until the
//! cruising delay is reached. Fast moves use a fixed short delay.

/// Step delay used for fast (catch-up) moves
pub const FAST_STEP_DELAY_MS: u8 = 2;

/// Shortest cruising delay the motor can follow
pub const MIN_DELAY_TIME_MS: u8 = 2;

/// Largest number of steps issued in one fast move
pub const MAX_FAST_MOVEMENT_STEPS: u32 = 1000;

/// How the per-step delay evolves over a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepTiming {
    /// Start at `3 × cruise_ms` and ramp down by 1 ms per step to `cruise_ms`
    Ramp {
        /// Cruising delay between steps in ms
        cruise_ms: u8,
    },
    /// Fixed minimal delay, no ramp
    Fastest,
}

/// Timing and wiring snapshot for a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionProfile {
    /// Per-step timing
    pub timing: StepTiming,
    /// Use the mirrored coil line order
    pub flip_rotation: bool,
}

impl MotionProfile {
    /// Normal speed profile with the given cruising delay
    ///
    /// Delays below [`MIN_DELAY_TIME_MS`] are raised to it.
    pub const fn normal(delay_time: u8, flip_rotation: bool) -> Self {
        let cruise_ms = if delay_time < MIN_DELAY_TIME_MS {
            MIN_DELAY_TIME_MS
        } else {
            delay_time
        };
        Self {
            timing: StepTiming::Ramp { cruise_ms },
            flip_rotation,
        }
    }

    /// Fastest profile for catch-up moves
    pub const fn fastest(flip_rotation: bool) -> Self {
        Self {
            timing: StepTiming::Fastest,
            flip_rotation,
        }
    }

    /// Check if this is the fast profile
    pub const fn is_fastest(&self) -> bool {
        matches!(self.timing, StepTiming::Fastest)
    }

    /// Endless sequence of per-step delays in ms
    pub fn delays(&self) -> StepDelays {
        match self.timing {
            StepTiming::Ramp { cruise_ms } => StepDelays {
                current: cruise_ms as u32 * 3,
                cruise: cruise_ms as u32,
            },
            StepTiming::Fastest => StepDelays {
                current: FAST_STEP_DELAY_MS as u32,
                cruise: FAST_STEP_DELAY_MS as u32,
            },
        }
    }
}

/// Iterator over per-step delays, see [`MotionProfile::delays`]
#[derive(Debug, Clone)]
pub struct StepDelays {
    current: u32,
    cruise: u32,
}

impl Iterator for StepDelays {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let delay = self.current;
        if self.current > self.cruise {
            self.current -= 1;
        }
        Some(delay)
    }
}
