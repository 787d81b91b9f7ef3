//! Hands position tracking on the 12-hour dial
//!
//! The assumed mechanical position is counted in steps since 12:00 and
//! always lies in `[0, max_position)`, or is `Uncalibrated` until someone
//! tells the clock where the hands really are.

use core::fmt::Write;

use heapless::String;
use portable_atomic::{AtomicI32, Ordering};

use crate::traits::clock::DIAL_MINUTES;

/// Raw value stored for an uncalibrated position
pub const UNCALIBRATED: i32 = -1;

/// Smallest supported steps-per-minute setting
pub const MIN_STEPS_PER_MINUTE: u16 = 1;

/// Largest supported steps-per-minute setting
pub const MAX_STEPS_PER_MINUTE: u16 = 1024;

/// Assumed mechanical position of the hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    /// Nobody has told us where the hands are
    Uncalibrated,
    /// Steps since 12:00
    Steps(u32),
}

impl Position {
    /// Decode the raw form used for storage (`-1` = uncalibrated)
    pub const fn from_raw(raw: i32) -> Self {
        if raw < 0 {
            Position::Uncalibrated
        } else {
            Position::Steps(raw as u32)
        }
    }

    /// Encode to the raw storage form
    pub const fn to_raw(self) -> i32 {
        match self {
            Position::Uncalibrated => UNCALIBRATED,
            Position::Steps(steps) => steps as i32,
        }
    }

    /// Steps since 12:00, if calibrated
    pub const fn steps(self) -> Option<u32> {
        match self {
            Position::Uncalibrated => None,
            Position::Steps(steps) => Some(steps),
        }
    }

    /// Check if the position is known
    pub const fn is_calibrated(self) -> bool {
        matches!(self, Position::Steps(_))
    }
}

/// Dial geometry: how many steps make a minute and a full turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dial {
    steps_per_minute: u32,
    max_position: u32,
}

impl Dial {
    /// Create the dial for a steps-per-minute setting
    ///
    /// The setting is clamped to the supported range; validation with a
    /// proper error happens at the settings boundary.
    pub const fn new(steps_per_minute: u16) -> Self {
        let spm = if steps_per_minute < MIN_STEPS_PER_MINUTE {
            MIN_STEPS_PER_MINUTE
        } else if steps_per_minute > MAX_STEPS_PER_MINUTE {
            MAX_STEPS_PER_MINUTE
        } else {
            steps_per_minute
        };
        let spm = spm as u32;
        Self {
            steps_per_minute: spm,
            max_position: DIAL_MINUTES * spm,
        }
    }

    /// Steps for one minute of the dial
    pub const fn steps_per_minute(&self) -> u32 {
        self.steps_per_minute
    }

    /// Steps for one hour of the dial
    pub const fn steps_per_hour(&self) -> u32 {
        60 * self.steps_per_minute
    }

    /// Steps for a full 12-hour turn (exclusive upper bound of a position)
    pub const fn max_position(&self) -> u32 {
        self.max_position
    }

    /// Steps since 12:00 for a dial reading, wrapped onto the dial
    pub const fn steps_for(&self, hour: u8, minute: u8) -> u32 {
        ((hour as u32 * 60 + minute as u32) * self.steps_per_minute) % self.max_position
    }

    /// Dial reading `(hour 0-11, minute 0-59)` for a step position
    pub const fn reading(&self, steps: u32) -> (u8, u8) {
        let steps = steps % self.max_position;
        let hour = steps / self.steps_per_hour();
        let minute = (steps % self.steps_per_hour()) / self.steps_per_minute;
        (hour as u8, minute as u8)
    }

    /// Check that a raw position lies on the dial
    pub const fn contains(&self, position: Position) -> bool {
        match position {
            Position::Uncalibrated => true,
            Position::Steps(steps) => steps < self.max_position,
        }
    }
}

/// Shared hands position counter
///
/// Written only by the convergence engine, read from anywhere. Every update
/// is a single atomic store, so readers may see a stale value but never a
/// torn one. `adjust` is a load followed by a store, which is only correct
/// because there is exactly one writer.
pub struct PositionTracker {
    raw: AtomicI32,
    dial: Dial,
}

impl PositionTracker {
    /// Create an uncalibrated tracker
    pub const fn new(dial: Dial) -> Self {
        Self {
            raw: AtomicI32::new(UNCALIBRATED),
            dial,
        }
    }

    /// Create a tracker restored from a checkpoint
    ///
    /// A position that does not fit the dial (e.g. the steps-per-minute
    /// setting changed since it was saved) degrades to uncalibrated.
    pub fn with_position(dial: Dial, position: Position) -> Self {
        let tracker = Self::new(dial);
        if dial.contains(position) {
            tracker.store(position);
        } else {
            warn!("Discarding checkpoint {} outside dial", position.to_raw());
        }
        tracker
    }

    /// Dial geometry
    pub fn dial(&self) -> Dial {
        self.dial
    }

    /// Current assumed position
    pub fn position(&self) -> Position {
        Position::from_raw(self.raw.load(Ordering::Acquire))
    }

    /// Check if the position is known
    pub fn is_calibrated(&self) -> bool {
        self.position().is_calibrated()
    }

    /// Move the assumed position by `delta` steps, wrapping around the dial
    ///
    /// Ignored while uncalibrated.
    pub fn adjust(&self, delta: i32) {
        if let Position::Steps(steps) = self.position() {
            let max = self.dial.max_position() as i64;
            let next = (steps as i64 + delta as i64).rem_euclid(max);
            self.store(Position::Steps(next as u32));
        }
    }

    /// Set the absolute position from a dial reading, calibrating the clock
    ///
    /// Callers are expected to pass `hour < 12` and `minute < 60`; anything
    /// larger is wrapped onto the dial rather than stored out of range.
    pub fn set_absolute(&self, hour: u8, minute: u8) {
        self.store(Position::Steps(self.dial.steps_for(hour, minute)));
    }

    /// Dial reading of the hands, if calibrated
    pub fn hands(&self) -> Option<(u8, u8)> {
        self.position().steps().map(|steps| self.dial.reading(steps))
    }

    /// Hands position as `"H:MM"` text, hour right-aligned in two columns
    ///
    /// Hour 0 reads `12`. An uncalibrated clock reads `"--:--"`.
    pub fn hands_position(&self) -> String<5> {
        let mut s = String::new();
        match self.hands() {
            Some((hour, minute)) => {
                let hour = if hour == 0 { 12 } else { hour };
                // Five characters always fit
                let _ = write!(s, "{:>2}:{:02}", hour, minute);
            }
            None => {
                let _ = s.push_str("--:--");
            }
        }
        s
    }

    fn store(&self, position: Position) {
        self.raw.store(position.to_raw(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn calibrated(spm: u16, steps: u32) -> PositionTracker {
        PositionTracker::with_position(Dial::new(spm), Position::Steps(steps))
    }

    #[test]
    fn test_dial_geometry() {
        let dial = Dial::new(256);
        assert_eq!(dial.max_position(), 184_320);
        assert_eq!(dial.steps_per_hour(), 15_360);
        assert_eq!(dial.steps_for(1, 0), 15_360);
        assert_eq!(dial.reading(15_360 + 7 * 256 + 100), (1, 7));
    }

    #[test]
    fn test_dial_clamps_setting() {
        assert_eq!(Dial::new(0).steps_per_minute(), 1);
        assert_eq!(Dial::new(4096).steps_per_minute(), 1024);
    }

    #[test]
    fn test_raw_round_trip() {
        assert_eq!(Position::from_raw(-1), Position::Uncalibrated);
        assert_eq!(Position::from_raw(-42), Position::Uncalibrated);
        assert_eq!(Position::from_raw(10), Position::Steps(10));
        assert_eq!(Position::Uncalibrated.to_raw(), UNCALIBRATED);
    }

    #[test]
    fn test_new_tracker_is_uncalibrated() {
        let tracker = PositionTracker::new(Dial::new(256));
        assert!(!tracker.is_calibrated());
        assert_eq!(tracker.hands(), None);
        assert_eq!(tracker.hands_position(), "--:--");
    }

    #[test]
    fn test_restore_outside_dial_is_uncalibrated() {
        let tracker = calibrated(256, 184_320);
        assert!(!tracker.is_calibrated());

        let tracker = calibrated(256, 184_319);
        assert_eq!(tracker.position(), Position::Steps(184_319));
    }

    #[test]
    fn test_adjust_ignored_while_uncalibrated() {
        let tracker = PositionTracker::new(Dial::new(256));
        tracker.adjust(16);
        tracker.adjust(-16);
        assert_eq!(tracker.position(), Position::Uncalibrated);
    }

    #[test]
    fn test_adjust_wraps_both_ways() {
        let tracker = calibrated(256, 184_300);
        tracker.adjust(40);
        assert_eq!(tracker.position(), Position::Steps(20));

        tracker.adjust(-30);
        assert_eq!(tracker.position(), Position::Steps(184_310));
    }

    #[test]
    fn test_set_absolute_calibrates() {
        let tracker = PositionTracker::new(Dial::new(256));
        tracker.set_absolute(0, 0);
        assert!(tracker.is_calibrated());
        assert_eq!(tracker.position(), Position::Steps(0));

        tracker.set_absolute(3, 7);
        assert_eq!(tracker.position(), Position::Steps((3 * 60 + 7) * 256));
    }

    #[test]
    fn test_hands_position_text() {
        let tracker = calibrated(256, 0);
        assert_eq!(tracker.hands_position(), "12:00");

        tracker.set_absolute(3, 7);
        assert_eq!(tracker.hands_position(), " 3:07");

        tracker.set_absolute(11, 59);
        assert_eq!(tracker.hands_position(), "11:59");
    }

    proptest! {
        #[test]
        fn prop_adjust_stays_on_dial(
            spm in 1u16..=1024,
            start in any::<u32>(),
            deltas in prop::collection::vec(-2_000_000i32..2_000_000, 0..64),
        ) {
            let dial = Dial::new(spm);
            prop_assert_eq!(dial.max_position(), 720 * spm as u32);

            let tracker = calibrated(spm, start % dial.max_position());
            for delta in deltas {
                tracker.adjust(delta);
                let steps = tracker.position().steps().unwrap();
                prop_assert!(steps < dial.max_position());
            }
        }

        #[test]
        fn prop_adjust_inverse_returns_home(
            spm in 1u16..=1024,
            start in any::<u32>(),
            delta in -1_000_000i32..1_000_000,
        ) {
            let dial = Dial::new(spm);
            let start = start % dial.max_position();
            let tracker = calibrated(spm, start);
            tracker.adjust(delta);
            tracker.adjust(-delta);
            prop_assert_eq!(tracker.position(), Position::Steps(start));
        }
    }
}
