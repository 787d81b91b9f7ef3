//! Wall-clock time source trait

use core::fmt::Write;

use heapless::String;

/// Minutes on the 12-hour dial
pub const DIAL_MINUTES: u32 = 12 * 60;

/// Errors from reading the wall clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// No valid time yet (RTC not set, network time not synced, ...)
    Unavailable,
}

/// Local wall-clock time of day (24-hour)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl WallTime {
    /// Create a time of day, rejecting out-of-range fields
    pub const fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour < 24 && minute < 60 && second < 60 {
            Some(Self {
                hour,
                minute,
                second,
            })
        } else {
            None
        }
    }

    /// Hour of the day (0-23)
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute of the hour (0-59)
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Second of the minute (0-59)
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Where the hands should point, in steps since 12:00
    pub const fn dial_steps(&self, steps_per_minute: u32) -> u32 {
        ((self.hour as u32 % 12) * 60 + self.minute as u32) * steps_per_minute
    }

    /// Format as 12-hour `"HH:MM"` (midnight and noon read `12`)
    pub fn to_12h_string(&self) -> String<5> {
        let hour = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        let mut s = String::new();
        // Five characters always fit
        let _ = write!(s, "{:02}:{:02}", hour, self.minute);
        s
    }
}

/// Source of local wall-clock time
///
/// The time zone and synchronisation policy belong to the implementation;
/// the engine only asks for the current local time of day.
pub trait TimeSource {
    /// Read the current local time
    fn now(&self) -> Result<WallTime, ClockError>;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now(&self) -> Result<WallTime, ClockError> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_time_rejects_out_of_range() {
        assert!(WallTime::new(23, 59, 59).is_some());
        assert!(WallTime::new(24, 0, 0).is_none());
        assert!(WallTime::new(0, 60, 0).is_none());
        assert!(WallTime::new(0, 0, 60).is_none());
    }

    #[test]
    fn test_dial_steps_folds_afternoon() {
        let morning = WallTime::new(1, 0, 0).unwrap();
        let afternoon = WallTime::new(13, 0, 0).unwrap();
        assert_eq!(morning.dial_steps(256), 15360);
        assert_eq!(afternoon.dial_steps(256), 15360);

        let noon = WallTime::new(12, 30, 0).unwrap();
        assert_eq!(noon.dial_steps(256), 30 * 256);
    }

    #[test]
    fn test_12h_string() {
        assert_eq!(WallTime::new(0, 5, 0).unwrap().to_12h_string(), "12:05");
        assert_eq!(WallTime::new(12, 0, 0).unwrap().to_12h_string(), "12:00");
        assert_eq!(WallTime::new(9, 7, 0).unwrap().to_12h_string(), "09:07");
        assert_eq!(WallTime::new(21, 45, 0).unwrap().to_12h_string(), "09:45");
    }
}
