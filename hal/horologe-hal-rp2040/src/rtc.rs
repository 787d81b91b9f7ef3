//! RP2040 real-time clock as the wall-clock source
//!
//! The RTC is shared between the clock task (reads) and the console (sets
//! the time), so it lives behind a blocking mutex. Until the time has been
//! set the RTC is not running and every read reports `Unavailable`.

use core::cell::RefCell;

use embassy_rp::peripherals::RTC;
use embassy_rp::rtc::{DateTime, DayOfWeek, Rtc, RtcError};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use horologe_core::traits::{ClockError, TimeSource, WallTime};

/// RTC shared between tasks on the thread-mode executor
pub type SharedRtc = Mutex<ThreadModeRawMutex, RefCell<Rtc<'static, RTC>>>;

/// Date written along with a manually set time (only the time of day matters)
const EPOCH_YEAR: u16 = 2025;

/// Wall-clock source backed by the on-chip RTC
#[derive(Clone, Copy)]
pub struct RtcClock {
    rtc: &'static SharedRtc,
}

impl RtcClock {
    /// Wrap the shared RTC
    pub fn new(rtc: &'static SharedRtc) -> Self {
        Self { rtc }
    }

    /// Set the local time of day and start the RTC
    pub fn set_time(&self, time: WallTime) -> Result<(), ClockError> {
        let datetime = DateTime {
            year: EPOCH_YEAR,
            month: 1,
            day: 1,
            day_of_week: DayOfWeek::Wednesday,
            hour: time.hour(),
            minute: time.minute(),
            second: time.second(),
        };
        self.rtc
            .lock(|rtc| rtc.borrow_mut().set_datetime(datetime))
            .map_err(map_error)
    }
}

impl TimeSource for RtcClock {
    fn now(&self) -> Result<WallTime, ClockError> {
        let now = self
            .rtc
            .lock(|rtc| rtc.borrow().now())
            .map_err(map_error)?;
        WallTime::new(now.hour, now.minute, now.second).ok_or(ClockError::Unavailable)
    }
}

fn map_error(_e: RtcError) -> ClockError {
    ClockError::Unavailable
}
