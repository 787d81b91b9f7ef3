//! Clock task
//!
//! Owns the convergence engine. Each cycle blocks for the length of its coil
//! pulse train, then the task sleeps for the pause the cycle asked for.

use defmt::*;
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Timer};

use horologe_core::engine::{ClockEngine, CycleOutcome};
use horologe_drivers::chime::Buzzer;
use horologe_drivers::stepper::Uln2003;
use horologe_hal_rp2040::rtc::RtcClock;

use crate::store::StoreHandle;

/// Coil driver on four GPIO lines
pub type ClockStepper = Uln2003<Output<'static>, Delay>;

/// Buzzer on one GPIO line
pub type ClockChime = Buzzer<Output<'static>, Delay>;

/// The engine as wired on this board
pub type Engine = ClockEngine<'static, ClockStepper, RtcClock, ClockChime, StoreHandle>;

/// Clock task - runs the convergence loop forever
#[embassy_executor::task]
pub async fn clock_task(mut engine: Engine) {
    info!("Clock task started");

    loop {
        let cycle = engine.cycle();

        match cycle.outcome {
            CycleOutcome::Tracking { .. } | CycleOutcome::OnTarget | CycleOutcome::Stopped => {
                trace!("Cycle: {:?}", cycle.outcome)
            }
            outcome => debug!("Cycle: {:?}, pause {}ms", outcome, cycle.pause_ms),
        }

        if cycle.pause_ms == 0 {
            yield_now().await;
        } else {
            Timer::after_millis(u64::from(cycle.pause_ms)).await;
        }
    }
}
