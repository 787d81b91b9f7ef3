//! Embassy async tasks
//!
//! The clock task owns the engine; the console talks to it through the
//! shared `ClockHandle`.

pub mod clock;
pub mod console;

pub use clock::{clock_task, ClockChime, ClockStepper, Engine};
pub use console::console_task;
