//! Convergence engine and its control surface
//!
//! [`ClockHandle`] is shared with everyone; [`ClockEngine`] is handed out
//! once by [`ClockHandle::start`] and driven by a single background task.

pub mod convergence;
pub mod handle;

#[cfg(test)]
mod testing;

pub use convergence::{ClockEngine, Cycle, CycleOutcome, EngineParts};
pub use handle::{ClockHandle, StartError};

/// Pause after executing a command
pub const COMMAND_PAUSE_MS: u32 = 0;

/// Pause between catch-up chunks
pub const CATCH_UP_PAUSE_MS: u32 = 10;

/// Pause after a tracking move, or while stopped
pub const IDLE_PAUSE_MS: u32 = 1000;

/// Pause before asking an unavailable time source again
pub const TIME_RETRY_PAUSE_MS: u32 = 5000;

/// Fraction of a minute moved per free-running nudge
pub const FREE_RUN_DIVISOR: u32 = 16;

/// Pause between free-running nudges (1/16 minute)
pub const FREE_RUN_PAUSE_MS: u32 = 60_000 / FREE_RUN_DIVISOR;
