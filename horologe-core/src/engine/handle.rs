//! Control surface of the clock
//!
//! The handle is shared by reference between the convergence engine and
//! everything that submits commands or asks for status. Submissions never
//! block; status reads are single atomic loads.

use heapless::String;
use portable_atomic::{AtomicBool, Ordering};

use super::convergence::{ClockEngine, EngineParts};
use crate::command::{Command, CommandError, CommandQueue};
use crate::config::ClockSettings;
use crate::motion::{Position, PositionTracker};
use crate::traits::{
    CheckpointError, ChimePlayer, PositionStore, StepperDriver, TimeSource,
};

/// Errors from starting the convergence engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartError {
    /// The engine was already handed out
    AlreadyStarted,
}

/// Shared clock state and command entry point
pub struct ClockHandle {
    settings: ClockSettings,
    queue: CommandQueue,
    tracker: PositionTracker,
    positioning: AtomicBool,
    running: AtomicBool,
}

impl ClockHandle {
    /// Create the handle from validated settings and the restored checkpoint
    pub fn new(settings: ClockSettings, position: Position) -> Self {
        Self {
            settings,
            queue: CommandQueue::new(),
            tracker: PositionTracker::with_position(settings.dial(), position),
            positioning: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    /// Hand out the convergence engine
    ///
    /// Succeeds exactly once; commands are accepted from then on.
    pub fn start<M, T, C, S>(
        &self,
        parts: EngineParts<M, T, C, S>,
    ) -> Result<ClockEngine<'_, M, T, C, S>, StartError>
    where
        M: StepperDriver,
        T: TimeSource,
        C: ChimePlayer,
        S: PositionStore,
    {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| StartError::AlreadyStarted)?;

        info!("Clock engine started at {}", self.tracker.position().to_raw());
        Ok(ClockEngine::new(self, parts))
    }

    /// Check if the engine has been started
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Resume time-based movement
    pub fn move_start(&self) -> Result<(), CommandError> {
        self.submit(Command::Start)
    }

    /// Pause time-based movement
    pub fn move_stop(&self) -> Result<(), CommandError> {
        self.submit(Command::Stop)
    }

    /// Jog the hands by `steps` (negative = backward)
    ///
    /// The caller bounds the range. A backward jog is dropped by the engine
    /// when backward movement is disabled.
    pub fn move_steps(&self, steps: i32) -> Result<(), CommandError> {
        self.submit(Command::StepMove(steps))
    }

    /// Tell the clock the hands currently read `hour:minute`
    pub fn update_position(&self, hour: u8, minute: u8) -> Result<(), CommandError> {
        if hour >= 12 || minute >= 60 {
            return Err(CommandError::InvalidPosition);
        }
        self.submit(Command::SetPosition { hour, minute })
    }

    fn submit(&self, command: Command) -> Result<(), CommandError> {
        if !self.is_running() {
            return Err(CommandError::NotRunning);
        }
        if self.queue.push(command) {
            debug!("Queued {}", command);
            Ok(())
        } else {
            warn!("Command queue full, dropping {}", command);
            Err(CommandError::QueueFull)
        }
    }

    /// Check if the hands position is known
    pub fn is_calibrated(&self) -> bool {
        self.tracker.is_calibrated()
    }

    /// Check if a catch-up move is executing
    pub fn is_positioning(&self) -> bool {
        self.positioning.load(Ordering::Acquire)
    }

    /// Assumed hands position
    pub fn position(&self) -> Position {
        self.tracker.position()
    }

    /// Hands reading `(hour 0-11, minute 0-59)`, if calibrated
    pub fn clock_position(&self) -> Option<(u8, u8)> {
        self.tracker.hands()
    }

    /// Hands reading as `"H:MM"` text (`"12:00"`, `" 3:07"`, `"--:--"`)
    pub fn hands_position(&self) -> String<5> {
        self.tracker.hands_position()
    }

    /// Current local time as 12-hour `"HH:MM"`, if the time source has one
    pub fn current_local_time<T: TimeSource>(&self, source: &T) -> Option<String<5>> {
        source.now().ok().map(|now| now.to_12h_string())
    }

    /// Write a checkpoint of the current position
    pub fn save_position<S: PositionStore>(&self, store: &mut S) -> Result<(), CheckpointError> {
        store.save_position(self.tracker.position())
    }

    /// Settings the clock runs with
    pub fn settings(&self) -> &ClockSettings {
        &self.settings
    }

    pub(super) fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    pub(super) fn tracker(&self) -> &PositionTracker {
        &self.tracker
    }

    pub(super) fn set_positioning(&self, positioning: bool) {
        self.positioning.store(positioning, Ordering::Release);
    }
}
