//! Convergence engine
//!
//! One [`ClockEngine::cycle`] is one pass of the background loop:
//!
//! 1. A pending command is executed and nothing else happens this cycle.
//!    A step move runs one chunk of at most 1000 steps per cycle, with the
//!    catch-up pause between chunks; queued commands wait until it is done.
//! 2. While stopped, the cycle idles.
//! 3. Otherwise the wall clock is read and the hands are moved toward it:
//!    - uncalibrated: free-run forward by 1/16 minute
//!    - more than one minute off: catch up in fast chunks, checkpointing
//!      the position before each chunk
//!    - otherwise: track with the normal profile and check the chime
//!
//! Coil timing inside `rotate` blocks the caller. The pause returned in
//! [`Cycle`] is left to the caller to wait out, which is where other tasks
//! get to run.

use super::handle::ClockHandle;
use super::{
    CATCH_UP_PAUSE_MS, COMMAND_PAUSE_MS, FREE_RUN_DIVISOR, FREE_RUN_PAUSE_MS, IDLE_PAUSE_MS,
    TIME_RETRY_PAUSE_MS,
};
use crate::chime::ChimeTrigger;
use crate::command::Command;
use crate::motion::{deviation, MotionProfile, Position, MAX_FAST_MOVEMENT_STEPS};
use crate::traits::{ChimePlayer, PositionStore, StepperDriver, TimeSource};

/// Hardware the engine drives
pub struct EngineParts<M, T, C, S> {
    /// Coil driver
    pub stepper: M,
    /// Local wall clock
    pub time: T,
    /// Hourly chime output
    pub chime: C,
    /// Checkpoint sink
    pub store: S,
}

/// What a cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Executed a queued command
    Command(Command),
    /// Time-based movement is stopped
    Stopped,
    /// The wall clock had no valid time
    TimeUnavailable,
    /// Uncalibrated, nudged the hands forward
    FreeRun {
        /// Steps moved
        steps: u32,
    },
    /// Moved one fast chunk toward the target
    CatchUp {
        /// Signed steps moved
        steps: i32,
        /// Distance still left after this chunk
        remaining: u32,
    },
    /// Moved the small remaining distance at normal speed
    Tracking {
        /// Signed steps moved
        steps: i32,
        /// Whether the hourly chime sounded
        chimed: bool,
    },
    /// Moved one chunk of a pending step move
    Jog {
        /// Signed steps moved
        steps: i32,
        /// Steps of the move still left
        remaining: u32,
    },
    /// Hands already show the current time
    OnTarget,
    /// A coil write failed; the position was left unchanged
    MoveFailed,
}

/// Result of one loop pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cycle {
    /// What happened
    pub outcome: CycleOutcome,
    /// How long to wait before the next cycle, in ms
    pub pause_ms: u32,
}

impl Cycle {
    fn new(outcome: CycleOutcome, pause_ms: u32) -> Self {
        Self { outcome, pause_ms }
    }
}

/// The single consumer of the command queue and writer of the position
///
/// Obtained from [`ClockHandle::start`].
pub struct ClockEngine<'a, M, T, C, S> {
    handle: &'a ClockHandle,
    stepper: M,
    time: T,
    chime: ChimeTrigger<C>,
    store: S,
    moving: bool,
    jog_remaining: i32,
    normal: MotionProfile,
    fast: MotionProfile,
    allow_backward: bool,
}

impl<'a, M, T, C, S> ClockEngine<'a, M, T, C, S>
where
    M: StepperDriver,
    T: TimeSource,
    C: ChimePlayer,
    S: PositionStore,
{
    pub(super) fn new(handle: &'a ClockHandle, parts: EngineParts<M, T, C, S>) -> Self {
        let settings = *handle.settings();
        Self {
            handle,
            stepper: parts.stepper,
            time: parts.time,
            chime: ChimeTrigger::new(parts.chime, settings.dial(), settings.chime),
            store: parts.store,
            moving: true,
            jog_remaining: 0,
            normal: settings.normal_profile(),
            fast: settings.fast_profile(),
            allow_backward: settings.allow_backward,
        }
    }

    /// Check if time-based movement is enabled
    pub fn is_moving(&self) -> bool {
        self.moving
    }

    /// Run one pass of the loop
    pub fn cycle(&mut self) -> Cycle {
        if self.jog_remaining != 0 {
            return Cycle::new(self.jog_chunk(), CATCH_UP_PAUSE_MS);
        }

        if let Some(command) = self.handle.queue().pop() {
            debug!("Command received: {}", command);
            let pause = self.execute(command);
            return Cycle::new(CycleOutcome::Command(command), pause);
        }

        if !self.moving {
            return Cycle::new(CycleOutcome::Stopped, IDLE_PAUSE_MS);
        }

        let now = match self.time.now() {
            Ok(now) => now,
            Err(_) => {
                warn!("Failed to obtain time, retrying");
                return Cycle::new(CycleOutcome::TimeUnavailable, TIME_RETRY_PAUSE_MS);
            }
        };

        let dial = self.handle.tracker().dial();
        let target = now.dial_steps(dial.steps_per_minute());

        let local = match self.handle.tracker().position() {
            Position::Uncalibrated => return self.free_run(),
            Position::Steps(steps) => steps,
        };

        let dev = deviation(local, target, dial.max_position(), self.allow_backward);
        if dev.is_zero() {
            return Cycle::new(CycleOutcome::OnTarget, IDLE_PAUSE_MS);
        }

        if dev.steps > dial.steps_per_minute() {
            let chunk = dev.clamp(MAX_FAST_MOVEMENT_STEPS);
            debug!(
                "Catching up {} of {} steps toward {}",
                chunk.signed(),
                dev.steps,
                target
            );

            // Checkpoint the pre-move position so a power cut mid-move
            // resumes from here instead of skipping ahead
            if let Err(e) = self.store.save_position(Position::Steps(local)) {
                warn!("Checkpoint failed: {}", e);
            }

            self.handle.set_positioning(true);
            let moved = self.move_by(chunk.signed(), self.fast);
            self.handle.set_positioning(false);

            let outcome = if moved {
                CycleOutcome::CatchUp {
                    steps: chunk.signed(),
                    remaining: dev.steps - chunk.steps,
                }
            } else {
                CycleOutcome::MoveFailed
            };
            return Cycle::new(outcome, CATCH_UP_PAUSE_MS);
        }

        trace!("Tracking {} steps toward {}", dev.signed(), target);
        if !self.move_by(dev.signed(), self.normal) {
            return Cycle::new(CycleOutcome::MoveFailed, IDLE_PAUSE_MS);
        }
        let chimed = self.chime.maybe_chime(target);
        Cycle::new(
            CycleOutcome::Tracking {
                steps: dev.signed(),
                chimed,
            },
            IDLE_PAUSE_MS,
        )
    }

    fn free_run(&mut self) -> Cycle {
        let steps = self.handle.tracker().dial().steps_per_minute() / FREE_RUN_DIVISOR;
        trace!("Uncalibrated, free-running {} steps", steps);
        let outcome = if self.move_by(steps as i32, self.normal) {
            CycleOutcome::FreeRun { steps }
        } else {
            CycleOutcome::MoveFailed
        };
        Cycle::new(outcome, FREE_RUN_PAUSE_MS)
    }

    /// Apply a command, returning the pause before the next cycle
    fn execute(&mut self, command: Command) -> u32 {
        match command {
            Command::Start => self.moving = true,
            Command::Stop => {
                self.moving = false;
                if self.stepper.release().is_err() {
                    warn!("Failed to release coils");
                }
            }
            Command::StepMove(steps) => {
                if steps < 0 && !self.allow_backward {
                    debug!("Backward movement disabled, ignoring {}", steps);
                } else if steps != 0 {
                    self.jog_remaining = steps;
                    self.jog_chunk();
                    return CATCH_UP_PAUSE_MS;
                }
            }
            Command::SetPosition { hour, minute } => {
                self.handle.tracker().set_absolute(hour, minute);
                info!("Hands set to {}:{}", hour, minute);
                if let Err(e) = self.store.save_position(self.handle.tracker().position()) {
                    warn!("Checkpoint failed: {}", e);
                }
            }
        }
        COMMAND_PAUSE_MS
    }

    /// Move the next chunk of the pending step move
    ///
    /// A coil failure drops the rest of the move.
    fn jog_chunk(&mut self) -> CycleOutcome {
        let cap = MAX_FAST_MOVEMENT_STEPS as i32;
        let chunk = self.jog_remaining.clamp(-cap, cap);
        if !self.move_by(chunk, self.normal) {
            self.jog_remaining = 0;
            return CycleOutcome::MoveFailed;
        }
        self.jog_remaining -= chunk;
        CycleOutcome::Jog {
            steps: chunk,
            remaining: self.jog_remaining.unsigned_abs(),
        }
    }

    /// Rotate and account for the move; `false` if the coils failed
    fn move_by(&mut self, steps: i32, profile: MotionProfile) -> bool {
        match self.stepper.rotate(steps, &profile) {
            Ok(()) => {
                self.handle.tracker().adjust(steps);
                true
            }
            Err(e) => {
                warn!("Stepper move of {} failed: {}", steps, e);
                false
            }
        }
    }
}
