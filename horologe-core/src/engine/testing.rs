//! Test doubles for the engine's hardware capabilities

use core::cell::Cell;

use heapless::Vec;

use super::convergence::EngineParts;
use super::handle::ClockHandle;
use crate::motion::{MotionProfile, Position};
use crate::traits::{
    CheckpointError, ChimePlayer, ClockError, PositionStore, StepperDriver, StepperError,
    TimeSource, WallTime,
};

/// One recorded `rotate` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub steps: i32,
    pub fastest: bool,
}

#[derive(Default)]
pub struct MockStepper<'h> {
    pub moves: Vec<Move, 64>,
    pub released: u32,
    pub fail: bool,
    /// Records `is_positioning()` during each rotate
    pub probe: Option<&'h ClockHandle>,
    pub positioning_seen: Vec<bool, 64>,
}

impl StepperDriver for MockStepper<'_> {
    fn rotate(&mut self, steps: i32, profile: &MotionProfile) -> Result<(), StepperError> {
        if let Some(handle) = self.probe {
            let _ = self.positioning_seen.push(handle.is_positioning());
        }
        if self.fail {
            return Err(StepperError::CoilWrite);
        }
        if steps != 0 {
            let _ = self.moves.push(Move {
                steps,
                fastest: profile.is_fastest(),
            });
        }
        Ok(())
    }

    fn release(&mut self) -> Result<(), StepperError> {
        self.released += 1;
        Ok(())
    }
}

pub struct MockClock {
    now: Cell<Option<WallTime>>,
}

impl MockClock {
    pub fn new(now: Option<WallTime>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: Option<WallTime>) {
        self.now.set(now);
    }
}

impl TimeSource for MockClock {
    fn now(&self) -> Result<WallTime, ClockError> {
        self.now.get().ok_or(ClockError::Unavailable)
    }
}

#[derive(Default)]
pub struct MockChime {
    pub played: u32,
}

impl ChimePlayer for MockChime {
    fn play_chime(&mut self) {
        self.played += 1;
    }
}

#[derive(Default)]
pub struct MockStore {
    pub saved: Vec<Position, 64>,
    pub fail: bool,
}

impl PositionStore for MockStore {
    fn save_position(&mut self, position: Position) -> Result<(), CheckpointError> {
        if self.fail {
            return Err(CheckpointError::Storage);
        }
        let _ = self.saved.push(position);
        Ok(())
    }
}

/// All four doubles together
pub struct Rig<'h> {
    pub stepper: MockStepper<'h>,
    pub clock: MockClock,
    pub chime: MockChime,
    pub store: MockStore,
}

impl<'h> Rig<'h> {
    pub fn new(now: Option<WallTime>) -> Self {
        Self {
            stepper: MockStepper::default(),
            clock: MockClock::new(now),
            chime: MockChime::default(),
            store: MockStore::default(),
        }
    }

    pub fn parts(
        &mut self,
    ) -> EngineParts<&mut MockStepper<'h>, &MockClock, &mut MockChime, &mut MockStore> {
        EngineParts {
            stepper: &mut self.stepper,
            time: &self.clock,
            chime: &mut self.chime,
            store: &mut self.store,
        }
    }
}
