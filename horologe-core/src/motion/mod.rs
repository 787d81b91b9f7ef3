//! Motion of the hands
//!
//! Dial geometry and position tracking, the direction/catch-up distance
//! calculation, step timing profiles and the coil phase sequence.

pub mod direction;
pub mod position;
pub mod profile;
pub mod sequencer;

pub use direction::{deviation, Deviation, Direction};
pub use position::{Dial, Position, PositionTracker, MAX_STEPS_PER_MINUTE, MIN_STEPS_PER_MINUTE};
pub use profile::{MotionProfile, StepTiming, FAST_STEP_DELAY_MS, MAX_FAST_MOVEMENT_STEPS, MIN_DELAY_TIME_MS};
pub use sequencer::{PhaseSequencer, Pulse, Pulses, COIL_LINES, RELEASED};
