//! Hardware capability traits
//!
//! These traits define the interface between the clock logic and the
//! hardware (or test doubles) it drives. The engine only ever talks to
//! coils, a wall clock, a chime and a checkpoint store through them.

pub mod chime;
pub mod clock;
pub mod stepper;
pub mod store;

pub use chime::ChimePlayer;
pub use clock::{ClockError, TimeSource, WallTime};
pub use stepper::{StepperDriver, StepperError};
pub use store::{CheckpointError, PositionStore};
