//! Stepper motor driver trait
//!
//! Abstracts the single unipolar 4-phase channel that moves the hands.

use crate::motion::MotionProfile;

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Writing a coil line failed
    CoilWrite,
}

/// Trait for stepper motor drivers
///
/// `rotate` is blocking: it owns the caller for the whole pulse train and is
/// the unit of preemption for the convergence engine. Commands are only
/// looked at between two `rotate` calls.
pub trait StepperDriver {
    /// Move `steps` steps (positive = forward) using the given timing profile
    ///
    /// A step count of zero must not touch the coils. After the last step all
    /// coil lines are de-energized.
    fn rotate(&mut self, steps: i32, profile: &MotionProfile) -> Result<(), StepperError>;

    /// De-energize all coil lines
    fn release(&mut self) -> Result<(), StepperError>;
}

impl<T: StepperDriver + ?Sized> StepperDriver for &mut T {
    fn rotate(&mut self, steps: i32, profile: &MotionProfile) -> Result<(), StepperError> {
        (**self).rotate(steps, profile)
    }

    fn release(&mut self) -> Result<(), StepperError> {
        (**self).release()
    }
}
