//! Position checkpoint store trait

use crate::motion::Position;

/// Errors from saving or loading a position checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CheckpointError {
    /// Underlying storage operation failed
    Storage,
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Blocking sink for position checkpoints
///
/// Called from the convergence engine before a catch-up chunk and after a
/// manual calibration, and from the control surface on explicit request.
/// The write must be durable when this returns.
pub trait PositionStore {
    /// Persist the given position
    fn save_position(&mut self, position: Position) -> Result<(), CheckpointError>;
}

impl<T: PositionStore + ?Sized> PositionStore for &mut T {
    fn save_position(&mut self, position: Position) -> Result<(), CheckpointError> {
        (**self).save_position(position)
    }
}
