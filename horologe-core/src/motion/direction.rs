//! Direction and distance between the hands and the current time
//!
//! Positions live on a circle of `max_position` steps, so "how far" always
//! has two answers. With backward movement disabled the hands only ever go
//! forward; with it enabled the shorter way round wins, ties going forward.

/// Rotation direction of the hands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise, the way time runs
    Forward,
    /// Counter-clockwise
    Backward,
}

/// Distance and direction from the hands to the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deviation {
    /// Unsigned distance in steps
    pub steps: u32,
    /// Which way to move
    pub direction: Direction,
}

impl Deviation {
    /// No movement needed
    pub const NONE: Deviation = Deviation {
        steps: 0,
        direction: Direction::Forward,
    };

    /// Check if the hands are already on target
    pub fn is_zero(&self) -> bool {
        self.steps == 0
    }

    /// Limit the distance to at most `limit` steps, keeping the direction
    pub fn clamp(self, limit: u32) -> Self {
        Self {
            steps: self.steps.min(limit),
            direction: self.direction,
        }
    }

    /// Signed step count for the stepper (negative = backward)
    pub fn signed(&self) -> i32 {
        let steps = self.steps.min(i32::MAX as u32) as i32;
        match self.direction {
            Direction::Forward => steps,
            Direction::Backward => -steps,
        }
    }
}

/// Work out how to get from `position` to `target` on a dial of `max_position` steps
///
/// Both inputs are taken modulo `max_position`.
///
/// - Backward disallowed: always forward, distance
///   `(target - position + max) mod max`.
/// - Backward allowed: the forward distance is computed with the target
///   unwrapped past 12:00 if needed; if it exceeds half the dial the hands
///   go backward by `max - forward` instead.
pub fn deviation(position: u32, target: u32, max_position: u32, allow_backward: bool) -> Deviation {
    if max_position == 0 {
        return Deviation::NONE;
    }

    let position = position % max_position;
    let target = target % max_position;

    let forward = if target >= position {
        target - position
    } else {
        target + max_position - position
    };

    if allow_backward && forward > max_position / 2 {
        Deviation {
            steps: max_position - forward,
            direction: Direction::Backward,
        }
    } else {
        Deviation {
            steps: forward,
            direction: Direction::Forward,
        }
    }
}
