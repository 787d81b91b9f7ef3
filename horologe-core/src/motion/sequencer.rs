//! Coil phase sequencing for a unipolar 4-phase stepper
//!
//! The sequencer only decides which coil lines are energized for each step
//! and how long to hold them; writing the lines and waiting is left to the
//! driver so the pulse train can be checked without hardware.

use super::direction::Direction;
use super::profile::{MotionProfile, StepDelays};

/// Number of coil lines
pub const COIL_LINES: usize = 4;

/// Coil pattern for each phase, in logical line order
const PHASE_PATTERNS: [[bool; COIL_LINES]; 4] = [
    [false, false, true, false],
    [false, false, false, true],
    [true, false, false, false],
    [false, true, false, false],
];

/// Physical line receiving each logical line, normal and mirrored
const LINE_ORDER: [[usize; COIL_LINES]; 2] = [[0, 1, 2, 3], [3, 2, 1, 0]];

/// All coil lines off
pub const RELEASED: [bool; COIL_LINES] = [false; COIL_LINES];

/// One energized step: line levels by physical line, then how long to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse {
    /// Level of each physical coil line
    pub lines: [bool; COIL_LINES],
    /// Hold time after writing the lines, in ms
    pub delay_ms: u32,
}

/// Persistent phase state of the motor
///
/// The phase survives between moves so consecutive moves continue the
/// sequence instead of jumping back to phase 0.
#[derive(Debug, Clone, Default)]
pub struct PhaseSequencer {
    phase: u8,
}

impl PhaseSequencer {
    /// Create a sequencer at phase 0
    pub const fn new() -> Self {
        Self { phase: 0 }
    }

    /// Current phase (0-3)
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Advance one step and return the new phase
    pub fn step(&mut self, direction: Direction) -> u8 {
        let delta = match direction {
            Direction::Forward => 1,
            Direction::Backward => 3,
        };
        self.phase = (self.phase + delta) % 4;
        self.phase
    }

    /// Physical line levels for a phase
    pub fn lines(phase: u8, flip_rotation: bool) -> [bool; COIL_LINES] {
        let pattern = &PHASE_PATTERNS[(phase % 4) as usize];
        let order = &LINE_ORDER[flip_rotation as usize];
        let mut lines = RELEASED;
        for (logical, &physical) in order.iter().enumerate() {
            lines[physical] = pattern[logical];
        }
        lines
    }

    /// Pulse train for a move of `steps` steps
    ///
    /// The phase advances as pulses are taken from the iterator. Zero steps
    /// yields nothing and leaves the phase alone.
    pub fn pulses(&mut self, steps: i32, profile: &MotionProfile) -> Pulses<'_> {
        Pulses {
            remaining: steps.unsigned_abs(),
            // Only a positive count moves forward
            direction: if steps > 0 {
                Direction::Forward
            } else {
                Direction::Backward
            },
            flip_rotation: profile.flip_rotation,
            delays: profile.delays(),
            sequencer: self,
        }
    }
}

/// Iterator over the pulses of one move, see [`PhaseSequencer::pulses`]
pub struct Pulses<'a> {
    sequencer: &'a mut PhaseSequencer,
    remaining: u32,
    direction: Direction,
    flip_rotation: bool,
    delays: StepDelays,
}

impl Iterator for Pulses<'_> {
    type Item = Pulse;

    fn next(&mut self) -> Option<Pulse> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let phase = self.sequencer.step(self.direction);
        let delay_ms = self.delays.next().unwrap_or(0);
        Some(Pulse {
            lines: PhaseSequencer::lines(phase, self.flip_rotation),
            delay_ms,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Pulses<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror(lines: [bool; COIL_LINES]) -> [bool; COIL_LINES] {
        [lines[3], lines[2], lines[1], lines[0]]
    }

    #[test]
    fn test_forward_walks_phases() {
        let mut seq = PhaseSequencer::new();
        let profile = MotionProfile::normal(2, false);
        let pulses: heapless::Vec<Pulse, 8> = seq.pulses(5, &profile).collect();

        assert_eq!(pulses.len(), 5);
        assert_eq!(pulses[0].lines, [false, false, false, true]);
        assert_eq!(pulses[1].lines, [true, false, false, false]);
        assert_eq!(pulses[2].lines, [false, true, false, false]);
        assert_eq!(pulses[3].lines, [false, false, true, false]);
        assert_eq!(pulses[4].lines, [false, false, false, true]);
        assert_eq!(seq.phase(), 1);
    }

    #[test]
    fn test_backward_retreats() {
        let mut seq = PhaseSequencer::new();
        let profile = MotionProfile::fastest(false);
        let phases: heapless::Vec<u8, 4> = seq
            .pulses(-3, &profile)
            .map(|p| {
                PHASE_PATTERNS
                    .iter()
                    .position(|pat| *pat == p.lines)
                    .unwrap() as u8
            })
            .collect();

        assert_eq!(phases.as_slice(), &[3, 2, 1]);
        assert_eq!(seq.phase(), 1);
    }

    #[test]
    fn test_phase_persists_between_moves() {
        let mut seq = PhaseSequencer::new();
        let profile = MotionProfile::normal(2, false);
        seq.pulses(3, &profile).for_each(drop);
        seq.pulses(-1, &profile).for_each(drop);
        assert_eq!(seq.phase(), 2);
    }

    #[test]
    fn test_zero_steps_is_noop() {
        let mut seq = PhaseSequencer::new();
        seq.step(Direction::Forward);
        assert_eq!(seq.pulses(0, &MotionProfile::normal(2, false)).count(), 0);
        assert_eq!(seq.phase(), 1);
    }

    #[test]
    fn test_flip_mirrors_line_order() {
        let normal = MotionProfile::normal(2, false);
        let flipped = MotionProfile::normal(2, true);

        let mut a = PhaseSequencer::new();
        let mut b = PhaseSequencer::new();
        for (x, y) in a.pulses(9, &normal).zip(b.pulses(9, &flipped)) {
            assert_eq!(mirror(x.lines), y.lines);
            assert_eq!(x.delay_ms, y.delay_ms);
        }
        assert_eq!(a.phase(), b.phase());
    }

    #[test]
    fn test_pulse_delays_follow_profile() {
        let mut seq = PhaseSequencer::new();
        let delays: heapless::Vec<u32, 6> = seq
            .pulses(6, &MotionProfile::normal(2, false))
            .map(|p| p.delay_ms)
            .collect();
        assert_eq!(delays.as_slice(), &[6, 5, 4, 3, 2, 2]);
    }

    #[test]
    fn test_exactly_one_line_energized() {
        for phase in 0..4 {
            for flip in [false, true] {
                let on = PhaseSequencer::lines(phase, flip).iter().filter(|l| **l).count();
                assert_eq!(on, 1);
            }
        }
    }
}
