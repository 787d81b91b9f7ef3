//! ULN2003 unipolar stepper driver
//!
//! Four GPIO lines drive the Darlington array of a 28BYJ-48 style motor.
//! Each step writes one coil pattern and holds it for the profile's delay.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use horologe_core::motion::{MotionProfile, PhaseSequencer, COIL_LINES, RELEASED};
use horologe_core::traits::{StepperDriver, StepperError};

/// ULN2003 driver
///
/// `coils` are given in wiring order (IN1..IN4). The phase is kept between
/// moves so the motor never skips when a new move starts.
pub struct Uln2003<P, D> {
    coils: [P; COIL_LINES],
    delay: D,
    sequencer: PhaseSequencer,
}

impl<P: OutputPin, D: DelayNs> Uln2003<P, D> {
    /// Create a driver from four coil outputs and a blocking delay
    pub fn new(coils: [P; COIL_LINES], delay: D) -> Self {
        Self {
            coils,
            delay,
            sequencer: PhaseSequencer::new(),
        }
    }

    /// Current phase (0-3)
    pub fn phase(&self) -> u8 {
        self.sequencer.phase()
    }
}

fn write_lines<P: OutputPin>(
    coils: &mut [P; COIL_LINES],
    lines: [bool; COIL_LINES],
) -> Result<(), StepperError> {
    for (pin, level) in coils.iter_mut().zip(lines) {
        pin.set_state(PinState::from(level))
            .map_err(|_| StepperError::CoilWrite)?;
    }
    Ok(())
}

impl<P: OutputPin, D: DelayNs> StepperDriver for Uln2003<P, D> {
    fn rotate(&mut self, steps: i32, profile: &MotionProfile) -> Result<(), StepperError> {
        if steps == 0 {
            return Ok(());
        }

        let Self {
            coils,
            delay,
            sequencer,
        } = self;

        let mut result = Ok(());
        for pulse in sequencer.pulses(steps, profile) {
            if let Err(e) = write_lines(coils, pulse.lines) {
                result = Err(e);
                break;
            }
            delay.delay_ms(pulse.delay_ms);
        }

        // Power cut, also after a failed write
        let released = write_lines(coils, RELEASED);
        result.and(released)
    }

    fn release(&mut self) -> Result<(), StepperError> {
        write_lines(&mut self.coils, RELEASED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use heapless::Vec;

    /// Shared view of the four physical lines
    #[derive(Default)]
    struct Lines {
        levels: Cell<[bool; COIL_LINES]>,
        writes: Cell<u32>,
        fail_line: Cell<Option<usize>>,
    }

    struct MockPin<'a> {
        index: usize,
        lines: &'a Lines,
    }

    impl ErrorType for MockPin<'_> {
        type Error = ErrorKind;
    }

    impl OutputPin for MockPin<'_> {
        fn set_low(&mut self) -> Result<(), ErrorKind> {
            self.set(false)
        }

        fn set_high(&mut self) -> Result<(), ErrorKind> {
            self.set(true)
        }
    }

    impl MockPin<'_> {
        fn set(&mut self, high: bool) -> Result<(), ErrorKind> {
            if self.lines.fail_line.get() == Some(self.index) {
                return Err(ErrorKind::Other);
            }
            let mut levels = self.lines.levels.get();
            levels[self.index] = high;
            self.lines.levels.set(levels);
            self.lines.writes.set(self.lines.writes.get() + 1);
            Ok(())
        }
    }

    /// Snapshots the lines every time the driver holds a step
    struct RecordingDelay<'a> {
        lines: &'a Lines,
        held: Vec<([bool; COIL_LINES], u32), 32>,
    }

    impl DelayNs for RecordingDelay<'_> {
        fn delay_ns(&mut self, _ns: u32) {}

        fn delay_ms(&mut self, ms: u32) {
            let _ = self.held.push((self.lines.levels.get(), ms));
        }
    }

    fn driver(lines: &Lines) -> Uln2003<MockPin<'_>, RecordingDelay<'_>> {
        let pins = [0, 1, 2, 3].map(|index| MockPin { index, lines });
        Uln2003::new(
            pins,
            RecordingDelay {
                lines,
                held: Vec::new(),
            },
        )
    }

    #[test]
    fn test_forward_pulse_train() {
        let lines = Lines::default();
        let mut motor = driver(&lines);

        motor.rotate(3, &MotionProfile::normal(2, false)).unwrap();

        assert_eq!(
            motor.delay.held.as_slice(),
            &[
                ([false, false, false, true], 6),
                ([true, false, false, false], 5),
                ([false, true, false, false], 4),
            ]
        );
        assert_eq!(lines.levels.get(), RELEASED);
        assert_eq!(motor.phase(), 3);
    }

    #[test]
    fn test_backward_pulse_train() {
        let lines = Lines::default();
        let mut motor = driver(&lines);

        motor.rotate(-2, &MotionProfile::fastest(false)).unwrap();

        assert_eq!(
            motor.delay.held.as_slice(),
            &[
                ([false, true, false, false], 2),
                ([true, false, false, false], 2),
            ]
        );
        assert_eq!(motor.phase(), 2);
    }

    #[test]
    fn test_flipped_wiring_mirrors_lines() {
        let lines = Lines::default();
        let mut motor = driver(&lines);

        motor.rotate(1, &MotionProfile::normal(2, true)).unwrap();

        assert_eq!(
            motor.delay.held.as_slice(),
            &[([true, false, false, false], 6)]
        );
    }

    #[test]
    fn test_zero_steps_touches_nothing() {
        let lines = Lines::default();
        let mut motor = driver(&lines);

        motor.rotate(0, &MotionProfile::normal(2, false)).unwrap();

        assert_eq!(lines.writes.get(), 0);
        assert!(motor.delay.held.is_empty());
        assert_eq!(motor.phase(), 0);
    }

    #[test]
    fn test_write_failure_reported() {
        let lines = Lines::default();
        lines.fail_line.set(Some(2));
        let mut motor = driver(&lines);

        assert_eq!(
            motor.rotate(4, &MotionProfile::normal(2, false)),
            Err(StepperError::CoilWrite)
        );
        assert!(motor.delay.held.is_empty());
    }

    #[test]
    fn test_release() {
        let lines = Lines::default();
        lines.levels.set([true; COIL_LINES]);
        let mut motor = driver(&lines);

        motor.release().unwrap();
        assert_eq!(lines.levels.get(), RELEASED);
    }
}
