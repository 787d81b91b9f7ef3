//! Passive buzzer on a GPIO line
//!
//! Tones are bit-banged as a square wave, so playing blocks the caller for
//! the length of the tune.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use horologe_core::traits::ChimePlayer;

/// One note of a tune
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Note {
    /// Pitch in Hz (0 = rest)
    pub freq_hz: u32,
    /// Length in ms
    pub duration_ms: u32,
}

impl Note {
    /// Create a note
    pub const fn new(freq_hz: u32, duration_ms: u32) -> Self {
        Self {
            freq_hz,
            duration_ms,
        }
    }
}

const QUARTER_MS: u32 = 166;
const G4: u32 = 392;
const A4: u32 = 440;
const B4: u32 = 494;
const D4: u32 = 294;

/// Hourly chime: G4 B4 A4 D4, G4 A4 B4 G4 in quarter notes
pub const CHIME_TUNE: [Note; 8] = [
    Note::new(G4, QUARTER_MS),
    Note::new(B4, QUARTER_MS),
    Note::new(A4, QUARTER_MS),
    Note::new(D4, QUARTER_MS),
    Note::new(G4, QUARTER_MS),
    Note::new(A4, QUARTER_MS),
    Note::new(B4, QUARTER_MS),
    Note::new(G4, QUARTER_MS),
];

/// Buzzer chime output
pub struct Buzzer<P, D> {
    pin: P,
    delay: D,
    tune: &'static [Note],
}

impl<P: OutputPin, D: DelayNs> Buzzer<P, D> {
    /// Create a buzzer playing [`CHIME_TUNE`]
    pub fn new(pin: P, delay: D) -> Self {
        Self::with_tune(pin, delay, &CHIME_TUNE)
    }

    /// Create a buzzer playing a custom tune
    pub fn with_tune(pin: P, delay: D, tune: &'static [Note]) -> Self {
        Self { pin, delay, tune }
    }

    /// Play a single note, leaving the pin low
    pub fn play_note(&mut self, note: Note) -> Result<(), P::Error> {
        if note.freq_hz == 0 {
            self.delay.delay_ms(note.duration_ms);
            return Ok(());
        }

        let half_period_us = 500_000 / note.freq_hz;
        // Whole periods only, so the pin always ends low
        let periods = note.duration_ms * note.freq_hz / 1000;
        for _ in 0..periods {
            self.pin.set_high()?;
            self.delay.delay_us(half_period_us);
            self.pin.set_low()?;
            self.delay.delay_us(half_period_us);
        }
        Ok(())
    }
}

impl<P: OutputPin, D: DelayNs> ChimePlayer for Buzzer<P, D> {
    fn play_chime(&mut self) {
        for &note in self.tune {
            if self.play_note(note).is_err() {
                let _ = self.pin.set_low();
                return;
            }
        }
    }
}
