//! Hourly chime trigger

use crate::motion::Dial;
use crate::traits::ChimePlayer;

/// Decides when the hourly chime sounds
///
/// The chime fires when the position lands on a whole hour that differs
/// from the last hour chimed, so revisiting the same minute never repeats it.
pub struct ChimeTrigger<C> {
    player: C,
    dial: Dial,
    enabled: bool,
    last_played_hour: Option<u32>,
}

impl<C: ChimePlayer> ChimeTrigger<C> {
    /// Create a trigger for the given dial
    pub fn new(player: C, dial: Dial, enabled: bool) -> Self {
        Self {
            player,
            dial,
            enabled,
            last_played_hour: None,
        }
    }

    /// Sound the chime if `position` is on a new whole hour
    ///
    /// Returns `true` if the chime was played.
    pub fn maybe_chime(&mut self, position: u32) -> bool {
        if !self.enabled {
            return false;
        }

        let hour = position / self.dial.steps_per_hour();
        let minute = position / self.dial.steps_per_minute();
        if minute % 60 != 0 || self.last_played_hour == Some(hour) {
            return false;
        }

        self.last_played_hour = Some(hour);
        info!("Chime for hour {}", hour);
        self.player.play_chime();
        true
    }

    /// Hour of the last chime, if any
    pub fn last_played_hour(&self) -> Option<u32> {
        self.last_played_hour
    }

    /// Check if chiming is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingPlayer {
        played: u32,
    }

    impl ChimePlayer for CountingPlayer {
        fn play_chime(&mut self) {
            self.played += 1;
        }
    }

    const SPM: u16 = 256;

    #[test]
    fn test_chimes_once_per_hour() {
        let mut trigger = ChimeTrigger::new(CountingPlayer::default(), Dial::new(SPM), true);
        let one_oclock = 15_360;

        assert!(trigger.maybe_chime(one_oclock));
        assert!(!trigger.maybe_chime(one_oclock));
        // Still inside minute 60
        assert!(!trigger.maybe_chime(one_oclock + 100));
        assert_eq!(trigger.player.played, 1);
        assert_eq!(trigger.last_played_hour(), Some(1));
    }

    #[test]
    fn test_no_chime_off_the_hour() {
        let mut trigger = ChimeTrigger::new(CountingPlayer::default(), Dial::new(SPM), true);
        assert!(!trigger.maybe_chime(15_360 + 256));
        assert!(!trigger.maybe_chime(15_360 - 1));
        assert_eq!(trigger.last_played_hour(), None);
    }

    #[test]
    fn test_next_hour_chimes_again() {
        let mut trigger = ChimeTrigger::new(CountingPlayer::default(), Dial::new(SPM), true);
        assert!(trigger.maybe_chime(0));
        assert!(trigger.maybe_chime(15_360));
        assert!(trigger.maybe_chime(2 * 15_360));
        assert_eq!(trigger.player.played, 3);
    }

    #[test]
    fn test_disabled_never_chimes() {
        let mut trigger = ChimeTrigger::new(CountingPlayer::default(), Dial::new(SPM), false);
        assert!(!trigger.maybe_chime(0));
        assert!(!trigger.is_enabled());
        assert_eq!(trigger.player.played, 0);
    }
}
