//! Chime output trait

/// Something that can sound the hourly chime
///
/// The tune itself (buzzer pattern, motor buzz, speaker) is up to the
/// implementation; the engine only decides when to ask for it.
pub trait ChimePlayer {
    /// Sound the chime once, blocking until it has finished
    fn play_chime(&mut self);
}

impl<T: ChimePlayer + ?Sized> ChimePlayer for &mut T {
    fn play_chime(&mut self) {
        (**self).play_chime()
    }
}
