//! Play/pause semantics.
//!
//! For the master clock source the engine does not own play state: toggling is
//! forwarded to the clock and `is_playing` is read back from it. The local
//! sources keep a private flag.

use beatscene_types::TempoSource;

use crate::services::ClockSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayToggle {
    /// Forwarded to the master clock.
    Delegated,
    /// Local flag went to playing; the caller zeroes the counter.
    LocalStarted,
    LocalStopped,
}

#[derive(Debug, Default)]
pub struct PlaybackStateController {
    local_playing: bool,
}

impl PlaybackStateController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_local_playing(&self) -> bool {
        self.local_playing
    }

    /// Play condition for `source`.
    pub fn is_playing(&self, source: TempoSource, clock: &dyn ClockSource) -> bool {
        match source {
            TempoSource::InternalClock => clock.is_playing(),
            TempoSource::ManualBpm | TempoSource::TapTempo => self.local_playing,
        }
    }

    pub fn toggle(&mut self, source: TempoSource, clock: &dyn ClockSource) -> PlayToggle {
        if !source.is_local() {
            clock.request_toggle_play_pause();
            return PlayToggle::Delegated;
        }
        self.local_playing = !self.local_playing;
        if self.local_playing {
            PlayToggle::LocalStarted
        } else {
            PlayToggle::LocalStopped
        }
    }

    /// Force the local flag off. Returns true if it was on.
    pub fn stop_local(&mut self) -> bool {
        std::mem::replace(&mut self.local_playing, false)
    }
}
