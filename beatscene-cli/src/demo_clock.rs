//! A stand-in master clock driven from the command line.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use beatscene_core::ClockSource;

pub struct DemoClock {
    playing: AtomicBool,
    beat: AtomicI64,
    /// f64 bits
    bpm: AtomicU64,
}

impl DemoClock {
    pub fn new(bpm: f64) -> Self {
        Self {
            playing: AtomicBool::new(false),
            beat: AtomicI64::new(0),
            bpm: AtomicU64::new(bpm.to_bits()),
        }
    }

    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    /// Step to the next beat and return it.
    pub fn step_beat(&self) -> i64 {
        self.beat.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn set_bpm(&self, bpm: f64) {
        self.bpm.store(bpm.to_bits(), Ordering::SeqCst);
    }
}

impl ClockSource for DemoClock {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn current_beat(&self) -> i64 {
        self.beat.load(Ordering::SeqCst)
    }

    fn bpm(&self) -> f64 {
        f64::from_bits(self.bpm.load(Ordering::SeqCst))
    }

    fn request_toggle_play_pause(&self) {
        let was = self.playing.fetch_xor(true, Ordering::SeqCst);
        log::info!(target: "clock", "master clock {}", if was { "stopped" } else { "playing" });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_transport() {
        let clock = DemoClock::new(120.0);
        clock.request_toggle_play_pause();
        assert!(clock.is_playing());
        clock.request_toggle_play_pause();
        assert!(!clock.is_playing());
    }

    #[test]
    fn beats_and_bpm() {
        let clock = DemoClock::new(128.0);
        assert_eq!(clock.step_beat(), 1);
        assert_eq!(clock.step_beat(), 2);
        assert_eq!(clock.snapshot().current_beat, 2);
        clock.set_bpm(90.5);
        assert_eq!(clock.bpm(), 90.5);
    }
}
