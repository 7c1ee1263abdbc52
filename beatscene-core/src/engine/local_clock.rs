//! Fixed-interval beat pulses for the locally timed sources.
//!
//! The timer is never retuned in place. Any change to the inputs that shaped
//! it (source, BPM, division, or whether it should run at all) tears the live
//! timer down before a replacement is created, so at most one handle is live.

use std::time::Duration;

use beatscene_types::{TempoSource, TimerId};

use crate::timer::TimerService;

/// Shortest beat a local timer will run at (60000 BPM).
pub const MIN_BEAT_INTERVAL: Duration = Duration::from_millis(1);

/// Milliseconds-per-beat for `bpm`, or `None` when the BPM cannot drive a
/// timer (non-finite, non-positive, or so extreme the interval is unusable).
pub fn beat_interval(bpm: f64) -> Option<Duration> {
    if !bpm.is_finite() || bpm <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(60.0 / bpm)
        .ok()
        .filter(|d| *d >= MIN_BEAT_INTERVAL)
}

/// Inputs a live timer was created from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSpec {
    pub source: TempoSource,
    pub bpm: f64,
    pub division: i32,
    pub interval: Duration,
}

impl ClockSpec {
    pub fn new(source: TempoSource, bpm: f64, division: i32) -> Option<Self> {
        if !source.is_local() {
            return None;
        }
        let interval = beat_interval(bpm)?;
        Some(Self {
            source,
            bpm,
            division,
            interval,
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveTimer {
    id: TimerId,
    spec: ClockSpec,
}

#[derive(Debug, Default)]
pub struct LocalBeatClock {
    live: Option<LiveTimer>,
}

impl LocalBeatClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    pub fn timer_id(&self) -> Option<TimerId> {
        self.live.map(|l| l.id)
    }

    pub fn interval(&self) -> Option<Duration> {
        self.live.map(|l| l.spec.interval)
    }

    /// Whether `id` is the live timer's handle.
    pub fn owns(&self, id: TimerId) -> bool {
        self.timer_id() == Some(id)
    }

    /// Bring the live timer in line with `desired`. Returns true if a new
    /// timer was started.
    pub fn reconcile(&mut self, desired: Option<ClockSpec>, timers: &mut dyn TimerService) -> bool {
        if self.live.map(|l| l.spec) == desired {
            return false;
        }
        self.teardown(timers);
        let Some(spec) = desired else {
            return false;
        };
        let id = timers.start_interval(spec.interval);
        log::debug!(
            target: "local_clock",
            "started {} at {:.2} bpm ({:?}/beat) as {}",
            spec.source, spec.bpm, spec.interval, id
        );
        self.live = Some(LiveTimer { id, spec });
        true
    }

    pub fn teardown(&mut self, timers: &mut dyn TimerService) {
        if let Some(live) = self.live.take() {
            timers.cancel(live.id);
            log::debug!(target: "local_clock", "stopped {}", live.id);
        }
    }
}
