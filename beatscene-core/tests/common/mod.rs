#![allow(dead_code)]
//! Shared fakes for beatscene-core integration tests.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use beatscene_core::services::{ClockSource, EngineServices, SceneStore};
use beatscene_types::{EngineConfig, TempoSource};

/// Master clock driven by the test.
#[derive(Default)]
pub struct FakeClock {
    playing: AtomicBool,
    beat: AtomicI64,
    toggles: AtomicUsize,
}

impl FakeClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, playing: bool, beat: i64) {
        self.playing.store(playing, Ordering::SeqCst);
        self.beat.store(beat, Ordering::SeqCst);
    }

    pub fn toggles(&self) -> usize {
        self.toggles.load(Ordering::SeqCst)
    }
}

impl ClockSource for FakeClock {
    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
    fn current_beat(&self) -> i64 {
        self.beat.load(Ordering::SeqCst)
    }
    fn bpm(&self) -> f64 {
        120.0
    }
    fn request_toggle_play_pause(&self) {
        self.toggles.fetch_add(1, Ordering::SeqCst);
    }
}

/// Counts what the engine asked of the scene store and flash indicator.
#[derive(Clone, Default)]
pub struct Recorder {
    pub scenes: Arc<AtomicUsize>,
    pub advances: Arc<AtomicUsize>,
    pub flashes: Arc<AtomicUsize>,
}

impl Recorder {
    pub fn with_scenes(count: usize) -> Self {
        let recorder = Self::default();
        recorder.scenes.store(count, Ordering::SeqCst);
        recorder
    }

    pub fn advances(&self) -> usize {
        self.advances.load(Ordering::SeqCst)
    }

    pub fn flashes(&self) -> usize {
        self.flashes.load(Ordering::SeqCst)
    }

    pub fn set_scenes(&self, count: usize) {
        self.scenes.store(count, Ordering::SeqCst);
    }
}

pub struct RecordingScenes(Recorder);

impl SceneStore for RecordingScenes {
    fn scene_count(&self) -> usize {
        self.0.scenes.load(Ordering::SeqCst)
    }
    fn request_advance(&mut self) {
        self.0.advances.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn services(clock: Arc<FakeClock>, recorder: &Recorder) -> EngineServices {
    let flashes = recorder.flashes.clone();
    EngineServices::new(
        clock,
        Box::new(RecordingScenes(recorder.clone())),
        Box::new(move || {
            flashes.fetch_add(1, Ordering::SeqCst);
        }),
    )
}

pub fn manual(bpm: f64, division: i32) -> EngineConfig {
    EngineConfig {
        enabled: true,
        beat_division: division,
        tempo_source: TempoSource::ManualBpm,
        manual_bpm: bpm,
        ..EngineConfig::default()
    }
}

pub fn internal(division: i32) -> EngineConfig {
    EngineConfig {
        enabled: true,
        beat_division: division,
        tempo_source: TempoSource::InternalClock,
        ..EngineConfig::default()
    }
}

/// Poll `cond` until it holds, or panic after `timeout`.
pub fn wait_until(timeout: Duration, what: &str, mut cond: impl FnMut() -> bool) {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    panic!("Timed out waiting for {}", what);
}
