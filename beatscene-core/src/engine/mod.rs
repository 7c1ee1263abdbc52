//! The beat-synchronized scene automation engine.
//!
//! `AutoSceneEngine` selects exactly one pulse generator for the configured
//! tempo source, feeds its pulses into the accumulator, and fires the scene
//! advance when the division is reached. All inputs arrive as `EngineEvent`s
//! through one queue and are processed serially; each processed event is
//! followed by a single reconciliation pass:
//!
//! 1. gating: disabled, empty scene list, or division <= 0 tears everything down
//! 2. generator: local timer reconciled, or master clock beat observed
//! 3. trigger: fire at most once if the threshold is reached

mod accumulator;
mod external_clock;
mod local_clock;
mod playback;

pub use accumulator::{BeatAccumulator, FireGate, TriggerDispatcher};
pub use external_clock::ExternalClockObserver;
pub use local_clock::{beat_interval, ClockSpec, LocalBeatClock, MIN_BEAT_INTERVAL};
pub use playback::{PlayToggle, PlaybackStateController};

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use beatscene_types::reduce::reduce_config;
use beatscene_types::{
    EngineConfig, EngineEvent, EnginePhase, EngineTelemetry, TempoSource, TimerId,
};

use crate::services::{ClockSource, EngineServices, FlashSink, SceneStore};
use crate::timer::{TimerService, VirtualTimers};

/// How long `is_firing` stays set after a fire.
pub const DEFAULT_FLASH_DURATION: Duration = Duration::from_millis(200);

pub struct AutoSceneEngine<T: TimerService> {
    config: EngineConfig,
    clock: Arc<dyn ClockSource>,
    scenes: Box<dyn SceneStore>,
    flash: Box<dyn FlashSink>,
    timers: T,
    local_clock: LocalBeatClock,
    observer: ExternalClockObserver,
    playback: PlaybackStateController,
    accumulator: BeatAccumulator,
    dispatcher: TriggerDispatcher,
    /// Live one-shot that clears the firing indicator.
    flash_timer: Option<TimerId>,
    flash_duration: Duration,
    queue: VecDeque<EngineEvent>,
    torn_down: bool,
}

impl<T: TimerService> AutoSceneEngine<T> {
    /// Mount an engine. The initial reconciliation runs immediately, so an
    /// enabled engine on the master clock records its baseline beat here.
    pub fn new(config: EngineConfig, services: EngineServices, timers: T) -> Self {
        let EngineServices { clock, scenes, flash } = services;
        let mut engine = Self {
            config,
            clock,
            scenes,
            flash,
            timers,
            local_clock: LocalBeatClock::new(),
            observer: ExternalClockObserver::new(),
            playback: PlaybackStateController::new(),
            accumulator: BeatAccumulator::new(),
            dispatcher: TriggerDispatcher::new(),
            flash_timer: None,
            flash_duration: DEFAULT_FLASH_DURATION,
            queue: VecDeque::new(),
            torn_down: false,
        };
        engine.reconcile();
        engine
    }

    pub fn with_flash_duration(mut self, duration: Duration) -> Self {
        self.flash_duration = duration;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timers(&self) -> &T {
        &self.timers
    }

    pub fn beat_counter(&self) -> u32 {
        self.accumulator.count()
    }

    pub fn is_firing(&self) -> bool {
        self.flash_timer.is_some()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn is_armed(&self) -> bool {
        !self.torn_down && self.config.is_armable(self.scenes.scene_count())
    }

    pub fn local_clock(&self) -> &LocalBeatClock {
        &self.local_clock
    }

    pub fn last_observed_beat(&self) -> Option<i64> {
        self.observer.last_observed()
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .is_playing(self.config.tempo_source, self.clock.as_ref())
    }

    /// BPM of the active source.
    pub fn current_bpm(&self) -> f64 {
        match self.config.local_bpm() {
            Some(bpm) => bpm,
            None => self.clock.bpm(),
        }
    }

    pub fn fires(&self) -> u64 {
        self.dispatcher.fires()
    }

    pub fn telemetry(&self) -> EngineTelemetry {
        let phase = if !self.is_armed() {
            EnginePhase::Disabled
        } else if self.is_firing() {
            EnginePhase::Firing
        } else {
            EnginePhase::Armed
        };
        EngineTelemetry {
            phase,
            tempo_source: self.config.tempo_source,
            current_bpm: self.current_bpm(),
            beat_counter: self.accumulator.count(),
            beat_division: self.config.beat_division,
            is_playing: self.is_playing(),
            is_firing: self.is_firing(),
            local_clock_running: self.local_clock.is_running(),
            fires: self.dispatcher.fires(),
        }
    }

    /// Enqueue an event without processing it.
    pub fn post(&mut self, event: EngineEvent) {
        self.queue.push_back(event);
    }

    pub fn post_all(&mut self, events: impl IntoIterator<Item = EngineEvent>) {
        self.queue.extend(events);
    }

    /// Process queued events in order. Returns how many were processed.
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Some(event) = self.queue.pop_front() {
            self.apply(event);
            processed += 1;
        }
        processed
    }

    pub fn handle(&mut self, event: EngineEvent) {
        self.post(event);
        self.process_pending();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.handle(EngineEvent::SetEnabled(enabled));
    }

    pub fn set_tempo_source(&mut self, source: TempoSource) {
        self.handle(EngineEvent::SetTempoSource(source));
    }

    pub fn set_manual_bpm(&mut self, bpm: f64) {
        self.handle(EngineEvent::SetManualBpm(bpm));
    }

    pub fn set_tap_tempo_bpm(&mut self, bpm: f64) {
        self.handle(EngineEvent::SetTapTempoBpm(bpm));
    }

    pub fn set_beat_division(&mut self, division: i32) {
        self.handle(EngineEvent::SetBeatDivision(division));
    }

    pub fn toggle_play_pause(&mut self) {
        self.handle(EngineEvent::TogglePlayPause);
    }

    pub fn reset_downbeat(&mut self) {
        self.handle(EngineEvent::ResetDownbeat);
    }

    pub fn teardown(&mut self) {
        self.handle(EngineEvent::Teardown);
    }

    fn apply(&mut self, event: EngineEvent) {
        if self.torn_down {
            log::debug!(target: "engine", "ignoring {:?} after teardown", event);
            return;
        }
        match event {
            EngineEvent::SetTempoSource(source) => self.select_source(source),
            EngineEvent::TogglePlayPause => {
                let source = self.config.tempo_source;
                match self.playback.toggle(source, self.clock.as_ref()) {
                    PlayToggle::LocalStarted => {
                        // Start on a clean phase; a stale count must not fire at once.
                        self.accumulator.reset();
                        log::debug!(target: "engine", "local playback started ({})", source);
                    }
                    PlayToggle::LocalStopped => {
                        log::debug!(target: "engine", "local playback paused ({})", source);
                    }
                    PlayToggle::Delegated => {
                        log::debug!(target: "engine", "play/pause forwarded to master clock");
                    }
                }
            }
            EngineEvent::ResetDownbeat => {
                self.accumulator.reset();
                self.flash.request_flash();
                self.start_flash();
            }
            EngineEvent::SceneListChanged | EngineEvent::ExternalClockChanged => {}
            EngineEvent::TimerFired(id) => self.on_timer(id),
            EngineEvent::Teardown => {
                self.shut_down();
                return;
            }
            edit @ (EngineEvent::SetEnabled(_)
            | EngineEvent::SetManualBpm(_)
            | EngineEvent::SetTapTempoBpm(_)
            | EngineEvent::SetBeatDivision(_)) => {
                if reduce_config(&edit, &mut self.config) {
                    log::debug!(target: "engine", "config edit {:?}", edit);
                }
            }
        }
        self.reconcile();
    }

    fn select_source(&mut self, source: TempoSource) {
        let previous = self.config.tempo_source;
        if previous == source {
            return;
        }
        self.local_clock.teardown(&mut self.timers);
        self.accumulator.reset();
        self.observer.disarm();
        self.cancel_flash();
        if !source.is_local() {
            self.playback.stop_local();
        }
        self.config.tempo_source = source;
        log::info!(target: "engine", "tempo source {} -> {}", previous, source);
    }

    fn on_timer(&mut self, id: TimerId) {
        if self.flash_timer == Some(id) {
            self.timers.cancel(id);
            self.flash_timer = None;
        } else if self.local_clock.owns(id) {
            self.accumulator.pulse();
        } else {
            log::trace!(target: "engine", "ignoring stale expiry of {}", id);
        }
    }

    fn reconcile(&mut self) {
        let scene_count = self.scenes.scene_count();
        if !self.config.is_armable(scene_count) {
            self.disarm();
            return;
        }

        match self.config.tempo_source {
            TempoSource::InternalClock => {
                self.local_clock.teardown(&mut self.timers);
                let clock = self.clock.snapshot();
                if clock.is_playing {
                    if self.observer.observe(clock.current_beat) {
                        self.accumulator.pulse();
                    }
                } else {
                    self.accumulator.reset();
                    self.observer.disarm();
                }
            }
            source @ (TempoSource::ManualBpm | TempoSource::TapTempo) => {
                self.observer.disarm();
                let desired = if self.playback.is_local_playing() {
                    self.config
                        .local_bpm()
                        .and_then(|bpm| ClockSpec::new(source, bpm, self.config.beat_division))
                } else {
                    None
                };
                self.local_clock.reconcile(desired, &mut self.timers);
            }
        }

        self.try_fire(scene_count);
    }

    fn try_fire(&mut self, scene_count: usize) {
        let gate = FireGate {
            enabled: self.config.enabled,
            scene_count,
            division: self.config.beat_division,
            playing: self.is_playing(),
        };
        if self.dispatcher.fire_if_due(
            &mut self.accumulator,
            gate,
            self.scenes.as_mut(),
            self.flash.as_mut(),
        ) {
            self.start_flash();
        }
    }

    /// Gating failed: no generator runs and progress is discarded.
    fn disarm(&mut self) {
        self.local_clock.teardown(&mut self.timers);
        self.accumulator.reset();
        self.observer.disarm();
        if self.playback.stop_local() {
            log::debug!(target: "engine", "local playback stopped: engine disarmed");
        }
    }

    fn start_flash(&mut self) {
        self.cancel_flash();
        self.flash_timer = Some(self.timers.start_once(self.flash_duration));
    }

    fn cancel_flash(&mut self) {
        if let Some(id) = self.flash_timer.take() {
            self.timers.cancel(id);
        }
    }

    fn shut_down(&mut self) {
        self.disarm();
        self.cancel_flash();
        self.queue.clear();
        self.torn_down = true;
        log::info!(
            target: "engine",
            "torn down after {} fires",
            self.dispatcher.fires()
        );
    }
}

impl AutoSceneEngine<VirtualTimers> {
    /// Virtual time since the engine was mounted.
    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Move virtual time forward by `by`, delivering every expiry due in that
    /// window through the event queue, in order.
    pub fn advance(&mut self, by: Duration) {
        let deadline = self.timers.now() + by;
        while let Some(id) = self.timers.expire_next(deadline) {
            self.handle(EngineEvent::TimerFired(id));
        }
        self.timers.settle(deadline);
    }
}
