//! EngineHandle: caller-side interface to an engine running on its own thread.
//!
//! The engine thread owns an `AutoSceneEngine<ChannelTimers>` and multiplexes
//! the command channel with every live timer receiver, so configuration edits,
//! clock notifications and beat ticks are all applied serially on that thread.

use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use beatscene_types::{EngineConfig, EngineEvent, EngineTelemetry, TempoSource, TimerId};
use crossbeam_channel::{Select, Sender};

use crate::engine::AutoSceneEngine;
use crate::services::EngineServices;
use crate::timer::ChannelTimers;

pub struct EngineHandle {
    cmd_tx: Sender<EngineEvent>,
    feedback_rx: Receiver<EngineTelemetry>,
    telemetry: EngineTelemetry,
    join_handle: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn spawn(config: EngineConfig, services: EngineServices, flash_duration: Duration) -> Self {
        let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let (feedback_tx, feedback_rx) = mpsc::channel();

        // Mounted here so the master clock baseline is the one current at spawn.
        let engine = AutoSceneEngine::new(config, services, ChannelTimers::new())
            .with_flash_duration(flash_duration);

        let join_handle = thread::spawn(move || {
            EngineThread {
                engine,
                cmd_rx,
                feedback_tx,
                last_published: None,
            }
            .run();
        });

        Self {
            cmd_tx,
            feedback_rx,
            telemetry: EngineTelemetry::default(),
            join_handle: Some(join_handle),
        }
    }

    /// Post an event to the engine thread.
    pub fn send_event(&self, event: EngineEvent) -> Result<(), String> {
        self.cmd_tx
            .send(event)
            .map_err(|_| "engine thread stopped".to_string())
    }

    fn send(&self, event: EngineEvent) {
        if let Err(e) = self.send_event(event) {
            log::warn!(target: "runtime", "event dropped: {}", e);
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.send(EngineEvent::SetEnabled(enabled));
    }

    pub fn set_tempo_source(&self, source: TempoSource) {
        self.send(EngineEvent::SetTempoSource(source));
    }

    pub fn set_manual_bpm(&self, bpm: f64) {
        self.send(EngineEvent::SetManualBpm(bpm));
    }

    pub fn set_tap_tempo_bpm(&self, bpm: f64) {
        self.send(EngineEvent::SetTapTempoBpm(bpm));
    }

    pub fn set_beat_division(&self, division: i32) {
        self.send(EngineEvent::SetBeatDivision(division));
    }

    pub fn toggle_play_pause(&self) {
        self.send(EngineEvent::TogglePlayPause);
    }

    pub fn reset_downbeat(&self) {
        self.send(EngineEvent::ResetDownbeat);
    }

    pub fn notify_scene_list_changed(&self) {
        self.send(EngineEvent::SceneListChanged);
    }

    pub fn notify_external_clock_changed(&self) {
        self.send(EngineEvent::ExternalClockChanged);
    }

    /// Pull published telemetry. Returns the newest snapshot if any arrived
    /// since the last call.
    pub fn drain_telemetry(&mut self) -> Option<EngineTelemetry> {
        let latest = self.feedback_rx.try_iter().last()?;
        self.telemetry = latest.clone();
        Some(latest)
    }

    /// Last snapshot seen by `drain_telemetry`.
    pub fn telemetry(&self) -> &EngineTelemetry {
        &self.telemetry
    }

    pub fn is_running(&self) -> bool {
        self.join_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Tear the engine down and wait for its thread to exit.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.join_handle.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineEvent::Teardown);
        if handle.join().is_err() {
            log::error!(target: "runtime", "engine thread panicked");
        }
        self.drain_telemetry();
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

enum Wake {
    Command(EngineEvent),
    Timer(TimerId),
    Disconnected,
}

struct EngineThread {
    engine: AutoSceneEngine<ChannelTimers>,
    cmd_rx: crossbeam_channel::Receiver<EngineEvent>,
    feedback_tx: mpsc::Sender<EngineTelemetry>,
    last_published: Option<EngineTelemetry>,
}

impl EngineThread {
    fn run(mut self) {
        log::debug!(target: "runtime", "engine thread started");
        self.publish();

        while !self.engine.is_torn_down() {
            match self.wait() {
                Wake::Command(event) => {
                    self.engine.post(event);
                    // Apply whatever else is already queued in one batch.
                    self.engine.post_all(self.cmd_rx.try_iter());
                    self.engine.process_pending();
                }
                Wake::Timer(id) => self.engine.handle(EngineEvent::TimerFired(id)),
                Wake::Disconnected => {
                    log::debug!(target: "runtime", "command channel closed");
                    self.engine.handle(EngineEvent::Teardown);
                }
            }
            self.publish();
        }

        log::debug!(target: "runtime", "engine thread exiting");
    }

    /// Block until a command arrives or a live timer expires.
    fn wait(&self) -> Wake {
        // Cloned so the engine is free to mutate once something is ready.
        let timers = self.engine.timers().receivers().to_vec();

        let mut sel = Select::new();
        sel.recv(&self.cmd_rx);
        for (_, rx) in &timers {
            sel.recv(rx);
        }

        let oper = sel.select();
        match oper.index() {
            0 => match oper.recv(&self.cmd_rx) {
                Ok(event) => Wake::Command(event),
                Err(_) => Wake::Disconnected,
            },
            i => {
                let (id, rx) = &timers[i - 1];
                // Timer channels have no sender to disconnect.
                let _ = oper.recv(rx);
                Wake::Timer(*id)
            }
        }
    }

    fn publish(&mut self) {
        let telemetry = self.engine.telemetry();
        if self.last_published.as_ref() == Some(&telemetry) {
            return;
        }
        if self.feedback_tx.send(telemetry.clone()).is_err() {
            log::trace!(target: "runtime", "telemetry receiver gone");
        }
        self.last_published = Some(telemetry);
    }
}
