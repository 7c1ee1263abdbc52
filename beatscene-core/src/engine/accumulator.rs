//! Pulse counting and the fire step.

use crate::services::{FlashSink, SceneStore};

/// Counts beat pulses from whichever generator is active.
#[derive(Debug, Default)]
pub struct BeatAccumulator {
    counter: u32,
}

impl BeatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> u32 {
        self.counter
    }

    pub fn pulse(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Whether the counter has reached a positive `division`.
    pub fn reached(&self, division: i32) -> bool {
        division > 0 && self.counter >= division as u32
    }
}

/// Conditions that must all hold for a fire, independent of pulse source.
#[derive(Debug, Clone, Copy)]
pub struct FireGate {
    pub enabled: bool,
    pub scene_count: usize,
    pub division: i32,
    /// The active source's play condition.
    pub playing: bool,
}

impl FireGate {
    pub fn is_open(&self) -> bool {
        self.enabled && self.scene_count > 0 && self.division > 0 && self.playing
    }
}

/// Fires exactly once per threshold crossing.
#[derive(Debug, Default)]
pub struct TriggerDispatcher {
    fires: u64,
}

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fires(&self) -> u64 {
        self.fires
    }

    /// Flash, advance, and zero the counter if the threshold is reached and
    /// the gate is open. The counter reset is part of the same step, so a
    /// second call without new pulses cannot fire again.
    pub fn fire_if_due(
        &mut self,
        accumulator: &mut BeatAccumulator,
        gate: FireGate,
        scenes: &mut dyn SceneStore,
        flash: &mut dyn FlashSink,
    ) -> bool {
        if !gate.is_open() || !accumulator.reached(gate.division) {
            return false;
        }
        let beats = accumulator.count();
        flash.request_flash();
        scenes.request_advance();
        accumulator.reset();
        self.fires += 1;
        log::info!(
            target: "engine",
            "fire #{} after {} beats (division {})",
            self.fires, beats, gate.division
        );
        true
    }
}
