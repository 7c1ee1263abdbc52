use serde::{Deserialize, Serialize};

use crate::TempoSource;

/// Coarse engine state, for status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// Disabled, empty scene list, or non-positive division.
    #[default]
    Disabled,
    /// Counting pulses (frozen while not playing).
    Armed,
    /// A fire happened and the flash indicator is still lit.
    Firing,
}

/// Read-only snapshot of engine state for the UI layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineTelemetry {
    pub phase: EnginePhase,
    pub tempo_source: TempoSource,
    pub current_bpm: f64,
    pub beat_counter: u32,
    pub beat_division: i32,
    pub is_playing: bool,
    pub is_firing: bool,
    pub local_clock_running: bool,
    /// Total fires since the engine was created.
    pub fires: u64,
}

impl EngineTelemetry {
    /// Progress through the current division in `0.0..1.0`, for a progress bar.
    pub fn progress(&self) -> f32 {
        if self.beat_division <= 0 {
            return 0.0;
        }
        (self.beat_counter as f32 / self.beat_division as f32).clamp(0.0, 1.0)
    }
}
