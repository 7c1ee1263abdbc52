use serde::{Deserialize, Serialize};

use crate::TempoSource;

/// User-facing automation settings. The UI layer owns and edits these;
/// the engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enabled: bool,
    /// Beat pulses per scene advance. Values <= 0 disable the engine.
    pub beat_division: i32,
    pub tempo_source: TempoSource,
    pub manual_bpm: f64,
    pub tap_tempo_bpm: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            beat_division: 4,
            tempo_source: TempoSource::TapTempo,
            manual_bpm: 120.0,
            tap_tempo_bpm: 120.0,
        }
    }
}

impl EngineConfig {
    /// BPM driving the local timer, or `None` for the master clock source.
    pub fn local_bpm(&self) -> Option<f64> {
        match self.tempo_source {
            TempoSource::InternalClock => None,
            TempoSource::ManualBpm => Some(self.manual_bpm),
            TempoSource::TapTempo => Some(self.tap_tempo_bpm),
        }
    }

    /// Enabled, positive division, and something to advance through.
    pub fn is_armable(&self, scene_count: usize) -> bool {
        self.enabled && self.beat_division > 0 && scene_count > 0
    }
}

/// Read-only view of the shared master clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalClockState {
    pub is_playing: bool,
    /// Monotonically increasing beat number.
    pub current_beat: i64,
}
