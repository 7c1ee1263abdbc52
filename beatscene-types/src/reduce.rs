//! Pure config reducer.
//!
//! Applies config-editing events to an `EngineConfig`. Source switching is not
//! handled here: it carries timer and counter consequences that only the
//! engine can apply.
//! Reducers do NOT:
//! - Touch timers or counters
//! - Validate values (invalid BPM or division are legal config states)

use crate::{EngineConfig, EngineEvent};

/// Apply `event` to `config`. Returns true if a field actually changed.
pub fn reduce_config(event: &EngineEvent, config: &mut EngineConfig) -> bool {
    match event {
        EngineEvent::SetEnabled(enabled) => replace(&mut config.enabled, *enabled),
        EngineEvent::SetBeatDivision(division) => replace(&mut config.beat_division, *division),
        EngineEvent::SetManualBpm(bpm) => replace_f64(&mut config.manual_bpm, *bpm),
        EngineEvent::SetTapTempoBpm(bpm) => replace_f64(&mut config.tap_tempo_bpm, *bpm),
        _ => false,
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

// Bitwise so that re-sending NaN is not reported as a change.
fn replace_f64(slot: &mut f64, value: f64) -> bool {
    if slot.to_bits() == value.to_bits() {
        return false;
    }
    *slot = value;
    true
}
