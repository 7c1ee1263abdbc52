//! Events posted to the automation engine.
//!
//! Every external input (a UI edit, a master clock change, a timer expiry)
//! becomes one `EngineEvent`; the engine processes them strictly in order.

use serde::{Deserialize, Serialize};

use crate::{TempoSource, TimerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    SetEnabled(bool),
    SetTempoSource(TempoSource),
    SetManualBpm(f64),
    /// New BPM reported by the tap tempo service.
    SetTapTempoBpm(f64),
    SetBeatDivision(i32),
    TogglePlayPause,
    /// Zero the beat counter and flash, without advancing.
    ResetDownbeat,
    /// The scene list changed length; re-read it.
    SceneListChanged,
    /// The master clock's beat or play state changed; re-observe it.
    ExternalClockChanged,
    TimerFired(TimerId),
    /// Unmount: cancel all timers and ignore everything afterwards.
    Teardown,
}
