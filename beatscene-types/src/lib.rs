//! # beatscene-types
//!
//! Shared type definitions for the beatscene automation engine.
//! Plain data only: configuration, the event vocabulary posted to the engine,
//! and the telemetry it reports back. No timing or I/O lives here.

pub mod action;
pub mod reduce;
mod state;
mod telemetry;
mod tempo;

pub use action::EngineEvent;
pub use state::{EngineConfig, ExternalClockState};
pub use telemetry::{EnginePhase, EngineTelemetry};
pub use tempo::{ParseTempoSourceError, TempoSource};

/// Handle for one scheduled timer. Ids are never reused by a timer service,
/// so an id that is no longer live identifies a stale expiry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for TimerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}
