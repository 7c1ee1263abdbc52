use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where beat pulses come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TempoSource {
    /// The shared master clock; pulses are edges of its beat counter.
    InternalClock,
    /// A local timer running at the manually entered BPM.
    ManualBpm,
    /// A local timer running at the BPM produced by tap tempo.
    #[default]
    TapTempo,
}

impl TempoSource {
    pub const ALL: [TempoSource; 3] = [
        TempoSource::InternalClock,
        TempoSource::ManualBpm,
        TempoSource::TapTempo,
    ];

    /// Whether this source is driven by a timer owned by the engine.
    pub fn is_local(self) -> bool {
        !matches!(self, TempoSource::InternalClock)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TempoSource::InternalClock => "internal_clock",
            TempoSource::ManualBpm => "manual_bpm",
            TempoSource::TapTempo => "tap_tempo",
        }
    }
}

impl fmt::Display for TempoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTempoSourceError(pub String);

impl fmt::Display for ParseTempoSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tempo source '{}'", self.0)
    }
}

impl std::error::Error for ParseTempoSourceError {}

impl FromStr for TempoSource {
    type Err = ParseTempoSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "internal_clock" | "internal" | "clock" => Ok(TempoSource::InternalClock),
            "manual_bpm" | "manual" => Ok(TempoSource::ManualBpm),
            "tap_tempo" | "tap" => Ok(TempoSource::TapTempo),
            _ => Err(ParseTempoSourceError(s.to_string())),
        }
    }
}
