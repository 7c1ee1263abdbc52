//! Beat pulses derived from the shared master clock's beat counter.

/// Edge detector over the master clock's monotonically increasing beat.
///
/// The first observation after (re)arming only records a baseline. Each later
/// observation of a *different* value is one pulse, however far the counter
/// jumped.
#[derive(Debug, Default)]
pub struct ExternalClockObserver {
    last_beat: Option<i64>,
}

impl ExternalClockObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_observed(&self) -> Option<i64> {
        self.last_beat
    }

    /// Record `current_beat`. Returns true if this observation is a pulse.
    pub fn observe(&mut self, current_beat: i64) -> bool {
        let pulse = matches!(self.last_beat, Some(prev) if prev != current_beat);
        self.last_beat = Some(current_beat);
        pulse
    }

    /// Forget the baseline; the next observation re-arms without pulsing.
    pub fn disarm(&mut self) {
        self.last_beat = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_is_baseline_only() {
        let mut obs = ExternalClockObserver::new();
        assert!(!obs.observe(5));
        assert_eq!(obs.last_observed(), Some(5));
        assert!(obs.observe(6));
    }

    #[test]
    fn repeated_value_is_idempotent() {
        let mut obs = ExternalClockObserver::new();
        obs.observe(5);
        assert!(!obs.observe(5));
        assert!(!obs.observe(5));
    }

    #[test]
    fn jumps_count_as_one_pulse() {
        let mut obs = ExternalClockObserver::new();
        obs.observe(5);
        assert!(obs.observe(12));
        assert_eq!(obs.last_observed(), Some(12));
    }

    #[test]
    fn disarm_requires_new_baseline() {
        let mut obs = ExternalClockObserver::new();
        obs.observe(5);
        obs.disarm();
        assert_eq!(obs.last_observed(), None);
        assert!(!obs.observe(6));
        assert!(obs.observe(7));
    }
}
