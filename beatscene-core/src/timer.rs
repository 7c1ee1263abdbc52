//! Timer services.
//!
//! The engine owns exactly one `TimerService`. Timers are identified by
//! `TimerId`s that are never reused, and expiries come back to the engine as
//! `EngineEvent::TimerFired`. Two implementations:
//!
//! - [`VirtualTimers`]: deterministic virtual time, advanced explicitly.
//! - [`ChannelTimers`]: wall-clock timers backed by crossbeam tick/after
//!   channels, multiplexed by the runtime thread.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use beatscene_types::TimerId;
use crossbeam_channel::Receiver;

pub trait TimerService {
    /// Start a repeating timer. The first expiry is one `period` from now.
    fn start_interval(&mut self, period: Duration) -> TimerId;
    /// Start a timer that expires once after `delay`.
    fn start_once(&mut self, delay: Duration) -> TimerId;
    /// Cancel a timer. After this returns the id never expires again.
    /// Cancelling an unknown or already-expired id is a no-op.
    fn cancel(&mut self, id: TimerId);
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due: Duration,
    period: Option<Duration>,
}

/// Deterministic timer service driven by explicit calls to [`expire_next`].
///
/// [`expire_next`]: VirtualTimers::expire_next
#[derive(Debug, Default)]
pub struct VirtualTimers {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, Pending>,
}

impl VirtualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn live_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_live(&self, id: TimerId) -> bool {
        self.pending.contains_key(&id)
    }

    /// Pop the earliest timer due at or before `deadline`, moving virtual time
    /// to its due instant. Ties go to the lower id. Interval timers are
    /// re-armed one period later.
    pub fn expire_next(&mut self, deadline: Duration) -> Option<TimerId> {
        let (id, due) = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= deadline)
            .map(|(id, p)| (*id, p.due))
            .min_by_key(|&(id, due)| (due, id))?;

        self.now = self.now.max(due);
        match self.pending.get(&id).and_then(|p| p.period) {
            Some(period) => {
                if let Some(p) = self.pending.get_mut(&id) {
                    p.due = due + period;
                }
            }
            None => {
                self.pending.remove(&id);
            }
        }
        Some(id)
    }

    /// Move virtual time forward to `deadline` without expiring anything.
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    fn insert(&mut self, delay: Duration, period: Option<Duration>) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        self.pending.insert(
            id,
            Pending {
                due: self.now + delay,
                period,
            },
        );
        id
    }
}

impl TimerService for VirtualTimers {
    fn start_interval(&mut self, period: Duration) -> TimerId {
        // A zero period would expire forever at the same instant.
        let period = period.max(Duration::from_nanos(1));
        self.insert(period, Some(period))
    }

    fn start_once(&mut self, delay: Duration) -> TimerId {
        self.insert(delay, None)
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}

/// Wall-clock timers. Each live timer is a crossbeam receiver; the runtime
/// selects over them alongside its command channel. Cancelling drops the
/// receiver, so nothing can be delivered for that id afterwards.
#[derive(Default)]
pub struct ChannelTimers {
    next_id: u64,
    live: Vec<(TimerId, Receiver<Instant>)>,
}

impl ChannelTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receivers(&self) -> &[(TimerId, Receiver<Instant>)] {
        &self.live
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    fn insert(&mut self, rx: Receiver<Instant>) -> TimerId {
        self.next_id += 1;
        let id = TimerId::new(self.next_id);
        self.live.push((id, rx));
        id
    }
}

impl TimerService for ChannelTimers {
    fn start_interval(&mut self, period: Duration) -> TimerId {
        self.insert(crossbeam_channel::tick(period))
    }

    fn start_once(&mut self, delay: Duration) -> TimerId {
        self.insert(crossbeam_channel::after(delay))
    }

    fn cancel(&mut self, id: TimerId) {
        self.live.retain(|(live_id, _)| *live_id != id);
    }
}
