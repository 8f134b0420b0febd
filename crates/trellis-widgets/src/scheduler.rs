//! Interval Scheduler
//!
//! Virtual-time interval timers. `start_interval` hands back the only
//! handle to a timer and `clear` consumes it, so a timer cannot be cleared
//! twice or leaked behind a reused key.

use trellis_dom::NodeId;

/// Owning handle to a running interval
#[derive(Debug, PartialEq, Eq)]
pub struct TimerHandle {
    id: u64,
    owner: NodeId,
}

impl TimerHandle {
    pub fn owner(&self) -> NodeId {
        self.owner
    }
}

#[derive(Debug, Clone)]
struct Timer {
    id: u64,
    owner: NodeId,
    period: u64,
    due: u64,
}

/// Due interval, reported by [`Scheduler::pop_due`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub timer: u64,
    pub owner: NodeId,
    pub at: u64,
}

/// Interval timers over a millisecond virtual clock
#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_id: u64,
    timers: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time (ms)
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Start an interval firing every `period` ms from now
    pub fn start_interval(&mut self, owner: NodeId, period: u64) -> TimerHandle {
        let period = period.max(1);
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer {
            id,
            owner,
            period,
            due: self.now + period,
        });
        tracing::trace!("Started interval {} for {:?} every {}ms", id, owner, period);
        TimerHandle { id, owner }
    }

    /// Stop an interval. Returns false when it was already gone.
    pub fn clear(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != handle.id);
        tracing::trace!("Cleared interval {} for {:?}", handle.id, handle.owner);
        self.timers.len() != before
    }

    pub fn is_active(&self, handle: &TimerHandle) -> bool {
        self.timers.iter().any(|t| t.id == handle.id)
    }

    /// Number of running intervals owned by `owner`
    pub fn active_timers(&self, owner: NodeId) -> usize {
        self.timers.iter().filter(|t| t.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Earliest interval due at or before `until`. The clock moves to its
    /// due time and the interval is re-armed before it is reported.
    pub fn pop_due(&mut self, until: u64) -> Option<Fired> {
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.due <= until)
            .min_by_key(|t| (t.due, t.id))?;
        let fired = Fired {
            timer: timer.id,
            owner: timer.owner,
            at: timer.due,
        };
        timer.due += timer.period;
        self.now = self.now.max(fired.at);
        Some(fired)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }
}
