//! One-shot timers on a simulated monotonic clock.
//!
//! ┌──────────────── Timer Lifecycle ────────────────┐
//! │  schedule()  →  pending  →  pop_due()  → fired  │
//! │                    │                            │
//! │                    └──── cancel() ────→ gone    │
//! └─────────────────────────────────────────────────┘
//!
//! A timer leaves `pending` exactly once. Whichever of `pop_due` or `cancel`
//! gets there first wins, so a cancelled timer can never fire.

/// Handle to one scheduled timer. Ids are never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<E> {
    id: TimerId,
    deadline: f64,
    event: E,
}

#[derive(Debug)]
pub struct Scheduler<E> {
    now: f64,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Scheduler<E> {
    pub fn new() -> Self {
        Scheduler {
            now: 0.0,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Milliseconds elapsed on this clock
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward. Negative steps are ignored, the clock never
    /// runs backwards.
    pub fn advance(&mut self, delta_ms: f64) {
        if delta_ms > 0.0 {
            self.now += delta_ms;
        }
    }

    pub fn schedule(&mut self, delay_ms: f64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            deadline: self.now + delay_ms.max(0.0),
            event,
        });
        id
    }

    /// Returns `true` if the timer was still pending. Cancelling twice, or
    /// cancelling a timer that already fired, is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|timer| timer.id != id);
        self.pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|timer| timer.id == id)
    }

    /// Remove and return the earliest due timer, ties broken by creation
    /// order. Call in a loop so that a handler cancelling another due timer
    /// takes effect before that timer is popped.
    pub fn pop_due(&mut self) -> Option<(TimerId, E)> {
        let now = self.now;
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by(|(_, a), (_, b)| {
                a.deadline
                    .total_cmp(&b.deadline)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|(index, _)| index)?;
        let timer = self.pending.remove(index);
        Some((timer.id, timer.event))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}
