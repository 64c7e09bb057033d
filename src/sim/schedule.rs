//! Deferred one-shot effects
//!
//! Effects that must happen "a little later" (a pickup jingle, advancing the
//! level) are queued here and drained once per tick. Each entry carries the
//! scheduler epoch it was created in; bumping the epoch on pause, reset or level
//! change invalidates everything queued before it.

use super::events::SoundEffect;

/// Handle to a scheduled effect, usable for individual cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle {
    id: u64,
    epoch: u64,
}

/// Effects that can be deferred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    PlaySound(SoundEffect),
    AdvanceLevel,
}

#[derive(Debug, Clone)]
struct Scheduled {
    handle: EventHandle,
    due_ms: f64,
    action: Deferred,
}

/// Queue of deferred effects keyed on simulation time
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: f64,
    epoch: u64,
    next_id: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    /// Simulation time seen by the scheduler
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Current cancellation epoch
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Queue `action` to fire once `delay_ms` of simulation time has passed
    pub fn schedule(&mut self, delay_ms: f32, action: Deferred) -> EventHandle {
        let handle = EventHandle {
            id: self.next_id,
            epoch: self.epoch,
        };
        self.next_id += 1;
        let delay = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        self.pending.push(Scheduled {
            handle,
            due_ms: self.now_ms + delay as f64,
            action,
        });
        handle
    }

    /// Cancel one effect; false if it already fired or was invalidated
    pub fn cancel(&mut self, handle: EventHandle) -> bool {
        if handle.epoch != self.epoch {
            return false;
        }
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        self.pending.len() != before
    }

    /// Invalidate everything queued so far
    pub fn cancel_all(&mut self) {
        self.epoch += 1;
        self.pending.retain(|s| s.handle.epoch == self.epoch);
    }

    /// Live effects still waiting
    pub fn pending(&self) -> usize {
        self.pending
            .iter()
            .filter(|s| s.handle.epoch == self.epoch)
            .count()
    }

    pub fn is_pending(&self, handle: EventHandle) -> bool {
        handle.epoch == self.epoch && self.pending.iter().any(|s| s.handle == handle)
    }

    /// Advance time and return due effects in due order (ties by scheduling order)
    pub fn advance(&mut self, delta_ms: f64) -> Vec<Deferred> {
        if delta_ms.is_finite() && delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }

        let epoch = self.epoch;
        let now = self.now_ms;
        let mut due: Vec<Scheduled> = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for entry in self.pending.drain(..) {
            if entry.handle.epoch != epoch {
                continue;
            }
            if entry.due_ms <= now {
                due.push(entry);
            } else {
                waiting.push(entry);
            }
        }
        self.pending = waiting;

        due.sort_by(|a, b| {
            a.due_ms
                .total_cmp(&b.due_ms)
                .then(a.handle.id.cmp(&b.handle.id))
        });
        due.into_iter().map(|s| s.action).collect()
    }
}
