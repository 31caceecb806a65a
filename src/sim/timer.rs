//! Cancellable single-shot timers
//!
//! Timers are polled from the frame loop instead of being handed to
//! `setTimeout`, so cancelling one is just removing it from the list.
//! Each timer carries the epoch of the phase that armed it.

use serde::{Deserialize, Serialize};

/// What a timer does when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Give up waiting on slow assets
    PreloadDeadline,
    /// Reveal the confirm button after the explosion
    ConfirmDelay,
    /// Reload the page after the jumpscare
    Reload,
}

/// Identity of an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerId {
    pub kind: TimerKind,
    /// Phase epoch at arming time
    pub epoch: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingTimer {
    id: TimerId,
    due_ms: f64,
}

/// Pending timers, unordered
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<PendingTimer>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a timer. Re-arming a kind replaces the previous one.
    pub fn arm(&mut self, id: TimerId, due_ms: f64) {
        self.cancel(id.kind);
        self.pending.push(PendingTimer { id, due_ms });
    }

    /// Cancel a timer by kind. Returns true if one was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id.kind != kind);
        self.pending.len() != before
    }

    /// Cancel every timer armed during `epoch`
    pub fn cancel_epoch(&mut self, epoch: u32) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.id.epoch != epoch);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return every timer due at `now_ms`, earliest first
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimerId> {
        let mut due: Vec<PendingTimer> = Vec::new();
        self.pending.retain(|t| {
            if t.due_ms <= now_ms {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms));
        due.into_iter().map(|t| t.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(kind: TimerKind, epoch: u32) -> TimerId {
        TimerId { kind, epoch }
    }

    #[test]
    fn test_fires_once_when_due() {
        let mut timers = Timers::new();
        timers.arm(id(TimerKind::ConfirmDelay, 3), 5000.0);

        assert!(timers.take_due(4999.9).is_empty());
        assert_eq!(timers.take_due(5000.0), vec![id(TimerKind::ConfirmDelay, 3)]);
        assert!(timers.take_due(10_000.0).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut timers = Timers::new();
        timers.arm(id(TimerKind::Reload, 1), 300.0);
        timers.arm(id(TimerKind::PreloadDeadline, 1), 100.0);

        let fired: Vec<_> = timers.take_due(1000.0).into_iter().map(|t| t.kind).collect();
        assert_eq!(fired, vec![TimerKind::PreloadDeadline, TimerKind::Reload]);
    }

    #[test]
    fn test_rearm_replaces() {
        let mut timers = Timers::new();
        timers.arm(id(TimerKind::ConfirmDelay, 1), 100.0);
        timers.arm(id(TimerKind::ConfirmDelay, 2), 900.0);
        assert_eq!(timers.len(), 1);
        assert!(timers.take_due(500.0).is_empty());
    }

    #[test]
    fn test_cancel_by_epoch_and_kind() {
        let mut timers = Timers::new();
        timers.arm(id(TimerKind::PreloadDeadline, 0), 100.0);
        timers.arm(id(TimerKind::ConfirmDelay, 4), 100.0);

        assert_eq!(timers.cancel_epoch(0), 1);
        assert_eq!(timers.len(), 1);
        assert!(timers.cancel(TimerKind::ConfirmDelay));
        assert!(!timers.cancel(TimerKind::ConfirmDelay));
        assert_eq!(timers.cancel_all(), 0);
    }
}
