//! Deterministic host loop driven by virtual time.
//!
//! Stands in for a real event loop in tests and headless tools: actions
//! are queued at `now + delay` and fired in due order when virtual time is
//! advanced. No real time passes.

use super::action::{Action, ReplayMessage};
use crate::capture::{Timed, Timestamp};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// A message produced by an action fired on a [`VirtualHost`].
///
/// Continuations are scheduled by the host, so `RecordEmitted::next` is
/// always `None` here.
#[derive(Debug)]
pub struct Fired<T> {
    /// Virtual time at which the action fired.
    pub at: Timestamp,
    pub message: ReplayMessage<T>,
}

struct Scheduled<T> {
    due: Timestamp,
    seq: u64,
    action: Action<T>,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    // Reversed so the max-heap pops the earliest due action first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Virtual-time host loop for replay actions.
pub struct VirtualHost<T> {
    now: Timestamp,
    queue: BinaryHeap<Scheduled<T>>,
    next_seq: u64,
}

impl<T> VirtualHost<T> {
    /// Create an empty host at virtual time zero.
    pub fn new() -> Self {
        Self {
            now: Timestamp::zero(),
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Number of actions waiting to fire.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Due time of the earliest pending action.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.queue.peek().map(|s| s.due)
    }

    /// Queue `action` to fire after its delay.
    pub fn schedule(&mut self, action: Action<T>) {
        let due = self.now.saturating_add(action.delay());
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { due, seq, action });
    }
}

impl<T: Timed + Clone> VirtualHost<T> {
    /// Move virtual time forward by `by`, firing every action that comes due.
    pub fn advance(&mut self, by: Duration) -> Vec<Fired<T>> {
        let target = self.now.saturating_add(by);
        let mut fired = Vec::new();

        while self.next_due().is_some_and(|due| due <= target) {
            if let Some(f) = self.fire_next() {
                fired.push(f);
            }
        }

        self.now = target;
        fired
    }

    /// Fire actions in due order, jumping virtual time forward, until the
    /// queue is empty.
    pub fn run_until_idle(&mut self) -> Vec<Fired<T>> {
        let mut fired = Vec::new();
        while !self.queue.is_empty() {
            if let Some(f) = self.fire_next() {
                fired.push(f);
            }
        }
        fired
    }

    fn fire_next(&mut self) -> Option<Fired<T>> {
        let scheduled = self.queue.pop()?;
        if scheduled.due > self.now {
            self.now = scheduled.due;
        }

        let mut message = scheduled.action.fire()?;
        if let Some(next) = message.take_next() {
            self.schedule(next);
        }
        Some(Fired {
            at: self.now,
            message,
        })
    }
}

impl<T> Default for VirtualHost<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Record, RecordCategory};
    use crate::config::ReplayConfig;
    use crate::replay::ReplayScheduler;

    fn scheduler(millis: &[u64]) -> ReplayScheduler<Record> {
        let records = millis
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                Record::new(i as u64, RecordCategory::Event, "evt", Timestamp::from_millis(*ms))
            })
            .collect();
        ReplayScheduler::new(records, ReplayConfig::default())
    }

    #[test]
    fn test_run_until_idle_reproduces_spacing() {
        let scheduler = scheduler(&[0, 40, 100]);
        let mut host = VirtualHost::new();
        host.schedule(scheduler.play().unwrap());

        let fired = host.run_until_idle();
        let times: Vec<u64> = fired.iter().map(|f| f.at.as_millis()).collect();

        assert_eq!(times, vec![0, 40, 100, 100]);
        assert!(fired[3].message.is_completed());
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn test_advance_fires_only_due_actions() {
        let scheduler = scheduler(&[0, 50, 100]);
        let mut host = VirtualHost::new();
        host.schedule(scheduler.play().unwrap());

        let fired = host.advance(Duration::from_millis(10));
        assert_eq!(fired.len(), 1);
        assert_eq!(host.now(), Timestamp::from_millis(10));
        assert_eq!(host.next_due(), Some(Timestamp::from_millis(50)));

        let fired = host.advance(Duration::from_millis(40));
        assert_eq!(fired.len(), 1);
        assert_eq!(scheduler.get_progress(), (2, 3));
    }

    #[test]
    fn test_noop_actions_are_not_reported() {
        let scheduler = scheduler(&[0, 50]);
        let mut host = VirtualHost::new();
        host.schedule(scheduler.play().unwrap());
        host.advance(Duration::ZERO);

        scheduler.reset();
        let fired = host.run_until_idle();
        assert!(fired.is_empty());
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn test_equal_due_times_fire_in_schedule_order() {
        let first = scheduler(&[0]);
        let second = scheduler(&[0]);
        let mut host = VirtualHost::new();
        host.schedule(first.play().unwrap());
        host.schedule(second.play().unwrap());

        host.advance(Duration::ZERO);
        assert_eq!(first.get_progress(), (1, 1));
        assert_eq!(second.get_progress(), (1, 1));
    }
}
