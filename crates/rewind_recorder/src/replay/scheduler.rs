//! Replay scheduler for host-driven playback of recorded sessions.
//!
//! The scheduler never waits. Each step of playback is an [`Action`] the
//! host loop invokes after the action's delay; firing it re-reads the live
//! session state, emits at most one message and hands back the next action.

use super::action::{Action, ReplayMessage};
use crate::capture::{BoundedRecordLog, Timed, Timestamp};
use crate::config::{validate_speed, ReplayConfig};
use crate::error::Result;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Lifecycle of a replay session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayState {
    /// Not started, or reset.
    Stopped,
    /// Emitting records.
    Playing,
    /// Paused; position is kept until resumed.
    Paused,
    /// Every record has been emitted.
    Completed,
}

impl ReplayState {
    /// Playing or paused.
    pub fn is_active(self) -> bool {
        matches!(self, ReplayState::Playing | ReplayState::Paused)
    }

    /// Lowercase name for display.
    pub fn label(self) -> &'static str {
        match self {
            ReplayState::Stopped => "stopped",
            ReplayState::Playing => "playing",
            ReplayState::Paused => "paused",
            ReplayState::Completed => "completed",
        }
    }
}

/// Mutable state shared between the scheduler and its outstanding action.
#[derive(Debug)]
pub(super) struct ReplaySession<T> {
    pub(super) snapshot: Arc<[T]>,
    pub(super) position: usize,
    pub(super) speed: f64,
    pub(super) state: ReplayState,
    /// Ticket of the one continuation allowed to emit.
    pub(super) ticket: u64,
    min_delay: Duration,
}

impl<T> ReplaySession<T> {
    pub(super) fn total(&self) -> usize {
        self.snapshot.len()
    }

    /// Invalidate whatever continuation is in flight and return a fresh ticket.
    fn next_ticket(&mut self) -> u64 {
        self.ticket = self.ticket.wrapping_add(1);
        self.ticket
    }
}

impl<T: Timed + Clone> ReplaySession<T> {
    /// Run one step of playback for the continuation holding `ticket`.
    pub(super) fn fire(&mut self, ticket: u64) -> Option<(ReplayMessage<T>, Option<Duration>)> {
        if ticket != self.ticket {
            tracing::trace!(ticket, live = self.ticket, "superseded replay action ignored");
            return None;
        }

        let total = self.total();
        match self.state {
            ReplayState::Stopped | ReplayState::Completed => return None,
            ReplayState::Paused => {
                tracing::debug!(index = self.position, total, "replay action fired while paused");
                return Some((
                    ReplayMessage::Paused {
                        index: self.position,
                        total,
                    },
                    None,
                ));
            }
            ReplayState::Playing => {}
        }

        if self.position >= total {
            self.state = ReplayState::Completed;
            tracing::debug!(total, "replay completed");
            return Some((ReplayMessage::Completed { total }, None));
        }

        let index = self.position;
        let record = self.snapshot[index].clone();
        let delay = match self.snapshot.get(index + 1) {
            Some(next) => self.scaled_delay(record.generated_at(), next.generated_at()),
            None => Duration::ZERO,
        };
        self.position += 1;

        tracing::trace!(index, total, delay_us = delay.as_micros() as u64, "record emitted");
        Some((
            ReplayMessage::RecordEmitted {
                record,
                index,
                total,
                next: None,
            },
            Some(delay),
        ))
    }

    /// Original spacing divided by the live speed, floored at the minimum tick.
    fn scaled_delay(&self, from: Timestamp, to: Timestamp) -> Duration {
        let raw = to.saturating_sub(from).as_micros() as f64;
        let micros = (raw / self.speed).round();
        let scaled = if micros < u64::MAX as f64 {
            Duration::from_micros(micros as u64)
        } else {
            Duration::MAX
        };
        scaled.max(self.min_delay)
    }
}

/// Drives replay of a fixed snapshot of records.
///
/// Cloning the scheduler yields another handle to the same session, so key
/// bindings, presentation and the host loop can all hold one.
pub struct ReplayScheduler<T> {
    session: Arc<Mutex<ReplaySession<T>>>,
}

impl<T> Clone for ReplayScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ReplayScheduler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session.lock();
        f.debug_struct("ReplayScheduler")
            .field("state", &session.state)
            .field("position", &session.position)
            .field("total", &session.total())
            .field("speed", &session.speed)
            .finish()
    }
}

impl<T: Timed + Clone> ReplayScheduler<T> {
    /// Create a scheduler over `snapshot`, which must be in temporal order.
    ///
    /// An invalid initial speed in `config` falls back to 1.0.
    pub fn new(snapshot: Vec<T>, config: ReplayConfig) -> Self {
        let speed = match validate_speed(config.initial_speed) {
            Ok(()) => config.initial_speed,
            Err(err) => {
                tracing::warn!(%err, "using a playback speed of 1.0");
                1.0
            }
        };

        Self {
            session: Arc::new(Mutex::new(ReplaySession {
                snapshot: snapshot.into(),
                position: 0,
                speed,
                state: ReplayState::Stopped,
                ticket: 0,
                min_delay: config.min_delay().max(Duration::from_micros(1)),
            })),
        }
    }

    /// Create a scheduler over a snapshot of `log`.
    pub fn from_log(log: &BoundedRecordLog<T>, config: ReplayConfig) -> Self {
        Self::new(log.snapshot(), config)
    }

    /// Replace the snapshot. Refused while a session is playing or paused.
    pub fn load(&self, snapshot: Vec<T>) -> bool {
        let mut session = self.session.lock();
        if session.state.is_active() {
            return false;
        }

        session.snapshot = snapshot.into();
        session.position = 0;
        session.state = ReplayState::Stopped;
        session.next_ticket();
        tracing::debug!(total = session.total(), "replay snapshot loaded");
        true
    }

    /// Start a session from the first record.
    ///
    /// Returns `None` if the snapshot is empty or a session is already
    /// playing or paused.
    pub fn play(&self) -> Option<Action<T>> {
        let mut session = self.session.lock();
        if session.total() == 0 || session.state.is_active() {
            return None;
        }

        session.position = 0;
        session.state = ReplayState::Playing;
        let ticket = session.next_ticket();
        tracing::debug!(total = session.total(), speed = session.speed, "replay started");
        Some(Action::new(self.session.clone(), ticket, Duration::ZERO))
    }

    /// Pause a playing session.
    ///
    /// The action already handed to the host is not cancelled; when it fires
    /// it reports [`ReplayMessage::Paused`] instead of advancing.
    pub fn pause(&self) {
        let mut session = self.session.lock();
        if session.state == ReplayState::Playing {
            session.state = ReplayState::Paused;
            tracing::debug!(index = session.position, "replay paused");
        }
    }

    /// Resume a paused session from the current position.
    ///
    /// Any scrubbing done while paused is honoured. The continuation that was
    /// in flight when the session paused is superseded and fires as a no-op.
    pub fn resume(&self) -> Option<Action<T>> {
        let mut session = self.session.lock();
        if session.state != ReplayState::Paused {
            return None;
        }

        if session.position >= session.total() {
            session.state = ReplayState::Completed;
            session.next_ticket();
            tracing::debug!(total = session.total(), "nothing left to resume, replay completed");
            return None;
        }

        session.state = ReplayState::Playing;
        let ticket = session.next_ticket();
        tracing::debug!(index = session.position, "replay resumed");
        Some(Action::new(self.session.clone(), ticket, Duration::ZERO))
    }

    /// Stop the session and rewind to the start.
    ///
    /// An action still held by the host becomes a no-op when it fires.
    pub fn reset(&self) {
        let mut session = self.session.lock();
        session.position = 0;
        session.state = ReplayState::Stopped;
        session.next_ticket();
        tracing::debug!("replay reset");
    }

    /// Change the playback speed for every delay computed from now on.
    pub fn set_speed(&self, speed: f64) -> Result<()> {
        if let Err(err) = validate_speed(speed) {
            tracing::warn!(speed, "rejected playback speed");
            return Err(err);
        }

        self.session.lock().speed = speed;
        tracing::debug!(speed, "replay speed changed");
        Ok(())
    }

    /// Copy of the record at `index` in the snapshot.
    pub fn record_at(&self, index: usize) -> Option<T> {
        self.session.lock().snapshot.get(index).cloned()
    }
}

impl<T> ReplayScheduler<T> {
    pub(super) fn with_session<R>(&self, f: impl FnOnce(&mut ReplaySession<T>) -> R) -> R {
        f(&mut self.session.lock())
    }

    /// `(position, total)`.
    pub fn get_progress(&self) -> (usize, usize) {
        let session = self.session.lock();
        (session.position, session.total())
    }

    /// Current speed multiplier.
    pub fn get_speed(&self) -> f64 {
        self.session.lock().speed
    }

    /// Whether the session is paused.
    pub fn is_paused(&self) -> bool {
        self.session.lock().state == ReplayState::Paused
    }

    /// Playing or paused.
    pub fn is_replaying(&self) -> bool {
        self.session.lock().state.is_active()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ReplayState {
        self.session.lock().state
    }

    /// Number of records in the loaded snapshot.
    pub fn snapshot_len(&self) -> usize {
        self.session.lock().total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Record, RecordCategory};
    use crate::error::ReplayError;

    fn records_at(millis: &[u64]) -> Vec<Record> {
        millis
            .iter()
            .enumerate()
            .map(|(i, ms)| {
                Record::new(
                    i as u64,
                    RecordCategory::Event,
                    format!("source{i}"),
                    Timestamp::from_millis(*ms),
                )
            })
            .collect()
    }

    fn scheduler(millis: &[u64]) -> ReplayScheduler<Record> {
        ReplayScheduler::new(records_at(millis), ReplayConfig::default())
    }

    /// Fire `action`, returning the message and the continuation.
    fn step(action: Action<Record>) -> (ReplayMessage<Record>, Option<Action<Record>>) {
        let mut message = action.fire().expect("action should emit");
        let next = message.take_next();
        (message, next)
    }

    #[test]
    fn test_play_empty_snapshot() {
        let scheduler = scheduler(&[]);
        assert!(scheduler.play().is_none());
        assert_eq!(scheduler.state(), ReplayState::Stopped);
    }

    #[test]
    fn test_play_twice_is_noop() {
        let scheduler = scheduler(&[0, 10]);
        assert!(scheduler.play().is_some());
        assert!(scheduler.play().is_none());

        scheduler.pause();
        assert!(scheduler.play().is_none());
    }

    #[test]
    fn test_first_action_is_immediate() {
        let scheduler = scheduler(&[0, 100, 200]);
        let action = scheduler.play().unwrap();
        assert_eq!(action.delay(), Duration::ZERO);

        let (message, next) = step(action);
        assert!(matches!(
            message,
            ReplayMessage::RecordEmitted { index: 0, total: 3, .. }
        ));
        assert_eq!(next.unwrap().delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_full_playback_in_order() {
        let scheduler = scheduler(&[0, 5, 5, 30]);
        let mut action = scheduler.play();
        let mut indices = Vec::new();
        let mut completed = false;

        while let Some(current) = action {
            let (message, next) = step(current);
            match message {
                ReplayMessage::RecordEmitted { index, .. } => indices.push(index),
                ReplayMessage::Completed { total } => {
                    assert_eq!(total, 4);
                    completed = true;
                }
                ReplayMessage::Paused { .. } => panic!("unexpected pause"),
            }
            action = next;
        }

        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(completed);
        assert_eq!(scheduler.state(), ReplayState::Completed);
        assert_eq!(scheduler.get_progress(), (4, 4));
    }

    #[test]
    fn test_identical_timestamps_use_minimum_delay() {
        let scheduler = scheduler(&[10, 10]);
        let (_, next) = step(scheduler.play().unwrap());
        assert_eq!(next.unwrap().delay(), Duration::from_millis(1));
    }

    #[test]
    fn test_last_record_chains_immediate_completion() {
        let scheduler = scheduler(&[0]);
        let (_, next) = step(scheduler.play().unwrap());
        let next = next.unwrap();
        assert_eq!(next.delay(), Duration::ZERO);

        let (message, after) = step(next);
        assert!(matches!(message, ReplayMessage::Completed { total: 1 }));
        assert!(after.is_none());
    }

    #[test]
    fn test_speed_scales_delay() {
        let slow = scheduler(&[0, 400]);
        slow.set_speed(0.5).unwrap();
        let (_, next) = step(slow.play().unwrap());
        assert_eq!(next.unwrap().delay(), Duration::from_millis(800));

        let fast = scheduler(&[0, 400]);
        fast.set_speed(4.0).unwrap();
        let (_, next) = step(fast.play().unwrap());
        assert_eq!(next.unwrap().delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_speed_change_applies_to_next_emission() {
        let scheduler = scheduler(&[0, 100, 200]);
        let (_, next) = step(scheduler.play().unwrap());
        assert_eq!(next.as_ref().unwrap().delay(), Duration::from_millis(100));

        scheduler.set_speed(10.0).unwrap();
        let (_, next) = step(next.unwrap());
        assert_eq!(next.unwrap().delay(), Duration::from_millis(10));
    }

    #[test]
    fn test_huge_delay_does_not_panic() {
        let scheduler = ReplayScheduler::new(
            vec![
                Record::new(0, RecordCategory::Event, "a", Timestamp::zero()),
                Record::new(1, RecordCategory::Event, "b", Timestamp::from_micros(u64::MAX)),
            ],
            ReplayConfig::default(),
        );
        scheduler.set_speed(f64::MIN_POSITIVE).unwrap();

        let (_, next) = step(scheduler.play().unwrap());
        assert_eq!(next.unwrap().delay(), Duration::MAX);
    }

    #[test]
    fn test_set_speed_rejects_non_positive() {
        let scheduler = scheduler(&[0]);
        scheduler.set_speed(3.0).unwrap();

        assert_eq!(scheduler.set_speed(0.0), Err(ReplayError::InvalidSpeed(0.0)));
        assert!(scheduler.set_speed(-1.0).is_err());
        assert!(scheduler.set_speed(f64::NAN).is_err());
        assert_eq!(scheduler.get_speed(), 3.0);
    }

    #[test]
    fn test_invalid_initial_speed_falls_back() {
        let scheduler: ReplayScheduler<Record> =
            ReplayScheduler::new(Vec::new(), ReplayConfig::default().with_speed(-2.0));
        assert_eq!(scheduler.get_speed(), 1.0);
    }

    #[test]
    fn test_pause_lets_inflight_action_report_paused() {
        let scheduler = scheduler(&[0, 100, 200]);
        let (_, next) = step(scheduler.play().unwrap());

        scheduler.pause();
        assert!(scheduler.is_paused());
        assert!(scheduler.is_replaying());

        let (message, after) = step(next.unwrap());
        assert!(matches!(
            message,
            ReplayMessage::Paused { index: 1, total: 3 }
        ));
        assert!(after.is_none());
        assert_eq!(scheduler.get_progress(), (1, 3));
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let scheduler = scheduler(&[0, 100]);
        let _action = scheduler.play().unwrap();

        scheduler.pause();
        scheduler.pause();
        assert_eq!(scheduler.state(), ReplayState::Paused);

        assert!(scheduler.resume().is_some());
        assert!(scheduler.resume().is_none());
        assert_eq!(scheduler.state(), ReplayState::Playing);
    }

    #[test]
    fn test_pause_when_not_playing_is_noop() {
        let scheduler = scheduler(&[0, 100]);
        scheduler.pause();
        assert_eq!(scheduler.state(), ReplayState::Stopped);
        assert!(scheduler.resume().is_none());
    }

    #[test]
    fn test_resume_supersedes_inflight_action() {
        let scheduler = scheduler(&[0, 100, 200]);
        let (_, stale) = step(scheduler.play().unwrap());

        scheduler.pause();
        let resumed = scheduler.resume().unwrap();

        // The wait that was in flight must not emit a duplicate.
        assert!(stale.unwrap().fire().is_none());

        let (message, _) = step(resumed);
        assert!(matches!(
            message,
            ReplayMessage::RecordEmitted { index: 1, .. }
        ));
    }

    #[test]
    fn test_resume_at_end_completes() {
        let scheduler = scheduler(&[0]);
        let (_, next) = step(scheduler.play().unwrap());
        scheduler.pause();

        let (message, _) = step(next.unwrap());
        assert!(matches!(message, ReplayMessage::Paused { index: 1, total: 1 }));

        assert!(scheduler.resume().is_none());
        assert_eq!(scheduler.state(), ReplayState::Completed);
    }

    #[test]
    fn test_reset_makes_outstanding_action_noop() {
        let scheduler = scheduler(&[0, 100]);
        let (_, next) = step(scheduler.play().unwrap());

        scheduler.reset();
        assert_eq!(scheduler.state(), ReplayState::Stopped);
        assert_eq!(scheduler.get_progress(), (0, 2));
        assert!(next.unwrap().fire().is_none());
    }

    #[test]
    fn test_stale_action_after_replay_restart() {
        let scheduler = scheduler(&[0, 100, 200]);
        let (_, stale) = step(scheduler.play().unwrap());

        scheduler.reset();
        let fresh = scheduler.play().unwrap();

        assert!(stale.unwrap().fire().is_none());
        let (message, _) = step(fresh);
        assert!(matches!(
            message,
            ReplayMessage::RecordEmitted { index: 0, .. }
        ));
    }

    #[test]
    fn test_play_after_completion_restarts() {
        let scheduler = scheduler(&[0]);
        let mut action = scheduler.play();
        while let Some(current) = action {
            action = step(current).1;
        }
        assert_eq!(scheduler.state(), ReplayState::Completed);

        let (message, _) = step(scheduler.play().unwrap());
        assert!(matches!(
            message,
            ReplayMessage::RecordEmitted { index: 0, .. }
        ));
    }

    #[test]
    fn test_load_refused_while_active() {
        let scheduler = scheduler(&[0, 100]);
        let _action = scheduler.play().unwrap();
        assert!(!scheduler.load(records_at(&[0])));

        scheduler.reset();
        assert!(scheduler.load(records_at(&[0, 1, 2])));
        assert_eq!(scheduler.snapshot_len(), 3);
    }

    #[test]
    fn test_from_log_is_isolated_from_later_appends() {
        let log = BoundedRecordLog::new(10);
        for record in records_at(&[0, 10]) {
            log.append(record);
        }

        let scheduler = ReplayScheduler::from_log(&log, ReplayConfig::default());
        log.append(Record::new(9, RecordCategory::Command, "late", Timestamp::from_millis(20)));

        assert_eq!(scheduler.snapshot_len(), 2);
        assert_eq!(scheduler.record_at(1).unwrap().source, "source1");
        assert!(scheduler.record_at(2).is_none());
    }
}
