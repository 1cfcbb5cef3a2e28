//! Deferred replay steps handed to the host loop.

use super::scheduler::ReplaySession;
use crate::capture::Timed;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A single-use continuation: "emit the next record after `delay`".
///
/// The host loop owns the timer. It waits [`Action::delay`] and then calls
/// [`Action::fire`]. Firing reads the session as it is at that moment, so
/// pauses, scrubs and speed changes made in between are honoured.
pub struct Action<T> {
    session: Arc<Mutex<ReplaySession<T>>>,
    ticket: u64,
    delay: Duration,
}

impl<T> Action<T> {
    pub(super) fn new(session: Arc<Mutex<ReplaySession<T>>>, ticket: u64, delay: Duration) -> Self {
        Self {
            session,
            ticket,
            delay,
        }
    }

    /// How long the host should wait before firing.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl<T: Timed + Clone> Action<T> {
    /// Run this step.
    ///
    /// Returns `None` when the session was reset, completed, or this action
    /// was superseded by a newer `play`/`resume`.
    pub fn fire(self) -> Option<ReplayMessage<T>> {
        let (mut message, next_delay) = self.session.lock().fire(self.ticket)?;

        if let (ReplayMessage::RecordEmitted { next, .. }, Some(delay)) = (&mut message, next_delay)
        {
            *next = Some(Action::new(self.session.clone(), self.ticket, delay));
        }
        Some(message)
    }
}

impl<T> std::fmt::Debug for Action<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("ticket", &self.ticket)
            .field("delay", &self.delay)
            .finish()
    }
}

/// Outcome of firing an [`Action`].
#[derive(Debug)]
pub enum ReplayMessage<T> {
    /// A record was replayed. `next` must be scheduled after its delay.
    RecordEmitted {
        record: T,
        index: usize,
        total: usize,
        next: Option<Action<T>>,
    },
    /// The session was paused when the action fired. Nothing advanced and
    /// the chain stops until the session is resumed.
    Paused { index: usize, total: usize },
    /// Every record has been replayed.
    Completed { total: usize },
}

impl<T> ReplayMessage<T> {
    /// Detach the continuation so the host can schedule it.
    pub fn take_next(&mut self) -> Option<Action<T>> {
        match self {
            ReplayMessage::RecordEmitted { next, .. } => next.take(),
            _ => None,
        }
    }

    /// Snapshot length of the session that produced this message.
    pub fn total(&self) -> usize {
        match self {
            ReplayMessage::RecordEmitted { total, .. }
            | ReplayMessage::Paused { total, .. }
            | ReplayMessage::Completed { total } => *total,
        }
    }

    /// Whether this message ends the session.
    pub fn is_completed(&self) -> bool {
        matches!(self, ReplayMessage::Completed { .. })
    }
}
