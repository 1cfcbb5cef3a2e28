//! Direct repositioning ("scrubbing") of the replay cursor.

use super::scheduler::ReplayScheduler;

/// Seek controls for a replay cursor.
///
/// Scrubbing clamps instead of failing and never starts or stops playback.
/// During an active session the next action to fire continues from the new
/// position.
pub trait PositionController {
    /// Move to `index`, clamped into `[0, total - 1]` (or 0 when empty).
    fn scrub(&self, index: i64);

    /// Move one record forward, stopping at the last record.
    fn scrub_forward(&self);

    /// Move one record back, stopping at the first record.
    fn scrub_backward(&self);

    /// Index of the next record to emit.
    fn get_position(&self) -> usize;
}

impl<T> PositionController for ReplayScheduler<T> {
    fn scrub(&self, index: i64) {
        self.with_session(|session| {
            let total = session.total();
            session.position = if total == 0 {
                0
            } else {
                index.clamp(0, (total - 1) as i64) as usize
            };
            tracing::debug!(requested = index, position = session.position, total, "scrubbed");
        });
    }

    fn scrub_forward(&self) {
        self.with_session(|session| {
            if session.position + 1 < session.total() {
                session.position += 1;
            }
        });
    }

    fn scrub_backward(&self) {
        self.with_session(|session| {
            let total = session.total();
            if total > 0 && session.position > 0 {
                session.position = (session.position - 1).min(total - 1);
            }
        });
    }

    fn get_position(&self) -> usize {
        self.with_session(|session| session.position)
    }
}
