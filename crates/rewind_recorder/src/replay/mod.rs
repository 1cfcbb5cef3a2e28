//! Replay engine for recorded sessions.
//!
//! This module provides:
//! - `ReplayScheduler` - Speed-scaled, pausable playback of a record snapshot
//! - `Action` - A single deferred step the host loop fires after a delay
//! - `PositionController` - Clamped scrubbing of the replay cursor
//! - `VirtualHost` - A deterministic, virtual-time host loop
//!
//! # Example
//!
//! ```ignore
//! use rewind_recorder::replay::{ReplayMessage, ReplayScheduler};
//!
//! let scheduler = ReplayScheduler::new(recorder.event_snapshot(), ReplayConfig::default());
//! scheduler.set_speed(2.0)?;
//!
//! let mut next = scheduler.play();
//! while let Some(action) = next.take() {
//!     host_sleep(action.delay());
//!     match action.fire() {
//!         Some(ReplayMessage::RecordEmitted { record, next: n, .. }) => {
//!             render(&record);
//!             next = n;
//!         }
//!         Some(ReplayMessage::Paused { .. }) | Some(ReplayMessage::Completed { .. }) | None => {}
//!     }
//! }
//! ```

mod action;
mod host;
mod position;
mod scheduler;

pub use action::{Action, ReplayMessage};
pub use host::{Fired, VirtualHost};
pub use position::PositionController;
pub use scheduler::{ReplayScheduler, ReplayState};
