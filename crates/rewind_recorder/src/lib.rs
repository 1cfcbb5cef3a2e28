//! Rewind Recorder
//!
//! Capture and temporal replay for recorded debugging sessions:
//!
//! - **Bounded capture**: [`BoundedRecordLog`] keeps a sliding window of the
//!   most recent records and can be paused without losing what it holds
//! - **Replay scheduling**: [`ReplayScheduler`] turns a snapshot of records
//!   into a chain of host-scheduled [`Action`]s that reproduce the original
//!   spacing, scaled by a speed multiplier
//! - **Scrubbing**: direct, clamped repositioning of the replay cursor
//!
//! The engine never sleeps and never spawns threads. Every wait is handed to
//! the host loop as an [`Action`] carrying its delay.
//!
//! # Example
//!
//! ```rust
//! use rewind_recorder::{
//!     RecordingConfig, ReplayConfig, ReplayMessage, ReplayScheduler, SessionRecorder,
//!     VirtualHost,
//! };
//!
//! let recorder = SessionRecorder::new(RecordingConfig::default());
//! recorder.record_event("button#save", None, None);
//! recorder.record_event("input#name", Some("form"), None);
//!
//! let scheduler = ReplayScheduler::new(recorder.event_snapshot(), ReplayConfig::default());
//! scheduler.set_speed(2.0).unwrap();
//!
//! let mut host = VirtualHost::new();
//! host.schedule(scheduler.play().unwrap());
//! let fired = host.run_until_idle();
//!
//! assert!(matches!(
//!     fired.last().map(|f| &f.message),
//!     Some(ReplayMessage::Completed { total: 2 })
//! ));
//! ```

pub mod capture;
pub mod config;
pub mod error;
pub mod replay;

pub use capture::{
    BoundedRecordLog, LogStats, Record, RecordCategory, SessionRecorder, Timed, Timestamp,
};
pub use config::{RecordingConfig, ReplayConfig};
pub use error::{ReplayError, Result};
pub use replay::{
    Action, Fired, PositionController, ReplayMessage, ReplayScheduler, ReplayState, VirtualHost,
};
