//! Record capture: time-stamped records and the bounded logs that hold them.

mod log;
mod record;
mod session;

pub use log::{BoundedRecordLog, LogStats};
pub use record::{Record, RecordCategory, Timed, Timestamp};
pub use session::SessionRecorder;
