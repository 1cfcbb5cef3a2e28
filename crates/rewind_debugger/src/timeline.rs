//! Timeline text - position, speed and record labels for the terminal.

use rewind_recorder::{PositionController, Record, ReplayScheduler, Timestamp};

/// Width of the progress bar in characters.
pub const BAR_WIDTH: usize = 30;

/// Format a session offset as `m:ss.mmm`.
pub fn format_time(ts: Timestamp) -> String {
    let total_millis = ts.as_millis();
    let total_secs = total_millis / 1000;
    format!(
        "{}:{:02}.{:03}",
        total_secs / 60,
        total_secs % 60,
        total_millis % 1000
    )
}

/// Render `current / total` as a fixed-width bar.
pub fn progress_bar(current: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (current.min(total) * width) / total
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One status line built from the scheduler's getters.
pub fn status_line(scheduler: &ReplayScheduler<Record>) -> String {
    let (current, total) = scheduler.get_progress();
    let at = scheduler
        .record_at(scheduler.get_position())
        .map(|r| format_time(r.generated_at))
        .unwrap_or_else(|| "-:--.---".to_string());

    format!(
        "{:<9} {} {:>4}/{:<4} @ {}  {:.2}x",
        scheduler.state().label(),
        progress_bar(current, total, BAR_WIDTH),
        current,
        total,
        at,
        scheduler.get_speed()
    )
}

/// One line for an emitted record.
pub fn record_line(record: &Record, index: usize, total: usize) -> String {
    let mut line = format!(
        "[{:>4}/{}] {} {}",
        index + 1,
        total,
        format_time(record.generated_at),
        record.summary()
    );
    if !record.duration.is_zero() {
        line.push_str(&format!(" ({}us)", record.duration.as_micros()));
    }
    if let Some(payload) = &record.payload {
        line.push_str(&format!(" {payload}"));
    }
    line
}
