//! Loading recorded sessions into the capture logs.

use anyhow::{Context, Result};
use clap::ValueEnum;
use rewind_recorder::{Record, RecordCategory, RecordingConfig, SessionRecorder, Timestamp};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

/// Which records to replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Selection {
    Commands,
    Events,
    /// Commands and events interleaved by generation time.
    #[default]
    All,
}

/// Read a JSON array of records.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse records in {}", path.display()))
}

/// Feed `records` through a recorder so capacity limits apply.
pub fn capture(records: Vec<Record>, config: RecordingConfig) -> SessionRecorder {
    let recorder = SessionRecorder::new(config);
    for record in records {
        recorder.record(record);
    }

    let commands = recorder.commands().stats();
    let events = recorder.events().stats();
    tracing::info!(
        commands = recorder.commands().len(),
        events = recorder.events().len(),
        evicted = commands.evicted + events.evicted,
        dropped = commands.dropped + events.dropped,
        "session captured"
    );
    recorder
}

/// Snapshot the selected logs for replay.
pub fn snapshot(recorder: &SessionRecorder, selection: Selection) -> Vec<Record> {
    match selection {
        Selection::Commands => recorder.command_snapshot(),
        Selection::Events => recorder.event_snapshot(),
        Selection::All => merge(recorder.command_snapshot(), recorder.event_snapshot()),
    }
}

/// Interleave two ordered sequences by generation time, commands first on ties.
fn merge(commands: Vec<Record>, events: Vec<Record>) -> Vec<Record> {
    let mut merged = Vec::with_capacity(commands.len() + events.len());
    let mut commands = commands.into_iter().peekable();
    let mut events = events.into_iter().peekable();

    loop {
        let take_command = match (commands.peek(), events.peek()) {
            (Some(c), Some(e)) => c.generated_at <= e.generated_at,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_command {
            commands.next()
        } else {
            events.next()
        };
        merged.extend(next);
    }
    merged
}

/// A short counter-app session used when no file is given.
pub fn demo_records() -> Vec<Record> {
    let event = |id, ms, source: &str, payload| {
        Record::new(id, RecordCategory::Event, source, Timestamp::from_millis(ms))
            .with_payload(payload)
    };
    let command = |id, ms, source: &str, target: &str, took_us| {
        Record::new(id, RecordCategory::Command, source, Timestamp::from_millis(ms))
            .with_target(target)
            .with_execution(
                Timestamp::from_millis(ms + 1),
                Duration::from_micros(took_us),
            )
    };

    vec![
        event(1, 0, "app", json!({"type": "mount"})),
        event(2, 420, "button#increment", json!({"type": "click"})),
        command(3, 421, "counter", "label#count", 85),
        event(4, 900, "button#increment", json!({"type": "click"})),
        command(5, 901, "counter", "label#count", 70),
        event(6, 905, "button#increment", json!({"type": "click"})),
        command(7, 906, "counter", "label#count", 64),
        event(8, 1_700, "input#step", json!({"type": "key", "key": "5"})),
        command(9, 1_702, "settings", "counter", 210),
        event(10, 2_400, "button#reset", json!({"type": "click"})),
        command(11, 2_401, "counter", "label#count", 90),
        event(12, 3_000, "app", json!({"type": "unmount"})),
    ]
}
