//! Capture front-end feeding command and event logs.

use super::{BoundedRecordLog, Record, RecordCategory, Timestamp};
use crate::config::RecordingConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Records commands and events from a live session into two bounded logs.
///
/// Timestamps are offsets from the moment the recorder was created. Both
/// logs are paused and resumed together.
#[derive(Debug)]
pub struct SessionRecorder {
    config: RecordingConfig,
    commands: BoundedRecordLog<Record>,
    events: BoundedRecordLog<Record>,
    next_id: AtomicU64,
    started: Instant,
}

impl SessionRecorder {
    /// Create a recorder with one log per category, starting the session clock now.
    pub fn new(config: RecordingConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(%err, "falling back to a capacity of 1");
        }
        let capacity = config.capacity.max(1);

        let recorder = Self {
            commands: BoundedRecordLog::new(capacity),
            events: BoundedRecordLog::new(capacity),
            next_id: AtomicU64::new(1),
            started: Instant::now(),
            config,
        };
        if recorder.config.start_paused {
            recorder.pause();
        }
        recorder
    }

    /// Configuration the recorder was created with.
    pub fn config(&self) -> &RecordingConfig {
        &self.config
    }

    /// Offset of "now" from the start of the session.
    pub fn now(&self) -> Timestamp {
        Timestamp::from_duration(self.started.elapsed())
    }

    /// Record a command that started at `executed_at` and ran for `duration`.
    ///
    /// Returns the id assigned, or `None` if capture is paused.
    pub fn record_command(
        &self,
        source: &str,
        target: Option<&str>,
        payload: Option<serde_json::Value>,
        executed_at: Timestamp,
        duration: Duration,
    ) -> Option<u64> {
        let record = self
            .build(RecordCategory::Command, source, target, payload)?
            .with_execution(executed_at, duration);
        let id = record.id;
        self.commands.append(record);
        Some(id)
    }

    /// Record an event delivered now.
    ///
    /// Returns the id assigned, or `None` if capture is paused.
    pub fn record_event(
        &self,
        source: &str,
        target: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Option<u64> {
        let record = self.build(RecordCategory::Event, source, target, payload)?;
        let id = record.id;
        self.events.append(record);
        Some(id)
    }

    /// Append a pre-built record to the log for its category.
    pub fn record(&self, record: Record) {
        self.log_for(record.category).append(record);
    }

    fn build(
        &self,
        category: RecordCategory,
        source: &str,
        target: Option<&str>,
        payload: Option<serde_json::Value>,
    ) -> Option<Record> {
        if !self.is_capturing() {
            self.log_for(category).note_dropped();
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut record = Record::new(id, category, source, self.now());
        record.target = target.map(str::to_string);
        record.payload = payload;
        Some(record)
    }

    fn log_for(&self, category: RecordCategory) -> &BoundedRecordLog<Record> {
        match category {
            RecordCategory::Command => &self.commands,
            RecordCategory::Event => &self.events,
        }
    }

    /// Stop capturing in both logs.
    pub fn pause(&self) {
        self.commands.pause();
        self.events.pause();
    }

    /// Resume capturing in both logs.
    pub fn resume(&self) {
        self.commands.resume();
        self.events.resume();
    }

    /// Whether both logs accept records.
    pub fn is_capturing(&self) -> bool {
        self.commands.is_capturing() && self.events.is_capturing()
    }

    /// Drop every captured record.
    pub fn clear(&self) {
        self.commands.clear();
        self.events.clear();
    }

    /// Command log.
    pub fn commands(&self) -> &BoundedRecordLog<Record> {
        &self.commands
    }

    /// Event log.
    pub fn events(&self) -> &BoundedRecordLog<Record> {
        &self.events
    }

    /// Copy of the command log, oldest first.
    pub fn command_snapshot(&self) -> Vec<Record> {
        self.commands.snapshot()
    }

    /// Copy of the event log, oldest first.
    pub fn event_snapshot(&self) -> Vec<Record> {
        self.events.snapshot()
    }
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new(RecordingConfig::default())
    }
}
