//! Time-stamped records captured from a live session.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Offset from the start of a recording session, in microseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The start of the session.
    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000))
    }

    /// Convert an elapsed duration into a timestamp, saturating at `u64::MAX` micros.
    pub fn from_duration(elapsed: Duration) -> Self {
        Self(elapsed.as_micros().min(u64::MAX as u128) as u64)
    }

    pub const fn as_micros(self) -> u64 {
        self.0
    }

    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000
    }

    /// Interval from `earlier` to `self`, or zero if `earlier` is later.
    pub const fn saturating_sub(self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }

    pub const fn as_duration(self) -> Duration {
        Duration::from_micros(self.0)
    }

    /// Move forward by `delta`, saturating at `u64::MAX` micros.
    pub fn saturating_add(self, delta: Duration) -> Self {
        let delta = delta.as_micros().min(u64::MAX as u128) as u64;
        Self(self.0.saturating_add(delta))
    }
}

/// Anything that can be placed on a replay timeline.
pub trait Timed {
    /// When the item was originally generated.
    fn generated_at(&self) -> Timestamp;
}

/// Kind of captured record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordCategory {
    /// A command issued by the application (state update, side effect).
    Command,
    /// An input or lifecycle event delivered to a component.
    Event,
}

impl RecordCategory {
    /// Short label for timelines and status lines.
    pub fn label(self) -> &'static str {
        match self {
            RecordCategory::Command => "cmd",
            RecordCategory::Event => "evt",
        }
    }
}

/// An immutable, time-stamped unit of replay data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    pub category: RecordCategory,
    /// Component or subsystem that produced the record.
    pub source: String,
    /// Component the record was addressed to, if any.
    #[serde(default)]
    pub target: Option<String>,
    pub generated_at: Timestamp,
    pub executed_at: Timestamp,
    #[serde(default)]
    pub duration: Duration,
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl Record {
    /// Create a record that executed at the moment it was generated.
    pub fn new(
        id: u64,
        category: RecordCategory,
        source: impl Into<String>,
        generated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            category,
            source: source.into(),
            target: None,
            generated_at,
            executed_at: generated_at,
            duration: Duration::ZERO,
            payload: None,
        }
    }

    /// Set the widget or handler the record was aimed at.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set when execution started and how long it took.
    pub fn with_execution(mut self, executed_at: Timestamp, duration: Duration) -> Self {
        self.executed_at = executed_at;
        self.duration = duration;
        self
    }

    /// One-line label: `cmd source -> target`.
    pub fn summary(&self) -> String {
        match &self.target {
            Some(target) => format!("{} {} -> {}", self.category.label(), self.source, target),
            None => format!("{} {}", self.category.label(), self.source),
        }
    }
}

impl Timed for Record {
    fn generated_at(&self) -> Timestamp {
        self.generated_at
    }
}
