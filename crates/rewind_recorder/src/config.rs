//! Recording and replay configuration.

use crate::error::{ReplayError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for capturing records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Maximum number of records kept per log. Older records are evicted.
    pub capacity: usize,
    /// Start with capture paused.
    pub start_paused: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            start_paused: false,
        }
    }
}

impl RecordingConfig {
    /// Create a small config for tests and short sessions.
    pub fn minimal() -> Self {
        Self {
            capacity: 100,
            start_paused: false,
        }
    }

    /// Set the per-log capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Start with capture paused.
    pub fn paused(mut self) -> Self {
        self.start_paused = true;
        self
    }

    /// Check that the config can back a recorder.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ReplayError::InvalidConfig(
                "recording capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the replay scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// Initial playback speed (1.0 = as recorded).
    pub initial_speed: f64,
    /// Shortest wait handed to the host between two records (microseconds).
    pub min_delay_us: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            initial_speed: 1.0,
            min_delay_us: 1_000, // 1ms
        }
    }
}

impl ReplayConfig {
    /// Set the initial playback speed.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.initial_speed = speed;
        self
    }

    /// Set the minimum inter-record delay.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay_us = min_delay.as_micros().min(u64::MAX as u128) as u64;
        self
    }

    /// Minimum inter-record delay as a `Duration`.
    pub fn min_delay(&self) -> Duration {
        Duration::from_micros(self.min_delay_us)
    }

    /// Check the speed and minimum tick.
    pub fn validate(&self) -> Result<()> {
        validate_speed(self.initial_speed)?;
        if self.min_delay_us == 0 {
            return Err(ReplayError::InvalidConfig(
                "minimum replay delay must be at least 1us".to_string(),
            ));
        }
        Ok(())
    }
}

/// Reject multipliers that would produce a zero, negative or undefined delay.
pub(crate) fn validate_speed(speed: f64) -> Result<()> {
    if speed.is_finite() && speed > 0.0 {
        Ok(())
    } else {
        Err(ReplayError::InvalidSpeed(speed))
    }
}
