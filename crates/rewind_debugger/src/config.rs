//! Debugger configuration file handling

use anyhow::{Context, Result};
use rewind_recorder::{RecordingConfig, ReplayConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level debugger configuration (rewind.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DebuggerConfig {
    #[serde(default)]
    pub recording: RecordingConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

impl DebuggerConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: DebuggerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.recording.validate()?;
        self.replay.validate()?;
        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, speed: Option<f64>, capacity: Option<usize>) -> Result<Self> {
        if let Some(speed) = speed {
            self.replay.initial_speed = speed;
        }
        if let Some(capacity) = capacity {
            self.recording.capacity = capacity;
        }
        self.validate()?;
        Ok(self)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}
