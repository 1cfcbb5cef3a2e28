//! Recorder and replay error types

use thiserror::Error;

/// Errors surfaced by the recorder and replay engine.
///
/// Most misuse (playing twice, pausing while stopped, scrubbing out of
/// range) degrades to a no-op instead of an error. Only inputs that would
/// break an invariant are rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// Speed multiplier was zero, negative, NaN or infinite
    #[error("Invalid playback speed {0}: must be a finite value greater than zero")]
    InvalidSpeed(f64),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for recorder and replay operations
pub type Result<T> = std::result::Result<T, ReplayError>;
