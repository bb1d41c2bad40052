// SPDX-License-Identifier: Apache-2.0

//! Error types for ansibullbot.
//!
//! Uses `thiserror` for deriving `std::error::Error` implementations.
//! Application code should use `anyhow::Result` for top-level error handling.

use thiserror::Error;

/// Errors that can occur while launching or running the triager.
#[derive(Error, Debug)]
pub enum BotError {
    /// Settings file or environment error.
    #[error("Configuration error: {message}")]
    Config {
        /// Error message.
        message: String,
    },

    /// A `--pr`/`--id` entry that is not an issue or pull request number.
    #[error("Invalid issue or pull request id: {value:?}")]
    InvalidItemId {
        /// The offending segment.
        value: String,
    },

    /// Filesystem error (log file, action dumps).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to serialize data written to disk.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Operator cancelled the run (Ctrl-C).
    #[error("Interrupted by operator")]
    Interrupted,

    /// Failure reported by a triage engine.
    #[error("Triage engine error: {message}")]
    Engine {
        /// Error message.
        message: String,
    },
}

impl BotError {
    /// Stable, machine-readable name of the error variant.
    ///
    /// Used as the `kind` field when the launcher logs an uncaught failure.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            BotError::Config { .. } => "config",
            BotError::InvalidItemId { .. } => "invalid_item_id",
            BotError::Io(_) => "io",
            BotError::Serialization(_) => "serialization",
            BotError::Interrupted => "interrupted",
            BotError::Engine { .. } => "engine",
        }
    }
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable_per_variant() {
        assert_eq!(BotError::Interrupted.kind(), "interrupted");
        assert_eq!(
            BotError::InvalidItemId {
                value: "x".to_string()
            }
            .kind(),
            "invalid_item_id"
        );
        let io = BotError::from(std::io::Error::other("disk full"));
        assert_eq!(io.kind(), "io");
        assert!(io.to_string().contains("disk full"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err = BotError::from(config::ConfigError::Message("bad key".to_string()));
        assert_eq!(err.kind(), "config");
        assert!(err.to_string().contains("bad key"));
    }
}
