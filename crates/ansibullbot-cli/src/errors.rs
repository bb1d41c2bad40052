// SPDX-License-Identifier: Apache-2.0

//! CLI-specific error formatting with user-friendly hints.
//!
//! Downcasts `anyhow::Error` to `BotError` for failures that happen before
//! the triage engine is launched (settings loading), and adds a hint.

use anyhow::Error;
use ansibullbot_core::BotError;

/// Formats an error for CLI display with helpful hints.
///
/// Anything other than a settings error is returned with its causes.
pub fn format_error(error: &Error) -> String {
    if let Some(bot_err) = error.downcast_ref::<BotError>()
        && matches!(bot_err, BotError::Config { .. })
    {
        return format!(
            "{bot_err}\n\nTip: Check your config file at {} and ANSIBULLBOT_* environment variables",
            ansibullbot_core::config_file_path().display()
        );
    }

    format!("{error:#}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_config_error_points_at_file() {
        let error = anyhow::Error::new(BotError::Config {
            message: "invalid type: string, expected u64".to_string(),
        });
        let formatted = format_error(&error);

        assert!(formatted.contains("Configuration error"));
        assert!(formatted.contains("config.toml"));
        assert!(formatted.contains("ANSIBULLBOT_"));
    }

    #[test]
    fn test_format_non_config_bot_error_keeps_chain() {
        let error = anyhow::Error::new(BotError::Interrupted).context("while loading");
        assert_eq!(format_error(&error), "while loading: Interrupted by operator");
    }

    #[test]
    fn test_format_other_error() {
        let error = anyhow::anyhow!("Some generic error").context("while starting");
        assert_eq!(format_error(&error), "while starting: Some generic error");
    }
}
