// SPDX-License-Identifier: Apache-2.0

//! Settings for the triager that do not belong on the command line.
//!
//! Provides layered configuration from files and environment variables.
//! Uses XDG-compliant paths with environment variable support.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables (prefix: `ANSIBULLBOT_`)
//! 2. Config file: `~/.config/ansibullbot/config.toml`
//! 3. Built-in defaults
//!
//! # Examples
//!
//! ```bash
//! # Dump actions somewhere other than /tmp/actions
//! ANSIBULLBOT_ACTIONS__DUMP_DIR=/srv/bot/actions triage_ansible --dump_actions
//! ```

use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::BotError;
use crate::run_config::DEFAULT_STALE_WINDOW;

/// Application settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Repositories the triager knows about.
    pub repos: ReposConfig,
    /// Debug action dumps.
    pub actions: ActionsConfig,
    /// Triage pass tuning.
    pub triage: TriageConfig,
}

/// Repositories the triager walks when `--repo` is not given.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReposConfig {
    /// Main repositories, always triaged unless skipped.
    pub primary: Vec<String>,
    /// Module repositories, controlled by `--skip_module_repos`/`--module_repos_only`.
    pub modules: Vec<String>,
}

impl Default for ReposConfig {
    fn default() -> Self {
        Self {
            primary: vec!["ansible/ansible".to_string()],
            modules: vec![
                "ansible/ansible-modules-core".to_string(),
                "ansible/ansible-modules-extras".to_string(),
            ],
        }
    }
}

/// Where `--dump_actions` writes.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Directory receiving serialized actions.
    pub dump_dir: PathBuf,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            dump_dir: PathBuf::from("/tmp/actions"),
        }
    }
}

/// Triage pass tuning.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Days after which unchanged items are reprocessed under `--skip_no_update_timeout`.
    pub stale_window_days: u64,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            stale_window_days: DEFAULT_STALE_WINDOW,
        }
    }
}

/// Returns the ansibullbot configuration directory.
///
/// Respects the `XDG_CONFIG_HOME` environment variable if set,
/// otherwise defaults to `~/.config/ansibullbot`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
        && !xdg_config.is_empty()
    {
        return PathBuf::from(xdg_config).join("ansibullbot");
    }
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".config")
        .join("ansibullbot")
}

/// Returns the path to the configuration file.
#[must_use]
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load application settings.
///
/// Loads from config file (if exists) and environment variables.
/// Environment variables use the prefix `ANSIBULLBOT_` and double underscore
/// for nested keys (e.g., `ANSIBULLBOT_ACTIONS__DUMP_DIR`).
///
/// # Errors
///
/// Returns `BotError::Config` if the config file exists but is invalid.
pub fn load_config() -> Result<AppConfig, BotError> {
    let config_path = config_file_path();

    let config = Config::builder()
        .add_source(File::with_name(config_path.to_string_lossy().as_ref()).required(false))
        .add_source(
            Environment::with_prefix("ANSIBULLBOT")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("repos.primary")
                .with_list_parse_key("repos.modules")
                .try_parsing(true),
        )
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    Ok(app_config)
}
