// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! # ansibullbot core
//!
//! Core library for the ansibullbot issue and pull request triager.
//!
//! This crate provides:
//! - The run configuration parsed from the command line
//! - Layered application settings
//! - The `TriageEngine` seam and the default plan engine
//! - The top-level error boundary used by the launcher
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ansibullbot_core::{AnsibleTriage, Outcome, RunConfig, launch, load_config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = load_config()?;
//! let run = RunConfig {
//!     pr: Some("123,456".to_string()),
//!     dry_run: true,
//!     ..RunConfig::default()
//! };
//!
//! let outcome = launch(run, |run| Ok(AnsibleTriage::new(run, settings))).await;
//! assert_eq!(outcome, Outcome::Completed);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Error Handling
// ============================================================================

pub use error::BotError;

/// Convenience Result type for ansibullbot operations.
///
/// This is equivalent to `std::result::Result<T, BotError>`.
pub type Result<T> = std::result::Result<T, BotError>;

// ============================================================================
// Configuration
// ============================================================================

pub use config::{AppConfig, config_dir, config_file_path, load_config};
pub use run_config::{
    Confirmation, DEFAULT_DAEMONIZE_INTERVAL, DEFAULT_LOGFILE, DEFAULT_STALE_WINDOW,
    FlagConflict, ItemKinds, ItemStates, RunConfig, SortOrder,
};

// ============================================================================
// Engine
// ============================================================================

pub use engine::TriageEngine;
pub use launcher::{EXIT_FAILURE, EXIT_INTERRUPTED, EXIT_OK, FailureReport, Outcome, launch};
pub use triage::{AnsibleTriage, TriagePlan};

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod engine;
pub mod error;
pub mod launcher;
pub mod run_config;
pub mod triage;
