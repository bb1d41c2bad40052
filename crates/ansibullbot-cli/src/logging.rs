// SPDX-License-Identifier: Apache-2.0

//! Logging initialization for `triage_ansible`.
//!
//! Uses `tracing` with `tracing-subscriber`. Events go to stderr and are
//! appended to `--logfile`. Log level can be controlled via the `RUST_LOG`
//! environment variable, which wins over `--verbose`/`--debug`.
//!
//! # Examples
//!
//! ```bash
//! # Default: info level for the bot
//! triage_ansible --logfile /tmp/bot.log
//!
//! # Debug output for troubleshooting
//! triage_ansible --debug
//!
//! # Trace level for one crate
//! RUST_LOG=ansibullbot_core=trace triage_ansible
//! ```

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter directives for the given verbosity flags.
fn default_filter(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "triage_ansible=debug,ansibullbot_core=debug"
    } else if verbose {
        "triage_ansible=info,ansibullbot_core=info,warn"
    } else {
        "triage_ansible=info,ansibullbot_core=info,error"
    }
}

fn open_logfile(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the logging subsystem.
///
/// When `logfile` cannot be opened (for instance `/var/log` is not writable)
/// logging continues on stderr only and a warning is emitted.
///
/// # Arguments
///
/// * `logfile` - File to append log lines to
/// * `verbose` - Whether `--verbose` was given
/// * `debug` - Whether `--debug` was given
pub fn init_logging(logfile: &Path, verbose: bool, debug: bool) {
    let stderr_layer = fmt::layer()
        .with_target(verbose || debug)
        .with_writer(std::io::stderr);

    let (file_layer, file_error) = match open_logfile(logfile) {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(err) => (None, Some(err)),
    };

    let default = default_filter(verbose, debug);
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(err) = file_error {
        warn!(
            "Cannot open log file {}: {err}; logging to stderr only",
            logfile.display()
        );
    }
}
