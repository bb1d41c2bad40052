// SPDX-License-Identifier: Apache-2.0

//! `triage_ansible` - triage issue and pull request queues for Ansible.
//!
//! Parses the command line into a `RunConfig`, then hands it to the triage
//! engine behind the launcher's error boundary.

mod cli;
mod errors;
mod logging;

use std::process::ExitCode;

use ansibullbot_core::{AnsibleTriage, EXIT_FAILURE, RunConfig, config, launch};
use clap::Parser;
use tracing::{debug, error};

use crate::cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors exit with status 2 here, before anything else runs.
    let cli = Cli::parse();
    logging::init_logging(&cli.logfile, cli.verbose, cli.debug);

    let settings = match config::load_config() {
        Ok(settings) => settings,
        Err(err) => {
            let formatted = errors::format_error(&anyhow::Error::new(err));
            error!("Error: {formatted}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    debug!("Configuration loaded successfully");

    let run = RunConfig::from(cli);
    let outcome = launch(run, |run| Ok(AnsibleTriage::new(run, settings))).await;
    debug!(?outcome, "Triage run finished");

    ExitCode::from(outcome.exit_code())
}
