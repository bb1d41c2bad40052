// SPDX-License-Identifier: Apache-2.0

//! Command-line interface definition for `triage_ansible`.
//!
//! Uses clap's derive API. Flag spellings follow the bot's historical
//! command line (`--skip_no_update`, `--dry-run`, `--start-at`), so long
//! names are spelled out explicitly instead of derived.

use std::path::PathBuf;

use ansibullbot_core::{DEFAULT_DAEMONIZE_INTERVAL, DEFAULT_LOGFILE, RunConfig, SortOrder};
use clap::{Parser, ValueEnum};

/// Direction to sort issues.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SortDirection {
    /// 0-9
    Asc,
    /// 9-0
    #[default]
    Desc,
}

impl From<SortDirection> for SortOrder {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortOrder::Asc,
            SortDirection::Desc => SortOrder::Desc,
        }
    }
}

/// Triage issue and pullrequest queues for Ansible.
/// (NOTE: only useful if you have commit access to the repo in question.)
#[derive(Parser, Debug)]
#[command(name = "triage_ansible")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Skip processing if `updated_at` hasn't changed
    #[arg(long = "skip_no_update")]
    pub skip_no_update: bool,

    /// Ignore skip logic if last processed >= the stale window (7 days by default)
    #[arg(long = "skip_no_update_timeout")]
    pub skip_no_update_timeout: bool,

    /// Stop after caching issues
    #[arg(long = "collect_only")]
    pub collect_only: bool,

    /// Ignore the module repos
    #[arg(long = "skip_module_repos")]
    pub skip_module_repos: bool,

    /// Only process the module repos
    #[arg(long = "module_repos_only")]
    pub module_repos_only: bool,

    /// Debug: force the rate limit
    #[arg(long = "force_rate_limit")]
    pub force_rate_limit: bool,

    /// Direction to sort issues [desc=9-0 asc=0-9]
    #[arg(long, value_enum, default_value_t = SortDirection::Desc)]
    pub sort: SortDirection,

    /// Send logging to this file
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOGFILE)]
    pub logfile: PathBuf,

    /// Run in a continuous loop
    #[arg(long)]
    pub daemonize: bool,

    /// Seconds to sleep between loop iterations
    #[arg(long = "daemonize_interval", value_name = "N", default_value_t = DEFAULT_DAEMONIZE_INTERVAL)]
    pub daemonize_interval: u64,

    /// Github repo to skip triaging (repeatable)
    #[arg(long, value_name = "REPO")]
    pub skiprepo: Vec<String>,

    /// Github repo to triage (defaults to all)
    #[arg(long, short = 'r', value_name = "REPO")]
    pub repo: Option<String>,

    /// Triage pullrequests only
    #[arg(long = "only_prs")]
    pub only_prs: bool,

    /// Triage issues only
    #[arg(long = "only_issues")]
    pub only_issues: bool,

    /// Triage open issues|prs only
    #[arg(long = "only_open")]
    pub only_open: bool,

    /// Triage closed issues|prs only
    #[arg(long = "only_closed")]
    pub only_closed: bool,

    /// Verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Don't make any changes
    #[arg(long = "dry-run", short = 'n')]
    pub dry_run: bool,

    /// Do not ask questions
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Prompt only on specific actions
    #[arg(long = "safe_force")]
    pub safe_force: bool,

    /// Script to check safe force
    #[arg(long = "safe_force_script", value_name = "PATH")]
    pub safe_force_script: Option<PathBuf>,

    /// Debug output
    #[arg(long, short = 'd')]
    pub debug: bool,

    /// Always pause between prs|issues
    #[arg(long, short = 'p')]
    pub pause: bool,

    /// Do not skip processing closed issues
    #[arg(long = "ignore_state")]
    pub ignore_state: bool,

    /// Triage only the specified pr|issue (separated by commas)
    #[arg(long, visible_alias = "id", value_name = "ID[,ID...]")]
    pub pr: Option<String>,

    /// Start triage at the specified pr|issue
    #[arg(long = "start-at", visible_alias = "resume_id", value_name = "N")]
    pub start_at: Option<u64>,

    /// Pickup right after where the bot last stopped
    #[arg(long)]
    pub resume: bool,

    /// Do not use the since keyword to fetch issues
    #[arg(long = "no_since")]
    pub no_since: bool,

    /// Always invoke the description fixer
    #[arg(long = "force_description_fixer")]
    pub force_description_fixer: bool,

    /// Serialize the actions to disk [/tmp/actions]
    #[arg(long = "dump_actions")]
    pub dump_actions: bool,

    /// Use this filepath for botmeta instead of from the repo
    #[arg(long, value_name = "PATH")]
    pub botmetafile: Option<PathBuf>,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        Self {
            skip_no_update: cli.skip_no_update,
            skip_no_update_timeout: cli.skip_no_update_timeout,
            collect_only: cli.collect_only,
            skip_module_repos: cli.skip_module_repos,
            module_repos_only: cli.module_repos_only,
            force_rate_limit: cli.force_rate_limit,
            sort: cli.sort.into(),
            logfile: cli.logfile,
            daemonize: cli.daemonize,
            daemonize_interval: cli.daemonize_interval,
            skiprepo: cli.skiprepo,
            repo: cli.repo,
            only_prs: cli.only_prs,
            only_issues: cli.only_issues,
            only_open: cli.only_open,
            only_closed: cli.only_closed,
            verbose: cli.verbose,
            dry_run: cli.dry_run,
            force: cli.force,
            safe_force: cli.safe_force,
            safe_force_script: cli.safe_force_script,
            debug: cli.debug,
            pause: cli.pause,
            ignore_state: cli.ignore_state,
            pr: cli.pr,
            start_at: cli.start_at,
            resume: cli.resume,
            no_since: cli.no_since,
            force_description_fixer: cli.force_description_fixer,
            dump_actions: cli.dump_actions,
            botmetafile: cli.botmetafile,
        }
    }
}
