// SPDX-License-Identifier: Apache-2.0

//! Run configuration for a single triager invocation.
//!
//! A `RunConfig` is built once from the command line, moved into the triage
//! engine, and never mutated afterwards. The typed projections below
//! (`item_ids`, `item_kinds`, `confirmation`, ...) are read-only views over
//! the raw flags.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::BotError;

/// Default destination for the triager log.
pub const DEFAULT_LOGFILE: &str = "/var/log/ansibullbot.log";

/// Default sleep between daemonized passes, in seconds.
pub const DEFAULT_DAEMONIZE_INTERVAL: u64 = 30 * 60;

/// Days after which `--skip_no_update_timeout` reprocesses unchanged items.
pub const DEFAULT_STALE_WINDOW: u64 = 7;

/// Direction to walk issue and pull request numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Lowest number first (0-9).
    Asc,
    /// Highest number first (9-0).
    #[default]
    Desc,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Asc => f.write_str("asc"),
            SortOrder::Desc => f.write_str("desc"),
        }
    }
}

/// Which item types a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKinds {
    /// Issues and pull requests.
    All,
    /// Pull requests only.
    PullRequests,
    /// Issues only.
    Issues,
}

/// Which item states a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStates {
    /// Open and closed items.
    All,
    /// Open items only.
    Open,
    /// Closed items only.
    Closed,
}

/// How much the triager asks before acting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "script")]
pub enum Confirmation {
    /// Prompt before every action.
    Always,
    /// Prompt only on specific actions, optionally delegating to a script.
    Selective(Option<PathBuf>),
    /// Never prompt.
    Never,
}

/// A pair of flags whose combined intent is contradictory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagConflict {
    /// First flag, as spelled on the command line.
    pub first: &'static str,
    /// Second flag, as spelled on the command line.
    pub second: &'static str,
}

impl fmt::Display for FlagConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{} and --{} are mutually exclusive", self.first, self.second)
    }
}

/// Parsed options for one triager run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Skip processing if `updated_at` hasn't changed.
    pub skip_no_update: bool,
    /// Ignore the skip logic once an item is older than the stale window.
    pub skip_no_update_timeout: bool,
    /// Stop after caching issues.
    pub collect_only: bool,
    /// Ignore the module repos.
    pub skip_module_repos: bool,
    /// Only process the module repos.
    pub module_repos_only: bool,
    /// Debug: force the rate limit.
    pub force_rate_limit: bool,
    /// Direction to sort issues.
    pub sort: SortOrder,
    /// Send logging to this file.
    pub logfile: PathBuf,
    /// Run in a continuous loop.
    pub daemonize: bool,
    /// Seconds to sleep between loop iterations.
    pub daemonize_interval: u64,
    /// Repos to skip, in the order given.
    pub skiprepo: Vec<String>,
    /// Single repo to triage.
    pub repo: Option<String>,
    /// Triage pull requests only.
    pub only_prs: bool,
    /// Triage issues only.
    pub only_issues: bool,
    /// Triage open items only.
    pub only_open: bool,
    /// Triage closed items only.
    pub only_closed: bool,
    /// Verbose output.
    pub verbose: bool,
    /// Don't make any changes.
    pub dry_run: bool,
    /// Do not ask questions.
    pub force: bool,
    /// Prompt only on specific actions.
    pub safe_force: bool,
    /// Script to check safe force.
    pub safe_force_script: Option<PathBuf>,
    /// Debug output.
    pub debug: bool,
    /// Always pause between items.
    pub pause: bool,
    /// Do not skip processing closed items.
    pub ignore_state: bool,
    /// Raw comma-separated list of item numbers.
    pub pr: Option<String>,
    /// Start triage at this item number.
    pub start_at: Option<u64>,
    /// Pick up right after where the bot last stopped.
    pub resume: bool,
    /// Do not use `since` to fetch issues incrementally.
    pub no_since: bool,
    /// Always invoke the description fixer.
    pub force_description_fixer: bool,
    /// Serialize computed actions to disk.
    pub dump_actions: bool,
    /// Use this file for botmeta instead of the one from the repo.
    pub botmetafile: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            skip_no_update: false,
            skip_no_update_timeout: false,
            collect_only: false,
            skip_module_repos: false,
            module_repos_only: false,
            force_rate_limit: false,
            sort: SortOrder::Desc,
            logfile: PathBuf::from(DEFAULT_LOGFILE),
            daemonize: false,
            daemonize_interval: DEFAULT_DAEMONIZE_INTERVAL,
            skiprepo: Vec::new(),
            repo: None,
            only_prs: false,
            only_issues: false,
            only_open: false,
            only_closed: false,
            verbose: false,
            dry_run: false,
            force: false,
            safe_force: false,
            safe_force_script: None,
            debug: false,
            pause: false,
            ignore_state: false,
            pr: None,
            start_at: None,
            resume: false,
            no_since: false,
            force_description_fixer: false,
            dump_actions: false,
            botmetafile: None,
        }
    }
}

impl RunConfig {
    /// Parses the `--pr`/`--id` list into item numbers.
    ///
    /// Segments are trimmed and empty segments are ignored, so `"1, 2,"`
    /// yields `[1, 2]`. Returns an empty list when no ids were given.
    pub fn item_ids(&self) -> crate::Result<Vec<u64>> {
        let Some(raw) = self.pr.as_deref() else {
            return Ok(Vec::new());
        };

        raw.split(',')
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .map_err(|_| BotError::InvalidItemId {
                        value: segment.to_string(),
                    })
            })
            .collect()
    }

    /// Item types selected by `--only_prs`/`--only_issues`.
    ///
    /// When both are set the run covers nothing narrower than all items.
    #[must_use]
    pub fn item_kinds(&self) -> ItemKinds {
        match (self.only_prs, self.only_issues) {
            (true, false) => ItemKinds::PullRequests,
            (false, true) => ItemKinds::Issues,
            _ => ItemKinds::All,
        }
    }

    /// Item states selected by `--only_open`/`--only_closed`.
    #[must_use]
    pub fn item_states(&self) -> ItemStates {
        match (self.only_open, self.only_closed) {
            (true, false) => ItemStates::Open,
            (false, true) => ItemStates::Closed,
            _ => ItemStates::All,
        }
    }

    /// Confirmation mode; `--force` wins over `--safe_force`.
    #[must_use]
    pub fn confirmation(&self) -> Confirmation {
        if self.force {
            Confirmation::Never
        } else if self.safe_force {
            Confirmation::Selective(self.safe_force_script.clone())
        } else {
            Confirmation::Always
        }
    }

    /// Lists flag pairs set together whose intents contradict each other.
    #[must_use]
    pub fn conflicts(&self) -> Vec<FlagConflict> {
        [
            (self.only_prs && self.only_issues, "only_prs", "only_issues"),
            (self.only_open && self.only_closed, "only_open", "only_closed"),
            (
                self.skip_module_repos && self.module_repos_only,
                "skip_module_repos",
                "module_repos_only",
            ),
            (self.force && self.safe_force, "force", "safe_force"),
        ]
        .into_iter()
        .filter(|(set, _, _)| *set)
        .map(|(_, first, second)| FlagConflict { first, second })
        .collect()
    }
}
