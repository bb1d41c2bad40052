// SPDX-License-Identifier: Apache-2.0

//! Default triage engine: resolves and reports the run plan.
//!
//! `AnsibleTriage` works out which repositories and items a run covers, how
//! it confirms actions and how it fetches, then reports that plan per
//! repository. Triage rules plug in behind [`TriageEngine`]; this engine
//! never talks to GitHub.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::Poll;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::AppConfig;
use crate::engine::TriageEngine;
use crate::error::BotError;
use crate::run_config::{Confirmation, ItemKinds, ItemStates, RunConfig, SortOrder};

/// Items selected within each repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSelection {
    /// Explicit item numbers; empty means every item.
    pub ids: Vec<u64>,
    /// Item number to start at.
    pub start_at: Option<u64>,
    /// Direction to walk item numbers.
    pub sort: SortOrder,
    /// Issues, pull requests, or both.
    pub kinds: ItemKinds,
    /// Open, closed, or both.
    pub states: ItemStates,
}

/// How items are fetched and when they are skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPolicy {
    /// Fetch incrementally with `since`.
    pub use_since: bool,
    /// Skip items whose `updated_at` hasn't changed.
    pub skip_no_update: bool,
    /// Days after which unchanged items are reprocessed, when enabled.
    pub stale_window_days: Option<u64>,
    /// Resume right after the last processed item.
    pub resume: bool,
    /// Simulate rate limiting.
    pub force_rate_limit: bool,
    /// Stop after caching.
    pub collect_only: bool,
}

/// Everything a triage pass needs to know, derived from one `RunConfig`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriagePlan {
    /// Repositories to walk, in order.
    pub repos: Vec<String>,
    /// Item selection applied in every repository.
    pub items: ItemSelection,
    /// Confirmation mode for actions.
    pub confirmation: Confirmation,
    /// Fetch and skip policy.
    pub fetch: FetchPolicy,
    /// Suppress side effects.
    pub dry_run: bool,
    /// Pause between items.
    pub pause: bool,
    /// Always run the description fixer.
    pub force_description_fixer: bool,
    /// Local botmeta override.
    pub botmetafile: Option<PathBuf>,
}

impl TriagePlan {
    /// Resolves the plan for `run` against the known repositories in `settings`.
    ///
    /// `--repo` replaces the known repository list. Otherwise module repos
    /// are filtered by `--skip_module_repos`/`--module_repos_only`. Every
    /// `--skiprepo` entry is removed last.
    pub fn resolve(run: &RunConfig, settings: &AppConfig) -> crate::Result<Self> {
        let mut repos: Vec<String> = if let Some(repo) = &run.repo {
            vec![repo.clone()]
        } else {
            let primary = settings.repos.primary.iter();
            let modules = settings.repos.modules.iter();
            match (run.skip_module_repos, run.module_repos_only) {
                (true, false) => primary.cloned().collect(),
                (false, true) => modules.cloned().collect(),
                _ => primary.chain(modules).cloned().collect(),
            }
        };
        repos.retain(|repo| !run.skiprepo.contains(repo));

        let states = if run.ignore_state {
            ItemStates::All
        } else {
            run.item_states()
        };

        Ok(Self {
            repos,
            items: ItemSelection {
                ids: run.item_ids()?,
                start_at: run.start_at,
                sort: run.sort,
                kinds: run.item_kinds(),
                states,
            },
            confirmation: run.confirmation(),
            fetch: FetchPolicy {
                use_since: !run.no_since,
                skip_no_update: run.skip_no_update,
                stale_window_days: run
                    .skip_no_update_timeout
                    .then_some(settings.triage.stale_window_days),
                resume: run.resume,
                force_rate_limit: run.force_rate_limit,
                collect_only: run.collect_only,
            },
            dry_run: run.dry_run,
            pause: run.pause,
            force_description_fixer: run.force_description_fixer,
            botmetafile: run.botmetafile.clone(),
        })
    }
}

/// Serialized form of a pass written by `--dump_actions`.
#[derive(Debug, Serialize)]
struct PlanDump<'a> {
    generated_at: DateTime<Utc>,
    pass: u64,
    plan: &'a TriagePlan,
}

/// Default engine for `triage_ansible`.
#[derive(Debug)]
pub struct AnsibleTriage {
    run: RunConfig,
    settings: AppConfig,
}

impl AnsibleTriage {
    /// Creates the engine; nothing is resolved until `start`.
    #[must_use]
    pub fn new(run: RunConfig, settings: AppConfig) -> Self {
        Self { run, settings }
    }

    /// Path `--dump_actions` writes the current plan to.
    #[must_use]
    pub fn dump_path(&self) -> PathBuf {
        self.settings.actions.dump_dir.join("plan.json")
    }

    #[instrument(skip(self, plan))]
    fn run_pass(&self, plan: &TriagePlan, pass: u64) -> crate::Result<()> {
        if plan.repos.is_empty() {
            info!("No repositories left to triage after filtering");
        }

        for repo in &plan.repos {
            info!(
                repo = %repo,
                kinds = ?plan.items.kinds,
                states = ?plan.items.states,
                sort = %plan.items.sort,
                ids = ?plan.items.ids,
                start_at = ?plan.items.start_at,
                dry_run = plan.dry_run,
                "Triage pass planned"
            );
        }

        if plan.fetch.collect_only {
            info!("Collect-only run: stopping after caching");
        }

        if self.run.dump_actions {
            self.dump(plan, pass)?;
        }

        Ok(())
    }

    fn dump(&self, plan: &TriagePlan, pass: u64) -> crate::Result<()> {
        let path = self.dump_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let dump = PlanDump {
            generated_at: Utc::now(),
            pass,
            plan,
        };
        let contents = serde_json::to_string_pretty(&dump)?;
        std::fs::write(&path, contents)?;
        debug!("Wrote plan to {}", path.display());
        Ok(())
    }
}

/// Sleeps for `interval`, returning [`BotError::Interrupted`] as soon as
/// `interrupt` fires.
///
/// A listener that fails is dropped with a warning and the remaining sleep
/// runs uninterrupted.
async fn wait_for_next_pass<F>(
    interval: Duration,
    interrupt: &mut Option<Pin<Box<F>>>,
) -> crate::Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    info!("Sleeping {}s before next pass", interval.as_secs());
    let sleep = tokio::time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        let Some(signal) = interrupt.as_mut() else {
            sleep.await;
            return Ok(());
        };
        let fired = tokio::select! {
            () = &mut sleep => return Ok(()),
            result = signal.as_mut() => result,
        };
        signal_fired(fired, interrupt)?;
    }
}

fn signal_fired<F>(
    result: std::io::Result<()>,
    interrupt: &mut Option<Pin<Box<F>>>,
) -> crate::Result<()> {
    match result {
        Ok(()) => Err(BotError::Interrupted),
        Err(err) => {
            warn!("Cannot listen for ctrl-c, daemonize sleeps will not be interrupted: {err}");
            *interrupt = None;
            Ok(())
        }
    }
}

#[async_trait]
impl TriageEngine for AnsibleTriage {
    async fn start(&mut self) -> anyhow::Result<()> {
        let plan = TriagePlan::resolve(&self.run, &self.settings)
            .context("Failed to resolve triage plan")?;
        debug!(?plan, "Resolved triage plan");

        // One listener for the whole loop, so a ctrl-c during a pass is seen
        // by the following sleep.
        let mut interrupt = self
            .run
            .daemonize
            .then(|| Box::pin(tokio::signal::ctrl_c()));
        let registered = match interrupt.as_mut() {
            Some(signal) => futures::poll!(signal.as_mut()),
            None => Poll::Pending,
        };
        if let Poll::Ready(result) = registered {
            signal_fired(result, &mut interrupt)?;
        }

        let interval = Duration::from_secs(self.run.daemonize_interval);
        let mut pass = 1;
        loop {
            self.run_pass(&plan, pass)
                .with_context(|| format!("Triage pass {pass} failed"))?;

            if !self.run.daemonize {
                return Ok(());
            }
            wait_for_next_pass(interval, &mut interrupt).await?;
            pass += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn test_resolve_defaults_covers_all_repos() {
        let plan = TriagePlan::resolve(&RunConfig::default(), &settings()).unwrap();

        assert_eq!(
            plan.repos,
            vec![
                "ansible/ansible",
                "ansible/ansible-modules-core",
                "ansible/ansible-modules-extras",
            ]
        );
        assert_eq!(plan.items.sort, SortOrder::Desc);
        assert_eq!(plan.items.kinds, ItemKinds::All);
        assert_eq!(plan.confirmation, Confirmation::Always);
        assert!(plan.fetch.use_since);
        assert!(plan.fetch.stale_window_days.is_none());
    }

    #[test]
    fn test_resolve_module_repo_filters() {
        let skip = RunConfig {
            skip_module_repos: true,
            ..RunConfig::default()
        };
        assert_eq!(
            TriagePlan::resolve(&skip, &settings()).unwrap().repos,
            vec!["ansible/ansible"]
        );

        let only = RunConfig {
            module_repos_only: true,
            skiprepo: vec!["ansible/ansible-modules-extras".to_string()],
            ..RunConfig::default()
        };
        assert_eq!(
            TriagePlan::resolve(&only, &settings()).unwrap().repos,
            vec!["ansible/ansible-modules-core"]
        );
    }

    #[test]
    fn test_resolve_single_repo_can_be_skipped() {
        let run = RunConfig {
            repo: Some("ansible/ansible".to_string()),
            skiprepo: vec!["ansible/ansible".to_string()],
            ..RunConfig::default()
        };
        assert!(TriagePlan::resolve(&run, &settings()).unwrap().repos.is_empty());
    }

    #[test]
    fn test_resolve_ignore_state_widens_states() {
        let run = RunConfig {
            only_open: true,
            ignore_state: true,
            ..RunConfig::default()
        };
        let plan = TriagePlan::resolve(&run, &settings()).unwrap();
        assert_eq!(plan.items.states, ItemStates::All);
    }

    #[test]
    fn test_resolve_fetch_policy() {
        let run = RunConfig {
            no_since: true,
            skip_no_update_timeout: true,
            collect_only: true,
            ..RunConfig::default()
        };
        let plan = TriagePlan::resolve(&run, &settings()).unwrap();
        assert!(!plan.fetch.use_since);
        assert_eq!(plan.fetch.stale_window_days, Some(7));
        assert!(plan.fetch.collect_only);
    }

    #[test]
    fn test_resolve_rejects_bad_ids() {
        let run = RunConfig {
            pr: Some("1,two".to_string()),
            ..RunConfig::default()
        };
        assert!(matches!(
            TriagePlan::resolve(&run, &settings()),
            Err(BotError::InvalidItemId { .. })
        ));
    }

    #[tokio::test]
    async fn test_start_single_pass_completes() {
        let mut engine = AnsibleTriage::new(RunConfig::default(), settings());
        engine.start().await.unwrap();
    }

    #[tokio::test]
    async fn test_start_dumps_plan() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = settings();
        app.actions.dump_dir = tmp.path().join("actions");
        let run = RunConfig {
            dump_actions: true,
            pr: Some("42".to_string()),
            ..RunConfig::default()
        };
        let mut engine = AnsibleTriage::new(run, app);
        engine.start().await.unwrap();

        let written = std::fs::read_to_string(engine.dump_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(json["pass"], 1);
        assert_eq!(json["plan"]["items"]["ids"][0], 42);
        assert_eq!(json["plan"]["confirmation"]["mode"], "always");
    }

    #[tokio::test]
    async fn test_start_reports_invalid_ids() {
        let run = RunConfig {
            pr: Some("abc".to_string()),
            ..RunConfig::default()
        };
        let mut engine = AnsibleTriage::new(run, settings());
        let err = engine.start().await.unwrap_err();
        assert!(
            err.chain()
                .any(|cause| matches!(cause.downcast_ref::<BotError>(), Some(BotError::InvalidItemId { .. })))
        );
    }

    fn daemonized(dump_dir: PathBuf, interval: u64) -> AnsibleTriage {
        let mut app = settings();
        app.actions.dump_dir = dump_dir;
        let run = RunConfig {
            daemonize: true,
            daemonize_interval: interval,
            dump_actions: true,
            ..RunConfig::default()
        };
        AnsibleTriage::new(run, app)
    }

    fn dumped_pass(engine: &AnsibleTriage) -> u64 {
        let written = std::fs::read_to_string(engine.dump_path()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&written).unwrap();
        json["pass"].as_u64().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemonize_repeats_passes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = daemonized(tmp.path().join("actions"), 100);

        let result =
            tokio::time::timeout(Duration::from_secs(250), engine.start()).await;

        assert!(result.is_err(), "daemonize loop should not return");
        assert_eq!(dumped_pass(&engine), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemonize_waits_full_interval() {
        let tmp = tempfile::tempdir().unwrap();
        let mut engine = daemonized(tmp.path().join("actions"), 1800);

        let started = tokio::time::Instant::now();
        let result =
            tokio::time::timeout(Duration::from_secs(1799), engine.start()).await;
        assert!(result.is_err());
        assert!(started.elapsed() >= Duration::from_secs(1799));
        assert_eq!(dumped_pass(&engine), 1);

        let result =
            tokio::time::timeout(Duration::from_secs(1801), engine.start()).await;
        assert!(result.is_err());
        assert_eq!(dumped_pass(&engine), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_interrupted_when_signal_fires() {
        let mut interrupt = Some(Box::pin(futures::future::ready(Ok::<(), std::io::Error>(()))));
        let started = tokio::time::Instant::now();

        let err = wait_for_next_pass(Duration::from_secs(60), &mut interrupt)
            .await
            .unwrap_err();

        assert!(matches!(err, BotError::Interrupted));
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_sleeps_through_failed_listener() {
        let mut interrupt = Some(Box::pin(futures::future::ready(Err::<(), _>(
            std::io::Error::other("signal driver unavailable"),
        ))));
        let started = tokio::time::Instant::now();

        wait_for_next_pass(Duration::from_secs(60), &mut interrupt)
            .await
            .unwrap();

        assert!(interrupt.is_none());
        assert_eq!(started.elapsed(), Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_completes_without_signal() {
        let mut interrupt = Some(Box::pin(futures::future::pending::<std::io::Result<()>>()));

        wait_for_next_pass(Duration::from_secs(5), &mut interrupt)
            .await
            .unwrap();

        assert!(interrupt.is_some());
    }
}
