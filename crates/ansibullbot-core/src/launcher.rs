// SPDX-License-Identifier: Apache-2.0

//! Top-level error boundary around a triage engine.
//!
//! [`launch`] constructs the engine exactly once, awaits `start` exactly
//! once, and turns whatever comes out into an [`Outcome`]:
//!
//! - success is [`Outcome::Completed`];
//! - [`BotError::Interrupted`] anywhere in the error chain is
//!   [`Outcome::Interrupted`] and is not logged;
//! - any other error, or a panic unwinding out of the engine, is logged once
//!   at error level with `kind`, `message` and `trace` fields and becomes
//!   [`Outcome::Failed`].
//!
//! No retry happens here.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::engine::TriageEngine;
use crate::error::BotError;
use crate::run_config::RunConfig;

/// Exit status for a run that finished normally.
pub const EXIT_OK: u8 = 0;
/// Exit status for an engine failure.
pub const EXIT_FAILURE: u8 = 1;
/// Exit status for an operator interruption (128 + SIGINT).
pub const EXIT_INTERRUPTED: u8 = 130;

/// Diagnostic context for an uncaught engine failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    /// Error kind, e.g. `invalid_item_id` or `panic`.
    pub kind: String,
    /// Error message including its cause chain.
    pub message: String,
    /// Cause chain and backtrace, as far as they were captured.
    pub trace: String,
}

impl FailureReport {
    fn from_error(err: &anyhow::Error) -> Self {
        let kind = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<BotError>())
            .map_or("error", BotError::kind);

        Self {
            kind: kind.to_string(),
            message: format!("{err:#}"),
            // anyhow's Debug renders the cause list and a backtrace when
            // RUST_BACKTRACE enables capture.
            trace: format!("{err:?}"),
        }
    }

    fn from_panic(payload: &(dyn Any + Send), capture: Option<PanicCapture>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Unknown panic".to_string());

        let trace = match capture {
            Some(capture) => format!(
                "panicked at {}\nstack backtrace:\n{}",
                capture.location, capture.backtrace
            ),
            None => "panicked at unknown location".to_string(),
        };

        Self {
            kind: "panic".to_string(),
            message,
            trace,
        }
    }
}

/// Where a panic happened, recorded by the hook before unwinding starts.
struct PanicCapture {
    location: String,
    backtrace: Backtrace,
}

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicCapture>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a hook in front of the current one that records the location and
/// backtrace of a panic on the panicking thread.
///
/// The engine future is polled inside `catch_unwind` on the thread that
/// panics, so the boundary reads the capture from the same thread-local.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let location = info.location().map_or_else(
                || "unknown location".to_string(),
                |l| format!("{}:{}:{}", l.file(), l.line(), l.column()),
            );
            LAST_PANIC.with(|slot| {
                *slot.borrow_mut() = Some(PanicCapture {
                    location,
                    backtrace: Backtrace::force_capture(),
                });
            });
            previous(info);
        }));
    });
}

fn take_panic_capture() -> Option<PanicCapture> {
    LAST_PANIC.with(|slot| slot.borrow_mut().take())
}

/// How a launched run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `start` returned successfully.
    Completed,
    /// The operator cancelled the run.
    Interrupted,
    /// The engine failed; the failure has already been logged.
    Failed(FailureReport),
}

impl Outcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::Completed => EXIT_OK,
            Outcome::Interrupted => EXIT_INTERRUPTED,
            Outcome::Failed(_) => EXIT_FAILURE,
        }
    }
}

fn is_interruption(err: &anyhow::Error) -> bool {
    err.chain()
        .any(|cause| matches!(cause.downcast_ref::<BotError>(), Some(BotError::Interrupted)))
}

fn classify(err: &anyhow::Error) -> Outcome {
    if is_interruption(err) {
        debug!("Run interrupted by operator");
        return Outcome::Interrupted;
    }
    report(FailureReport::from_error(err))
}

fn report(failure: FailureReport) -> Outcome {
    error!(
        error.kind = %failure.kind,
        error.message = %failure.message,
        error.trace = %failure.trace,
        "Uncaught exception"
    );
    Outcome::Failed(failure)
}

/// Builds an engine from `config` with `build` and runs it behind the error boundary.
///
/// Contradictory flag combinations are logged as warnings and passed through
/// unchanged. A failure inside `build` is treated like a failure in `start`.
pub async fn launch<E, F>(config: RunConfig, build: F) -> Outcome
where
    E: TriageEngine,
    F: FnOnce(RunConfig) -> anyhow::Result<E>,
{
    for conflict in config.conflicts() {
        warn!("{conflict}; passing both to the triage engine");
    }

    let mut engine = match build(config) {
        Ok(engine) => engine,
        Err(err) => return classify(&err),
    };

    install_panic_hook();
    // Discard a capture left by a panic caught elsewhere on this thread.
    take_panic_capture();

    match AssertUnwindSafe(engine.start()).catch_unwind().await {
        Ok(Ok(())) => Outcome::Completed,
        Ok(Err(err)) => classify(&err),
        Err(payload) => report(FailureReport::from_panic(
            payload.as_ref(),
            take_panic_capture(),
        )),
    }
}
