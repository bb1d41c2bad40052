// SPDX-License-Identifier: Apache-2.0

//! Seam between the launcher and whatever performs the triage work.

use async_trait::async_trait;

/// A triage engine constructed from a `RunConfig` and started once.
///
/// `start` performs all triage work and returns when the run is over. An
/// engine that observes operator cancellation should return
/// [`BotError::Interrupted`](crate::BotError::Interrupted) so the launcher
/// does not report it as a failure.
#[async_trait]
pub trait TriageEngine: Send {
    /// Runs the engine to completion.
    async fn start(&mut self) -> anyhow::Result<()>;
}

