//! Lifecycle driver for task execution.
//!
//! The driver takes a task through setup, work, and teardown exactly once
//! each, and owns the guarantees the individual phases cannot give on their
//! own: teardown runs on every exit path (normal completion, phase failure,
//! cancellation), and a teardown failure never masks a primary failure that
//! is already in flight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::core::task::{PhaseHistoryEntry, Task, TaskExecution, TaskPhase};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::{alog, alog_error, alog_warn};

/// Unique identifier for a single task run.
///
/// Uses UUID v4 for generation and provides a short form display
/// for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new unique run identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Return first 8 characters of the UUID for display.
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Record of a successfully completed task run.
///
/// The output document is the task's sole externally observable result;
/// persistence and forwarding belong to the pipeline engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run.
    pub run_id: RunId,
    /// Instance name of the task that ran.
    pub task_name: String,
    /// The document produced by the work phase.
    pub output: Document,
    /// Teardown failure demoted to a diagnostic (the run itself succeeded).
    pub teardown_diagnostic: Option<String>,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished (after teardown).
    pub finished_at: DateTime<Utc>,
    /// Timestamped lifecycle phases the task went through.
    pub phases: Vec<PhaseHistoryEntry>,
}

/// Outcome of racing one lifecycle phase against the cancellation token.
enum PhaseOutcome<T> {
    Done(T),
    Cancelled,
}

/// Drive a task through its full lifecycle.
///
/// Runs `setup`, `work`, `teardown` in order, each exactly once. Teardown
/// runs even when `setup` or `work` fails, and the original failure is what
/// propagates. A teardown failure on an otherwise clean run propagates as
/// the run's error.
pub async fn run(task: Box<dyn Task>) -> Result<RunReport> {
    run_inner(task, None).await
}

/// Drive a task through its full lifecycle with cooperative cancellation.
///
/// When the token fires during `setup` or `work`, the in-flight phase is
/// abandoned and the run fails with [`Error::Cancelled`], but only after
/// teardown has run to completion. Teardown itself is never raced against
/// the token: resource release must finish.
pub async fn run_with_cancellation(
    task: Box<dyn Task>,
    cancel: CancellationToken,
) -> Result<RunReport> {
    run_inner(task, Some(cancel)).await
}

async fn run_inner(task: Box<dyn Task>, cancel: Option<CancellationToken>) -> Result<RunReport> {
    let run_id = RunId::new();
    let started_at = Utc::now();
    let mut exec = TaskExecution::new(task);
    alog!("run {}: task '{}' starting", run_id.short(), exec.name());

    // A token that is already cancelled fails the run before any phase is
    // entered; with no phase entered there is nothing to tear down.
    if let Some(token) = &cancel {
        if token.is_cancelled() {
            return Err(Error::Cancelled(exec.name().to_string()));
        }
    }

    let mut primary: Option<Error> = None;
    let mut output: Option<Document> = None;

    let setup_outcome = match &cancel {
        Some(token) => tokio::select! {
            res = exec.setup() => PhaseOutcome::Done(res),
            _ = token.cancelled() => PhaseOutcome::Cancelled,
        },
        None => PhaseOutcome::Done(exec.setup().await),
    };

    match setup_outcome {
        PhaseOutcome::Done(Ok(())) => {
            let cancelled_between_phases = cancel
                .as_ref()
                .map(|token| token.is_cancelled())
                .unwrap_or(false);
            if cancelled_between_phases {
                primary = Some(Error::Cancelled(exec.name().to_string()));
            } else {
                let work_outcome = match &cancel {
                    Some(token) => tokio::select! {
                        res = exec.work() => PhaseOutcome::Done(res),
                        _ = token.cancelled() => PhaseOutcome::Cancelled,
                    },
                    None => PhaseOutcome::Done(exec.work().await),
                };
                match work_outcome {
                    PhaseOutcome::Done(Ok(doc)) => output = Some(doc),
                    PhaseOutcome::Done(Err(e)) => primary = Some(e),
                    PhaseOutcome::Cancelled => {
                        primary = Some(Error::Cancelled(exec.name().to_string()))
                    }
                }
            }
        }
        PhaseOutcome::Done(Err(e)) => primary = Some(e),
        PhaseOutcome::Cancelled => primary = Some(Error::Cancelled(exec.name().to_string())),
    }

    // Teardown runs on every exit path. The only exception is an execution
    // still in Created: cancellation won the race before setup was ever
    // polled, so there is nothing to release.
    let mut teardown_diagnostic = None;
    if exec.phase() != TaskPhase::Created {
        if let Err(e) = exec.teardown().await {
            match &primary {
                Some(p) => {
                    alog_warn!(
                        "run {}: teardown failure demoted to diagnostic: {} (primary failure: {})",
                        run_id.short(),
                        e,
                        p
                    );
                    teardown_diagnostic = Some(e.to_string());
                }
                None => primary = Some(e),
            }
        }
    }

    match primary {
        Some(e) => {
            alog_error!("run {}: task '{}' failed: {}", run_id.short(), exec.name(), e);
            Err(e)
        }
        None => {
            alog!("run {}: task '{}' finished", run_id.short(), exec.name());
            Ok(RunReport {
                run_id,
                task_name: exec.name().to_string(),
                output: output.unwrap_or_default(),
                teardown_diagnostic,
                started_at,
                finished_at: Utc::now(),
                phases: exec.history().to_vec(),
            })
        }
    }
}
