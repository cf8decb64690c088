//! Task contract and lifecycle enforcement.
//!
//! A task is a stateful unit of work driven through a fixed three-phase
//! lifecycle: `setup` acquires resources, `work` performs the externally
//! visible effect and produces a [`Document`], `teardown` releases resources.
//! [`TaskExecution`] wraps a task instance and enforces that phases run
//! strictly in order, exactly once each.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Error, Result};
use crate::alog_debug;

/// A unit of work with a three-phase lifecycle.
///
/// Implementations own whatever state and resources they need; nothing beyond
/// the instance name and the final output document is observable from the
/// outside. `setup` and `teardown` default to no-ops for tasks that manage no
/// resources.
///
/// Failures are reported through the crate error type: resource acquisition
/// problems as [`Error::Setup`], work-phase failures as [`Error::Execution`].
#[async_trait]
pub trait Task: Send {
    /// Instance name, unique within a single execution context.
    fn name(&self) -> &str;

    /// Acquire resources (connections, file handles, temp storage) needed by
    /// `work`. Called exactly once, before `work`.
    async fn setup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Perform the task's effect and return its result. This is the only
    /// phase expected to have externally visible side effects.
    async fn work(&mut self) -> Result<Document>;

    /// Release resources acquired in `setup`. Runs regardless of whether
    /// `work` succeeded, failed, or was cancelled.
    async fn teardown(&mut self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task").field(&self.name()).finish()
    }
}

/// Lifecycle phase of a task execution.
///
/// The phase records the most recently *entered* phase, advancing when a
/// lifecycle method is invoked:
///
/// Created --setup()--> SetUp --work()--> Executed --teardown()--> TornDown
///
/// A failure in `setup` or `work` branches to `Failed`; `teardown` is still
/// legal (and required) from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    /// Instance constructed, no lifecycle method invoked yet.
    #[default]
    Created,
    /// `setup` has been invoked.
    SetUp,
    /// `work` has been invoked.
    Executed,
    /// `setup` or `work` failed; only `teardown` may follow.
    Failed,
    /// `teardown` has been invoked; the lifecycle is over.
    TornDown,
}

impl TaskPhase {
    /// Check whether a caller-driven transition to `target` is valid.
    ///
    /// Valid transitions:
    /// - Created -> SetUp (via `setup`)
    /// - SetUp -> Executed (via `work`)
    /// - SetUp | Executed | Failed -> TornDown (via `teardown`)
    ///
    /// Teardown from SetUp covers executions abandoned before `work` ran
    /// (e.g. cancellation); teardown from Failed covers the failure branch.
    pub fn can_transition(self, target: TaskPhase) -> bool {
        matches!(
            (self, target),
            (TaskPhase::Created, TaskPhase::SetUp)
                | (TaskPhase::SetUp, TaskPhase::Executed)
                | (TaskPhase::SetUp, TaskPhase::TornDown)
                | (TaskPhase::Executed, TaskPhase::TornDown)
                | (TaskPhase::Failed, TaskPhase::TornDown)
        )
    }

    /// Check if the lifecycle is over (teardown has run).
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskPhase::TornDown)
    }
}

impl std::fmt::Display for TaskPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPhase::Created => write!(f, "created"),
            TaskPhase::SetUp => write!(f, "set_up"),
            TaskPhase::Executed => write!(f, "executed"),
            TaskPhase::Failed => write!(f, "failed"),
            TaskPhase::TornDown => write!(f, "torn_down"),
        }
    }
}

/// A record of a phase entry with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseHistoryEntry {
    /// The phase that was entered.
    pub phase: TaskPhase,
    /// When this phase was entered.
    pub entered_at: DateTime<Utc>,
}

/// Guards a task instance and enforces the lifecycle contract.
///
/// `TaskExecution` owns the task for the duration of its lifecycle. Each
/// lifecycle method validates the current phase before touching the task;
/// out-of-order or repeated invocations fail with
/// [`Error::LifecycleViolation`] without reaching the task itself.
///
/// The phase advances when a method is invoked, so an execution abandoned
/// mid-phase (a dropped future under cancellation) still reports the phase it
/// entered, keeping `teardown` legal on every exit path.
pub struct TaskExecution {
    /// The guarded task instance.
    task: Box<dyn Task>,
    /// Most recently entered phase.
    phase: TaskPhase,
    /// History of all phases entered, in order.
    history: Vec<PhaseHistoryEntry>,
}

impl TaskExecution {
    /// Wrap a task instance, starting in the Created phase.
    pub fn new(task: Box<dyn Task>) -> Self {
        Self {
            task,
            phase: TaskPhase::Created,
            history: vec![PhaseHistoryEntry {
                phase: TaskPhase::Created,
                entered_at: Utc::now(),
            }],
        }
    }

    /// Name of the guarded task.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Most recently entered phase.
    pub fn phase(&self) -> TaskPhase {
        self.phase
    }

    /// History of all phases entered, in order.
    pub fn history(&self) -> &[PhaseHistoryEntry] {
        &self.history
    }

    fn advance(&mut self, target: TaskPhase) -> Result<()> {
        if !self.phase.can_transition(target) {
            return Err(Error::LifecycleViolation {
                from: self.phase.to_string(),
                to: target.to_string(),
            });
        }
        self.phase = target;
        self.history.push(PhaseHistoryEntry {
            phase: target,
            entered_at: Utc::now(),
        });
        Ok(())
    }

    fn fail(&mut self) {
        self.phase = TaskPhase::Failed;
        self.history.push(PhaseHistoryEntry {
            phase: TaskPhase::Failed,
            entered_at: Utc::now(),
        });
    }

    /// Run the setup phase. Legal only from Created.
    pub async fn setup(&mut self) -> Result<()> {
        self.advance(TaskPhase::SetUp)?;
        alog_debug!("task '{}' entering setup", self.task.name());
        match self.task.setup().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Run the work phase. Legal only from SetUp, so a task whose setup
    /// failed can never reach `work`.
    pub async fn work(&mut self) -> Result<Document> {
        self.advance(TaskPhase::Executed)?;
        alog_debug!("task '{}' entering work", self.task.name());
        match self.task.work().await {
            Ok(doc) => Ok(doc),
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    /// Run the teardown phase. Legal from SetUp, Executed, or Failed.
    ///
    /// The phase becomes TornDown whether or not the task's teardown reports
    /// an error; re-invoking teardown is a lifecycle violation either way.
    /// Deciding what a teardown error means (diagnostic vs. failure) is the
    /// driver's call.
    pub async fn teardown(&mut self) -> Result<()> {
        self.advance(TaskPhase::TornDown)?;
        alog_debug!("task '{}' entering teardown", self.task.name());
        self.task.teardown().await
    }
}
