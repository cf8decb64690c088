pub mod config;
pub mod core;
pub mod document;
pub mod driver;
pub mod error;
pub mod log;
pub mod registry;

pub use config::Config;
pub use crate::core::{
    ForeignFactoryAdapter, ForeignTaskDef, Origin, PhaseHistoryEntry, Task, TaskExecution,
    TaskFactory, TaskPhase,
};
pub use document::{Document, RESULT_KEY};
pub use driver::{run, run_with_cancellation, RunId, RunReport};
pub use error::{Error, Result};
pub use registry::{Component, ComponentRegistry, Registration};
