//! Task factory contract.
//!
//! A [`TaskFactory`] describes a task kind (name, human-readable metadata,
//! parameter schema, default configuration) and manufactures [`Task`]
//! instances from caller-supplied configuration. One factory produces many
//! task instances; all per-invocation state lives in the returned task.

use crate::core::origin::Origin;
use crate::core::task::Task;
use crate::document::Document;
use crate::error::Result;

/// Describes a task kind and manufactures task instances.
///
/// Factories are shared, read-only values (`&self` everywhere): `create`
/// must not mutate factory state, and must not perform any work-phase side
/// effects. Validation of required parameters happens in `create`, against
/// the merged configuration, before any task is constructed.
pub trait TaskFactory: Send + Sync {
    /// Stable identifier for registry lookup (distinct from task instance
    /// names).
    fn kind_name(&self) -> &str;

    /// One-line human-readable summary.
    fn info(&self) -> &str;

    /// Longer description for documentation generation.
    fn description(&self) -> &str;

    /// Implementation origin of this factory. Fixed at construction.
    fn origin(&self) -> Origin {
        Origin::Native
    }

    /// Baseline configuration merged under caller-supplied parameters.
    fn default_config(&self) -> Document {
        Document::empty()
    }

    /// Describes accepted parameter keys, types, and requiredness. Used for
    /// validation and documentation by external collaborators; the factory
    /// itself does not enforce it.
    fn parameter_schema(&self) -> Document {
        Document::empty()
    }

    /// Shape of the task's output, when statically describable. `None` means
    /// the output shape is dynamic, which is not an error.
    fn output_schema(&self) -> Option<Document> {
        None
    }

    /// The effective configuration for an invocation: caller parameters
    /// merged over [`TaskFactory::default_config`] (right-biased).
    fn merged_config(&self, params: &Document) -> Document {
        self.default_config().merge(params)
    }

    /// Construct a task bound to `instance_name`.
    ///
    /// `params` is merged over the default configuration (see
    /// [`TaskFactory::merged_config`]); required keys missing or mistyped in
    /// the merged configuration fail before any task is constructed.
    /// `reference` carries read-only cross-task context such as previously
    /// produced outputs.
    fn create(
        &self,
        instance_name: &str,
        params: &Document,
        reference: &Document,
    ) -> Result<Box<dyn Task>>;

    /// Construct a task without cross-task context.
    #[deprecated(note = "use create() with an explicit reference document")]
    fn create_without_reference(
        &self,
        instance_name: &str,
        params: &Document,
    ) -> Result<Box<dyn Task>> {
        self.create(instance_name, params, &Document::empty())
    }
}

impl std::fmt::Debug for dyn TaskFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TaskFactory").field(&self.kind_name()).finish()
    }
}
