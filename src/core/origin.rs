//! Implementation origin tagging and the foreign-definition adapter.
//!
//! Every factory carries an [`Origin`] stating where its implementation came
//! from. Native factories implement [`TaskFactory`] directly. Foreign-bound
//! definitions are authored against a looser JSON calling convention
//! ([`ForeignTaskDef`]: `Null` sentinels for absent values, message-string
//! failures) and are translated into the native contract by
//! [`ForeignFactoryAdapter`], the single place where that convention is
//! allowed to appear.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::factory::TaskFactory;
use crate::core::task::Task;
use crate::document::Document;
use crate::error::{Error, Result};

/// Implementation origin of a factory or component.
///
/// Fixed at construction and never changed. The registry branches on this
/// tag once, at registration, to decide whether adaptation is required;
/// task and factory business logic never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Origin {
    /// Implemented directly against the native task contract.
    #[default]
    Native,
    /// Implemented against the foreign calling convention and adapted.
    Foreign,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Origin::Native => write!(f, "native"),
            Origin::Foreign => write!(f, "foreign"),
        }
    }
}

/// A task definition authored against the foreign calling convention.
///
/// Differences from the native [`TaskFactory`] contract, all absorbed by the
/// adapter:
/// - metadata is returned by value (owned strings);
/// - absent configuration and schemas are the `Null` sentinel, not an
///   explicit option;
/// - configuration crosses the boundary as raw JSON values;
/// - `create` failures are message strings, not typed errors.
pub trait ForeignTaskDef: Send + Sync {
    /// Stable identifier for registry lookup.
    fn kind_name(&self) -> String;

    /// One-line human-readable summary.
    fn info(&self) -> String;

    /// Longer description for documentation generation.
    fn description(&self) -> String;

    /// Baseline configuration; `Null` means none.
    fn default_config(&self) -> Value {
        Value::Null
    }

    /// Parameter documentation; `Null` means none.
    fn parameter_schema(&self) -> Value {
        Value::Null
    }

    /// Output shape; `Null` means the shape is dynamic.
    fn output_schema(&self) -> Value {
        Value::Null
    }

    /// Construct a task bound to `name` from the merged configuration.
    ///
    /// The adapter applies the native merge convention before calling this,
    /// so `merged` already contains defaults overlaid with caller
    /// parameters.
    fn create(
        &self,
        name: &str,
        merged: &Value,
        reference: &Value,
    ) -> std::result::Result<Box<dyn Task>, String>;
}

/// Adapts a [`ForeignTaskDef`] to the native [`TaskFactory`] contract.
///
/// Translation happens here and nowhere else: `Null` sentinels become empty
/// documents or an absent schema, message-string failures become
/// configuration errors, and the native merge convention is applied before
/// the foreign `create` runs. Everything downstream of the registry sees an
/// ordinary factory that happens to report [`Origin::Foreign`].
pub struct ForeignFactoryAdapter {
    inner: Arc<dyn ForeignTaskDef>,
    // Metadata is fetched once at construction; the native contract hands
    // out borrowed strings.
    kind_name: String,
    info: String,
    description: String,
}

impl ForeignFactoryAdapter {
    /// Wrap a foreign definition.
    pub fn new(inner: Arc<dyn ForeignTaskDef>) -> Self {
        let kind_name = inner.kind_name();
        let info = inner.info();
        let description = inner.description();
        Self {
            inner,
            kind_name,
            info,
            description,
        }
    }
}

impl TaskFactory for ForeignFactoryAdapter {
    fn kind_name(&self) -> &str {
        &self.kind_name
    }

    fn info(&self) -> &str {
        &self.info
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn origin(&self) -> Origin {
        Origin::Foreign
    }

    fn default_config(&self) -> Document {
        document_from_sentinel(self.inner.default_config())
    }

    fn parameter_schema(&self) -> Document {
        document_from_sentinel(self.inner.parameter_schema())
    }

    fn output_schema(&self) -> Option<Document> {
        match self.inner.output_schema() {
            Value::Null => None,
            value => Some(Document::wrap(value)),
        }
    }

    fn create(
        &self,
        instance_name: &str,
        params: &Document,
        reference: &Document,
    ) -> Result<Box<dyn Task>> {
        let merged = self.merged_config(params);
        self.inner
            .create(instance_name, &merged.to_value(), &reference.to_value())
            .map_err(Error::Configuration)
    }
}

/// `Null` means "no document" on the foreign side.
fn document_from_sentinel(value: Value) -> Document {
    match value {
        Value::Null => Document::empty(),
        value => Document::wrap(value),
    }
}
