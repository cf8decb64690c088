//! Structured documents for task configuration and output.
//!
//! A [`Document`] is an ordered, hierarchical mapping from string keys to
//! values (scalars, nested documents, or sequences). Documents are the single
//! currency of the execution core: task parameters, cross-task reference
//! context, and task output are all documents. They are immutable once
//! constructed; combining documents goes through [`Document::merge`], which
//! returns a new value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Conventional key under which bare scalar and sequence results are wrapped,
/// so task output is always a document and never a bare value.
pub const RESULT_KEY: &str = "stats";

/// An immutable, insertion-ordered key/value tree.
///
/// The root is always a mapping. Scalar task results are wrapped under
/// [`RESULT_KEY`] by [`Document::wrap`], which keeps the output shape uniform
/// for downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Wrap a value into a document.
    ///
    /// A mapping becomes the document itself (structure-preserving). Any
    /// scalar or sequence becomes a single-entry document keyed under
    /// [`RESULT_KEY`], so callers can treat every task output uniformly.
    pub fn wrap(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert(RESULT_KEY.to_string(), other);
                Self(map)
            }
        }
    }

    /// Wrap any serializable value into a document.
    ///
    /// Fails with a configuration error when the value cannot be represented
    /// in the document model (e.g. a map with non-string keys).
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::Configuration(format!("unsupported value: {}", e)))?;
        Ok(Self::wrap(value))
    }

    /// True if the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Top-level keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Clone the document into a raw JSON value.
    ///
    /// Used at the foreign-definition boundary, where configuration crosses
    /// as plain JSON.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Right-biased recursive merge.
    ///
    /// Keys present in `overlay` replace corresponding keys in `self`; when
    /// both sides hold a mapping for the same key, the mappings merge
    /// recursively. Keys absent from `overlay` are inherited unchanged.
    pub fn merge(&self, overlay: &Document) -> Document {
        let mut merged = self.0.clone();
        for (key, value) in &overlay.0 {
            match (merged.get(key), value) {
                (Some(Value::Object(base)), Value::Object(over)) => {
                    let combined = merge_maps(base, over);
                    merged.insert(key.clone(), Value::Object(combined));
                }
                _ => {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        Document(merged)
    }

    /// Look up a value by dotted path (e.g. `"export.mode"`).
    ///
    /// Returns `None` when any segment is missing or a non-mapping value is
    /// traversed into.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.0.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Look up a value by dotted path, failing when absent.
    pub fn require(&self, path: &str) -> Result<&Value> {
        self.get(path).ok_or_else(|| Error::MissingParameter {
            key: path.to_string(),
        })
    }

    /// Required integer parameter.
    pub fn require_i64(&self, path: &str) -> Result<i64> {
        self.require(path)?
            .as_i64()
            .ok_or_else(|| Error::MistypedParameter {
                key: path.to_string(),
                expected: "integer",
            })
    }

    /// Required floating-point parameter.
    pub fn require_f64(&self, path: &str) -> Result<f64> {
        self.require(path)?
            .as_f64()
            .ok_or_else(|| Error::MistypedParameter {
                key: path.to_string(),
                expected: "number",
            })
    }

    /// Required string parameter.
    pub fn require_str(&self, path: &str) -> Result<&str> {
        self.require(path)?
            .as_str()
            .ok_or_else(|| Error::MistypedParameter {
                key: path.to_string(),
                expected: "string",
            })
    }

    /// Required boolean parameter.
    pub fn require_bool(&self, path: &str) -> Result<bool> {
        self.require(path)?
            .as_bool()
            .ok_or_else(|| Error::MistypedParameter {
                key: path.to_string(),
                expected: "boolean",
            })
    }

    /// Required nested document parameter.
    pub fn require_doc(&self, path: &str) -> Result<Document> {
        self.require(path)?
            .as_object()
            .map(|m| Document(m.clone()))
            .ok_or_else(|| Error::MistypedParameter {
                key: path.to_string(),
                expected: "document",
            })
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        match (merged.get(key), value) {
            (Some(Value::Object(b)), Value::Object(o)) => {
                let combined = merge_maps(b, o);
                merged.insert(key.clone(), Value::Object(combined));
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}
