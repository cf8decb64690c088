//! Component registry: grouping and resolving task factories.
//!
//! Factories are registered in named [`Component`]s, and components are held
//! in a [`ComponentRegistry`] that resolves a task kind to its factory. The
//! registry is populated once at host startup (`register`/`add_component`
//! take `&mut self`) and read-only afterwards (lookups take `&self`), so a
//! populated registry can be shared behind an `Arc` without synchronization.
//!
//! Registration is also where implementation origin is dispatched on:
//! [`Registration::Foreign`] definitions are wrapped in the adapter exactly
//! once, here, and nothing downstream branches on origin again.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::alog_debug;
use crate::core::factory::TaskFactory;
use crate::core::origin::{ForeignFactoryAdapter, ForeignTaskDef, Origin};
use crate::core::task::Task;
use crate::document::Document;
use crate::error::{Error, Result};

/// A factory being registered, tagged with its implementation origin.
///
/// This enum is the single origin-dispatch point: native factories pass
/// through unchanged, foreign definitions get wrapped in
/// [`ForeignFactoryAdapter`].
pub enum Registration {
    /// A factory implemented against the native contract.
    Native(Arc<dyn TaskFactory>),
    /// A definition authored against the foreign calling convention.
    Foreign(Arc<dyn ForeignTaskDef>),
}

impl Registration {
    /// Origin this registration will report once stored.
    pub fn origin(&self) -> Origin {
        match self {
            Registration::Native(_) => Origin::Native,
            Registration::Foreign(_) => Origin::Foreign,
        }
    }

    fn into_factory(self) -> Arc<dyn TaskFactory> {
        match self {
            Registration::Native(factory) => factory,
            Registration::Foreign(def) => Arc::new(ForeignFactoryAdapter::new(def)),
        }
    }
}

/// A named group of task factories.
///
/// Components bundle related task kinds (e.g. everything a database
/// connector offers) under one name and one info string, and render
/// documentation for their kinds from factory metadata.
pub struct Component {
    /// Component name, unique within a registry.
    name: String,
    /// One-line human-readable summary.
    info: String,
    /// Factories by kind name.
    factories: HashMap<String, Arc<dyn TaskFactory>>,
}

impl Component {
    /// Create an empty component.
    pub fn new(name: &str, info: &str) -> Self {
        Self {
            name: name.to_string(),
            info: info.to_string(),
            factories: HashMap::new(),
        }
    }

    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// One-line summary.
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Register a factory, adapting foreign definitions at this boundary.
    ///
    /// Rejects a kind name that is already present in this component.
    pub fn register(&mut self, registration: Registration) -> Result<()> {
        let origin = registration.origin();
        let factory = registration.into_factory();
        let kind = factory.kind_name().to_string();
        if self.factories.contains_key(&kind) {
            return Err(Error::DuplicateKind(kind));
        }
        alog_debug!(
            "component '{}': registered kind '{}' (origin: {})",
            self.name,
            kind,
            origin
        );
        self.factories.insert(kind, factory);
        Ok(())
    }

    /// Look up a factory by kind name.
    pub fn factory(&self, kind_name: &str) -> Option<Arc<dyn TaskFactory>> {
        self.factories.get(kind_name).cloned()
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Render human-readable documentation for every kind in this component.
    pub fn doc(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Component: {}", self.name);
        let _ = writeln!(out, "{}", self.info);
        for kind in self.kinds() {
            let factory = &self.factories[kind];
            let _ = writeln!(out);
            let _ = writeln!(out, "  {} ({})", kind, factory.origin());
            let _ = writeln!(out, "    {}", factory.info());
            let _ = writeln!(out, "    {}", factory.description());
            let schema = factory.parameter_schema();
            if !schema.is_empty() {
                let _ = writeln!(out, "    parameters:");
                for key in schema.keys() {
                    let value = schema.get(key).and_then(|v| v.as_str()).unwrap_or("");
                    let _ = writeln!(out, "      {}: {}", key, value);
                }
            }
            let defaults = factory.default_config();
            if !defaults.is_empty() {
                let _ = writeln!(
                    out,
                    "    defaults: {}",
                    serde_json::to_string(&defaults).unwrap_or_default()
                );
            }
            match factory.output_schema() {
                Some(output) => {
                    let _ = writeln!(
                        out,
                        "    output: {}",
                        serde_json::to_string(&output).unwrap_or_default()
                    );
                }
                None => {
                    let _ = writeln!(out, "    output: (dynamic)");
                }
            }
        }
        out
    }
}

/// Process-level lookup table from task kind to factory.
///
/// Populated once at startup, read-only thereafter. Kind names are unique
/// across the whole registry, so `resolve` never has to disambiguate.
#[derive(Default)]
pub struct ComponentRegistry {
    components: HashMap<String, Component>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Add a fully populated component.
    ///
    /// Rejects duplicate component names and kind names that collide with a
    /// kind from an already-registered component.
    pub fn add_component(&mut self, component: Component) -> Result<()> {
        if self.components.contains_key(component.name()) {
            return Err(Error::DuplicateComponent(component.name().to_string()));
        }
        for existing in self.components.values() {
            for kind in component.kinds() {
                if existing.factory(kind).is_some() {
                    return Err(Error::DuplicateKind(kind.to_string()));
                }
            }
        }
        alog_debug!(
            "registry: added component '{}' with kinds {:?}",
            component.name(),
            component.kinds()
        );
        self.components.insert(component.name().to_string(), component);
        Ok(())
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Registered component names, sorted.
    pub fn component_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.components.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a task kind to its factory.
    pub fn resolve(&self, kind_name: &str) -> Result<Arc<dyn TaskFactory>> {
        self.components
            .values()
            .find_map(|c| c.factory(kind_name))
            .ok_or_else(|| Error::KindNotFound(kind_name.to_string()))
    }

    /// Resolve a task kind within a specific component.
    pub fn resolve_in(&self, component_name: &str, kind_name: &str) -> Result<Arc<dyn TaskFactory>> {
        let component = self
            .components
            .get(component_name)
            .ok_or_else(|| Error::ComponentNotFound(component_name.to_string()))?;
        component
            .factory(kind_name)
            .ok_or_else(|| Error::KindNotFound(kind_name.to_string()))
    }

    /// Resolve a kind and construct a task from it in one step.
    pub fn instantiate(
        &self,
        kind_name: &str,
        instance_name: &str,
        params: &Document,
        reference: &Document,
    ) -> Result<Box<dyn Task>> {
        let factory = self.resolve(kind_name)?;
        alog_debug!(
            "registry: instantiating '{}' as '{}'",
            kind_name,
            instance_name
        );
        factory.create(instance_name, params, reference)
    }
}
