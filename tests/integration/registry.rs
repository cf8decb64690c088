//! Component registration and resolution, end to end.

use std::sync::Arc;

use serde_json::json;

use anvil::{driver, Component, ComponentRegistry, Document, Error, Origin, Registration};

use crate::fixtures::{params, AddFactory, SubDef};

fn math_registry() -> ComponentRegistry {
    let mut component = Component::new("math", "Arithmetic demo tasks");
    component
        .register(Registration::Native(Arc::new(AddFactory)))
        .unwrap();
    component
        .register(Registration::Foreign(Arc::new(SubDef)))
        .unwrap();

    let mut registry = ComponentRegistry::new();
    registry.add_component(component).unwrap();
    registry
}

#[test]
fn test_resolve_returns_factory_metadata() {
    let registry = math_registry();
    let factory = registry.resolve("add").unwrap();
    assert_eq!(factory.kind_name(), "add");
    assert_eq!(factory.origin(), Origin::Native);
    assert!(factory.output_schema().is_some());
}

#[test]
fn test_resolve_unknown_kind_fails() {
    let registry = math_registry();
    let err = registry.resolve("mul").unwrap_err();
    assert!(matches!(err, Error::KindNotFound(kind) if kind == "mul"));
}

#[tokio::test]
async fn test_instantiate_and_run_add_task() {
    let registry = math_registry();
    let task = registry
        .instantiate(
            "add",
            "sum1",
            &params(json!({"a": 2, "b": 3})),
            &Document::empty(),
        )
        .unwrap();

    let report = driver::run(task).await.unwrap();
    assert_eq!(report.output.get("stats"), Some(&json!(5)));
}

#[test]
fn test_missing_parameter_fails_before_construction() {
    let registry = math_registry();
    let err = registry
        .instantiate("add", "bad", &params(json!({"a": 2})), &Document::empty())
        .unwrap_err();
    assert!(matches!(err, Error::MissingParameter { key } if key == "b"));
}

#[test]
fn test_registry_shared_after_population() {
    // Once populated, the registry is read-only and safe to share.
    let registry = Arc::new(math_registry());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..100 {
                    assert!(registry.resolve("add").is_ok());
                    assert!(registry.resolve("sub").is_ok());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_component_documentation_rendering() {
    let registry = math_registry();
    let doc = registry.component("math").unwrap().doc();
    assert!(doc.contains("Component: math"));
    assert!(doc.contains("add (native)"));
    assert!(doc.contains("sub (foreign)"));
    assert!(doc.contains("Adds two integers"));
}

#[test]
fn test_duplicate_kind_across_components_rejected() {
    let mut registry = math_registry();

    let mut clash = Component::new("clash", "Also defines add");
    clash
        .register(Registration::Native(Arc::new(AddFactory)))
        .unwrap();

    let err = registry.add_component(clash).unwrap_err();
    assert!(matches!(err, Error::DuplicateKind(kind) if kind == "add"));
}
