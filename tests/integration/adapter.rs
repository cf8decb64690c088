//! Foreign-convention definitions behind the native contract, end to end.

use std::sync::Arc;

use serde_json::json;

use anvil::{driver, Document, Error, ForeignFactoryAdapter, Origin, TaskFactory};

use crate::fixtures::{params, SubDef};

#[test]
fn test_adapter_presents_native_metadata() {
    let factory = ForeignFactoryAdapter::new(Arc::new(SubDef));
    assert_eq!(factory.kind_name(), "sub");
    assert_eq!(factory.info(), "Subtracts two integers");
    assert_eq!(factory.origin(), Origin::Foreign);
}

#[test]
fn test_adapter_translates_sentinels() {
    let factory = ForeignFactoryAdapter::new(Arc::new(SubDef));
    // Null parameter schema becomes an empty document; Null output schema
    // becomes an explicit absence.
    assert!(factory.parameter_schema().is_empty());
    assert!(factory.output_schema().is_none());
    // A present default config crosses intact.
    assert_eq!(factory.default_config().get("num2"), Some(&json!(0)));
}

#[tokio::test]
async fn test_foreign_task_runs_through_native_driver() {
    let factory = ForeignFactoryAdapter::new(Arc::new(SubDef));
    let task = factory
        .create(
            "diff1",
            &params(json!({"num1": 9, "num2": 4})),
            &Document::empty(),
        )
        .unwrap();

    let report = driver::run(task).await.unwrap();
    assert_eq!(report.task_name, "diff1");
    assert_eq!(report.output.get("stats"), Some(&json!(5)));
}

#[tokio::test]
async fn test_foreign_default_config_participates_in_merge() {
    let factory = ForeignFactoryAdapter::new(Arc::new(SubDef));
    // num2 falls back to the foreign definition's default of 0.
    let task = factory
        .create("diff2", &params(json!({"num1": 7})), &Document::empty())
        .unwrap();

    let report = driver::run(task).await.unwrap();
    assert_eq!(report.output.get("stats"), Some(&json!(7)));
}

#[test]
fn test_foreign_failure_surfaces_as_configuration_error() {
    let factory = ForeignFactoryAdapter::new(Arc::new(SubDef));
    let err = factory
        .create("bad", &params(json!({"num2": 1})), &Document::empty())
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(msg) if msg.contains("num1")));
}
