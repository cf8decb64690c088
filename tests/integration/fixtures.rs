//! Test fixtures for integration tests.
//!
//! Provides:
//! - A native arithmetic factory (`AddFactory`)
//! - A foreign-convention subtraction definition (`SubDef`)
//! - An instrumented task holding an observable fake resource (`CounterTask`)

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use anvil::{Document, Error, ForeignTaskDef, Result, Task, TaskFactory};

/// Build a parameter document from a JSON literal.
pub fn params(value: Value) -> Document {
    Document::wrap(value)
}

/// Task produced by [`AddFactory`].
pub struct AddTask {
    name: String,
    a: i64,
    b: i64,
}

#[async_trait]
impl Task for AddTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn work(&mut self) -> Result<Document> {
        Ok(Document::wrap(json!(self.a + self.b)))
    }
}

/// Native factory for a task that adds two required integers.
pub struct AddFactory;

impl TaskFactory for AddFactory {
    fn kind_name(&self) -> &str {
        "add"
    }

    fn info(&self) -> &str {
        "Adds two integers"
    }

    fn description(&self) -> &str {
        "Adds the required integer parameters a and b and reports the sum."
    }

    fn parameter_schema(&self) -> Document {
        Document::wrap(json!({
            "a": "integer, required",
            "b": "integer, required",
        }))
    }

    fn output_schema(&self) -> Option<Document> {
        Some(Document::wrap(json!({"stats": "integer"})))
    }

    fn create(
        &self,
        instance_name: &str,
        params: &Document,
        _reference: &Document,
    ) -> Result<Box<dyn Task>> {
        let config = self.merged_config(params);
        let a = config.require_i64("a")?;
        let b = config.require_i64("b")?;
        Ok(Box::new(AddTask {
            name: instance_name.to_string(),
            a,
            b,
        }))
    }
}

/// Task produced by [`SubDef`].
pub struct SubTask {
    name: String,
    num1: i64,
    num2: i64,
}

#[async_trait]
impl Task for SubTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn work(&mut self) -> Result<Document> {
        Ok(Document::wrap(json!(self.num1 - self.num2)))
    }
}

/// Foreign-convention definition of a subtraction task: owned-string
/// metadata, `Null` sentinels for absent schemas, message-string failures.
pub struct SubDef;

impl ForeignTaskDef for SubDef {
    fn kind_name(&self) -> String {
        "sub".to_string()
    }

    fn info(&self) -> String {
        "Subtracts two integers".to_string()
    }

    fn description(&self) -> String {
        "Subtracts num2 from num1 and reports the difference.".to_string()
    }

    fn default_config(&self) -> Value {
        json!({"num2": 0})
    }

    fn create(
        &self,
        name: &str,
        merged: &Value,
        _reference: &Value,
    ) -> std::result::Result<Box<dyn Task>, String> {
        let num1 = merged
            .get("num1")
            .and_then(Value::as_i64)
            .ok_or("num1 must be an integer")?;
        let num2 = merged
            .get("num2")
            .and_then(Value::as_i64)
            .ok_or("num2 must be an integer")?;
        Ok(Box::new(SubTask {
            name: name.to_string(),
            num1,
            num2,
        }))
    }
}

/// Shared observable state of a [`CounterTask`]'s fake resource.
#[derive(Clone, Default)]
pub struct CounterProbe {
    pub acquired: Arc<AtomicBool>,
    pub released: Arc<AtomicBool>,
    pub setup_calls: Arc<AtomicUsize>,
    pub work_calls: Arc<AtomicUsize>,
    pub teardown_calls: Arc<AtomicUsize>,
}

impl CounterProbe {
    pub fn acquired(&self) -> bool {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }

    pub fn setup_count(&self) -> usize {
        self.setup_calls.load(Ordering::SeqCst)
    }

    pub fn teardown_count(&self) -> usize {
        self.teardown_calls.load(Ordering::SeqCst)
    }

    pub fn work_count(&self) -> usize {
        self.work_calls.load(Ordering::SeqCst)
    }
}

/// Instrumented task that acquires a fake counter resource in setup and can
/// be told to fail or stall in any phase.
pub struct CounterTask {
    name: String,
    pub fail_setup: bool,
    pub fail_work: bool,
    pub fail_teardown: bool,
    pub slow_work: bool,
    probe: CounterProbe,
}

impl CounterTask {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_setup: false,
            fail_work: false,
            fail_teardown: false,
            slow_work: false,
            probe: CounterProbe::default(),
        }
    }

    /// Handle to the observable resource state.
    pub fn probe(&self) -> CounterProbe {
        self.probe.clone()
    }
}

#[async_trait]
impl Task for CounterTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&mut self) -> Result<()> {
        self.probe.setup_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_setup {
            return Err(Error::Setup("counter unavailable".to_string()));
        }
        self.probe.acquired.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn work(&mut self) -> Result<Document> {
        self.probe.work_calls.fetch_add(1, Ordering::SeqCst);
        if self.slow_work {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        if self.fail_work {
            return Err(Error::Execution("counter overflow".to_string()));
        }
        Ok(Document::wrap(json!({"count": 1})))
    }

    async fn teardown(&mut self) -> Result<()> {
        self.probe.teardown_calls.fetch_add(1, Ordering::SeqCst);
        self.probe.released.store(true, Ordering::SeqCst);
        if self.fail_teardown {
            return Err(Error::Teardown("release failed".to_string()));
        }
        Ok(())
    }
}
