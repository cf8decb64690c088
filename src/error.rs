use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required parameter: {key}")]
    MissingParameter { key: String },

    #[error("Parameter '{key}' has wrong type (expected {expected})")]
    MistypedParameter { key: String, expected: &'static str },

    #[error("Setup failed: {0}")]
    Setup(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Teardown failed: {0}")]
    Teardown(String),

    #[error("Invalid lifecycle transition from {from} to {to}")]
    LifecycleViolation { from: String, to: String },

    #[error("Task kind not found: {0}")]
    KindNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Task kind already registered: {0}")]
    DuplicateKind(String),

    #[error("Component already registered: {0}")]
    DuplicateComponent(String),

    #[error("Task '{0}' was cancelled")]
    Cancelled(String),
}

pub type Result<T> = std::result::Result<T, Error>;
