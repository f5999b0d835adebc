//! Error types for the report runner

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Suite parse error: {0}")]
    SuiteParse(String),

    #[error("Suite directory not found: {0}")]
    SuiteNotFound(String),

    #[error("Unknown contribution: {0}")]
    UnknownContribution(String),

    #[error("No pending test with key: {0}")]
    NotPending(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Common(#[from] thyme_common::Error),
}

pub type RunnerResult<T> = Result<T, RunnerError>;
