#![allow(clippy::result_large_err)] // Builders return AppError so callers keep structured diagnostics.

pub mod compose;
pub mod conf;
pub mod docker;
pub mod exec;
pub mod shell;
pub mod ssh;

use crate::core::engine::environment::Environment;
use crate::core::engine::schema::{Operation, OperationKind};
use crate::core::error::AppError;

/// Planned file write for a `conf` operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWrite {
    pub dest: String,
    pub content: String,
    pub mode: u32,
}

/// What an operation builds: subprocess invocations to run in order, a file
/// write, or a sink-reported skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Invocations(Vec<Vec<String>>),
    WriteConfig(ConfigWrite),
    Skip(String),
}

/// Build the execution plan for one operation.
///
/// Dispatch is an exhaustive match over the operation kind; a misspelled
/// type never reaches this point because validation resolves kinds first.
pub fn build_operation(operation: &Operation, env: &Environment) -> Result<Plan, AppError> {
    let kind = operation.kind().map_err(|reason| {
        AppError::new(crate::core::types::ErrorCategory::ValidationError, reason)
    })?;
    match kind {
        OperationKind::Exec => Ok(exec::build(operation, env)),
        OperationKind::Shell => Ok(shell::build(operation, env)),
        OperationKind::Docker => docker::build(operation, env),
        OperationKind::DockerCompose => Ok(compose::build(operation, env)),
        OperationKind::Ssh => ssh::build(operation, env),
        OperationKind::Conf => Ok(conf::build(operation, env)),
    }
}

/// Split extracted values into semicolon-delimited fragments.
///
/// Values are joined with a single space first, so a separator may sit at
/// the end of one element or inside another. Empty and whitespace-only
/// fragments are dropped.
pub fn split_fragments(values: &[String]) -> Vec<String> {
    values
        .join(" ")
        .split(';')
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whitespace tokenization, deliberately not a shell parser: no quoting.
pub fn tokenize(fragment: &str) -> Vec<String> {
    fragment.split_whitespace().map(str::to_string).collect()
}
