#![allow(clippy::result_large_err)] // Schema APIs return AppError to preserve structured validation context without boxing.

use crate::core::error::AppError;
use crate::core::types::{LogLevel, OutputTarget};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root document for a workflow run.
///
/// Unrecognized top-level keys are ignored, not errors. The document is built
/// once per invocation from raw input bytes and immutable thereafter; value
/// expansion is deferred to build time.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct WorkflowDocument {
    #[serde(default)]
    pub logging: Vec<LoggingEntry>,
    #[serde(default)]
    pub env: Vec<EnvEntry>,
    #[serde(default)]
    pub cmd: Vec<Operation>,
}

/// One entry of the `logging` list. Entries are single-key maps in the input,
/// so both fields are optional here; resolution is last-one-wins.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LoggingEntry {
    #[serde(default)]
    pub level: Option<LogLevel>,
    #[serde(default)]
    pub output: Option<OutputTarget>,
}

/// Declared environment entry, applied in document order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvEntry {
    pub key: String,
    pub value: String,
}

/// The six operation types the engine knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Exec,
    Shell,
    Docker,
    DockerCompose,
    Ssh,
    Conf,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Exec => "exec",
            OperationKind::Shell => "shell",
            OperationKind::Docker => "docker",
            OperationKind::DockerCompose => "docker-compose",
            OperationKind::Ssh => "ssh",
            OperationKind::Conf => "conf",
        }
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exec" => Ok(OperationKind::Exec),
            "shell" => Ok(OperationKind::Shell),
            "docker" => Ok(OperationKind::Docker),
            "docker-compose" => Ok(OperationKind::DockerCompose),
            "ssh" => Ok(OperationKind::Ssh),
            "conf" => Ok(OperationKind::Conf),
            other => Err(format!("unknown operation type: {}", other)),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the `cmd` list: a single unit of work of a declared type.
///
/// `values` and the option lists stay as raw YAML values here; the value
/// extractor normalizes them to ordered string lists on demand.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Operation {
    /// Declared type string; resolved through [`Operation::kind`] so the
    /// validator can report unknown types with the operation index.
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    /// Controls `$VAR` expansion of extracted string fields.
    #[serde(default)]
    pub expandenv: bool,
    #[serde(default)]
    pub values: Option<serde_yaml::Value>,

    // ssh
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub options: Option<serde_yaml::Value>,

    // docker and docker-compose
    #[serde(default)]
    pub container: Option<String>,
    /// Docker sub-command (`run`/`exec`) or compose sub-command (`up`, ...).
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub dcoptions: Option<serde_yaml::Value>,
    #[serde(default)]
    pub cmdoptions: Option<serde_yaml::Value>,

    // conf
    #[serde(default)]
    pub confdata: Option<String>,
    #[serde(default)]
    pub confdest: Option<String>,
    #[serde(default)]
    pub confperm: Option<serde_yaml::Value>,
}

impl Operation {
    pub fn kind(&self) -> Result<OperationKind, String> {
        if self.type_name.is_empty() {
            return Err("missing 'type' field".to_string());
        }
        OperationKind::from_str(&self.type_name)
    }

    /// True when the `values` field would extract to a non-empty list.
    ///
    /// An explicit empty list still counts as "no values": empty-values
    /// operations are valid placeholders and must not trip type-specific
    /// required-field checks.
    pub fn has_values(&self) -> bool {
        match &self.values {
            None | Some(serde_yaml::Value::Null) => false,
            Some(serde_yaml::Value::Sequence(seq)) => !seq.is_empty(),
            Some(_) => true,
        }
    }
}

impl WorkflowDocument {
    /// Resolve the logging configuration, last-one-wins across entries.
    pub fn logging_settings(&self) -> (OutputTarget, LogLevel) {
        let mut target = OutputTarget::default();
        let mut level = LogLevel::default();
        for entry in &self.logging {
            if let Some(output) = entry.output {
                target = output;
            }
            if let Some(entry_level) = entry.level {
                level = entry_level;
            }
        }
        (target, level)
    }
}

/// Parse raw input bytes into a [`WorkflowDocument`].
pub fn parse(input: &[u8]) -> Result<WorkflowDocument, AppError> {
    let document: WorkflowDocument = serde_yaml::from_slice(input)?;
    Ok(document)
}

/// Validate every operation before any subprocess runs.
///
/// Violations name the 1-based operation index and the broken rule.
pub fn validate(document: &WorkflowDocument) -> Result<(), AppError> {
    for (position, operation) in document.cmd.iter().enumerate() {
        let index = position + 1;
        validate_operation(operation, index)?;
    }
    Ok(())
}

fn validate_operation(operation: &Operation, index: usize) -> Result<(), AppError> {
    let kind = operation
        .kind()
        .map_err(|reason| AppError::validation_at(index, reason))?;

    match kind {
        OperationKind::Docker => {
            // Required fields are only enforced when values are present so
            // empty operations stay usable as placeholders.
            if operation.has_values() {
                if operation.container.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::validation_at(
                        index,
                        "docker command with values requires 'container' field",
                    ));
                }
                if operation.command.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::validation_at(
                        index,
                        "docker command with values requires 'command' field",
                    ));
                }
            }
        }
        OperationKind::Ssh => {
            if operation.has_values() {
                if operation.user.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::validation_at(
                        index,
                        "ssh command with values requires 'user' field",
                    ));
                }
                if operation.host.as_deref().unwrap_or("").is_empty() {
                    return Err(AppError::validation_at(
                        index,
                        "ssh command with values requires 'host' field",
                    ));
                }
            }
        }
        OperationKind::Conf => {
            // The pairing rule holds unconditionally: data and destination
            // appear together or not at all.
            let has_data = operation.confdata.as_deref().unwrap_or("") != "";
            let has_dest = operation.confdest.as_deref().unwrap_or("") != "";
            if has_dest && !has_data {
                return Err(AppError::validation_at(
                    index,
                    "config command with 'confdest' requires 'confdata' field",
                ));
            }
            if has_data && !has_dest {
                return Err(AppError::validation_at(
                    index,
                    "config command with 'confdata' requires 'confdest' field",
                ));
            }
        }
        OperationKind::Exec | OperationKind::Shell | OperationKind::DockerCompose => {}
    }

    Ok(())
}

/// Parse and validate in one step; the engine's fail-fast boundary.
pub fn load(input: &[u8]) -> Result<WorkflowDocument, AppError> {
    let document = parse(input)?;
    validate(&document)?;
    Ok(document)
}

/// Convenience check used by callers that only want a verdict.
pub fn check(input: &[u8]) -> Result<usize, AppError> {
    let document = load(input)?;
    Ok(document.cmd.len())
}
