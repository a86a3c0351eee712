use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad classification for structured errors raised anywhere in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The input document could not be parsed at all.
    DocumentError,
    /// The document parsed but violates an operation contract.
    ValidationError,
    /// A subprocess could not be spawned or exited non-zero.
    ExecutionError,
    /// A `conf` operation failed to materialize its destination file.
    ConfigWriteError,
    IoError,
    NetworkError,
    InternalError,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::DocumentError => "DOCUMENT",
            ErrorCategory::ValidationError => "VALIDATION",
            ErrorCategory::ExecutionError => "EXECUTION",
            ErrorCategory::ConfigWriteError => "CONFIG_WRITE",
            ErrorCategory::IoError => "IO",
            ErrorCategory::NetworkError => "NETWORK",
            ErrorCategory::InternalError => "INTERNAL",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// Severity label attached to every sink record.
///
/// The configured level is the level a run's regular records are emitted at,
/// mirroring the document's `logging.level` entry; it is not a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Info,
    Warn,
    Error,
    Debug,
    Trace,
    Fatal,
    Panic,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
            LogLevel::Fatal => "fatal",
            LogLevel::Panic => "panic",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            "fatal" => Ok(LogLevel::Fatal),
            "panic" => Ok(LogLevel::Panic),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Destination for workflow output, selected once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    /// Subprocess streams connected directly to the runner's own.
    #[default]
    Stdout,
    /// Captured output appended as JSON records to a dated temp-dir log file.
    File,
    /// Captured output written into the in-flight HTTP response.
    Rest,
}

impl FromStr for OutputTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdout" => Ok(OutputTarget::Stdout),
            "file" => Ok(OutputTarget::File),
            "rest" => Ok(OutputTarget::Rest),
            other => Err(format!("unknown output target: {}", other)),
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputTarget::Stdout => "stdout",
            OutputTarget::File => "file",
            OutputTarget::Rest => "rest",
        };
        write!(f, "{}", name)
    }
}
