use crate::core::types::{LogLevel, OutputTarget};
use chrono::Utc;
use serde_json::json;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Output destination abstraction, selected once per run.
///
/// The sink carries workflow output; diagnostics go through `tracing` and
/// never through here.
pub trait Sink: Send + Sync {
    fn emit(&self, level: LogLevel, message: &str);

    /// Interactive sinks connect subprocess streams directly instead of
    /// capturing them.
    fn is_interactive(&self) -> bool {
        false
    }
}

/// Live terminal output; subprocesses inherit the engine's own streams.
pub struct StdoutSink;

impl Sink for StdoutSink {
    fn emit(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => eprintln!("{}", message),
            _ => println!("{}", message),
        }
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Structured log-file output: one severity-tagged JSON record appended per
/// emission to a dated file in the temp directory.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new() -> Self {
        let name = format!("runbook-{}.log", Utc::now().format("%Y%m%d"));
        FileSink {
            path: std::env::temp_dir().join(name),
        }
    }

    pub fn at(path: PathBuf) -> Self {
        FileSink { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Sink for FileSink {
    fn emit(&self, level: LogLevel, message: &str) {
        let record = json!({
            "time": Utc::now().to_rfc3339(),
            "level": level.as_str(),
            "msg": message,
        });
        let appended = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| {
                let pretty = serde_json::to_string_pretty(&record).unwrap_or_default();
                writeln!(file, "{}", pretty)
            });
        if let Err(err) = appended {
            tracing::warn!("failed to append to log file {}: {}", self.path.display(), err);
        }
    }
}

/// HTTP-response output: records accumulate in a shared buffer that the
/// transport writes into the in-flight response.
pub struct RestSink {
    buffer: Arc<Mutex<String>>,
}

impl RestSink {
    pub fn new(buffer: Arc<Mutex<String>>) -> Self {
        RestSink { buffer }
    }
}

impl Sink for RestSink {
    fn emit(&self, level: LogLevel, message: &str) {
        let record = json!({
            "level": level.as_str(),
            "msg": message,
        });
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push_str(&record.to_string());
            buffer.push('\n');
        }
    }
}

/// Select a sink for the resolved output target. The rest target needs a
/// response buffer; without one it degrades to stdout so output is never
/// silently dropped.
pub fn select(target: OutputTarget, rest_buffer: Option<Arc<Mutex<String>>>) -> Arc<dyn Sink> {
    match target {
        OutputTarget::Stdout => Arc::new(StdoutSink),
        OutputTarget::File => Arc::new(FileSink::new()),
        OutputTarget::Rest => match rest_buffer {
            Some(buffer) => Arc::new(RestSink::new(buffer)),
            None => {
                tracing::warn!("rest output requested without a response buffer; using stdout");
                Arc::new(StdoutSink)
            }
        },
    }
}
