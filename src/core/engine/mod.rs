#![allow(clippy::result_large_err)] // Engine entry points return AppError for structured diagnostics without boxing.

pub mod builders;
pub mod environment;
pub mod executor;
pub mod schema;
pub mod sink;
pub mod values;

pub use environment::Environment;
pub use executor::{CommandRunner, ExecutionOutput, ExecutionRequest, TokioCommandRunner};
pub use schema::{Operation, OperationKind, WorkflowDocument};
pub use sink::Sink;

use crate::core::error::AppError;
use crate::core::types::{ErrorCategory, LogLevel, OutputTarget};
use builders::{ConfigWrite, Plan};
use std::sync::{Arc, Mutex};

/// The workflow execution engine.
///
/// One pass, no repeat states: parse and validate, initialize the
/// environment, select the sink, then attempt every operation strictly in
/// document order. Document and validation failures abort before any
/// subprocess starts; execution and config-write failures are reported
/// through the sink and the run continues with the next operation.
pub struct Engine {
    runner: Arc<dyn CommandRunner>,
    sink_override: Option<OutputTarget>,
    rest_buffer: Option<Arc<Mutex<String>>>,
}

impl Engine {
    pub fn new() -> Self {
        Engine {
            runner: Arc::new(TokioCommandRunner),
            sink_override: None,
            rest_buffer: None,
        }
    }

    /// Substitute the subprocess runner; the seam tests use for stubbing.
    pub fn with_runner(runner: Arc<dyn CommandRunner>) -> Self {
        Engine {
            runner,
            sink_override: None,
            rest_buffer: None,
        }
    }

    /// Force a sink regardless of the document's logging configuration.
    pub fn force_output(mut self, target: OutputTarget) -> Self {
        self.sink_override = Some(target);
        self
    }

    /// Bind the rest sink to a response buffer and force rest output; the
    /// HTTP transport uses this for every request.
    pub fn with_rest_buffer(mut self, buffer: Arc<Mutex<String>>) -> Self {
        self.rest_buffer = Some(buffer);
        self.sink_override = Some(OutputTarget::Rest);
        self
    }

    /// Execute a workflow document from raw input bytes.
    pub async fn execute(&self, input: &[u8], debug: bool) -> Result<(), AppError> {
        // Fail-fast boundary: every operation is validated before any
        // subprocess runs.
        let document = schema::load(input)?;
        if debug {
            tracing::debug!(
                operations = document.cmd.len(),
                env_entries = document.env.len(),
                "document loaded"
            );
        }

        let mut env = Environment::from_process();
        for entry in &document.env {
            env.set(&entry.key, &entry.value);
        }

        let (configured_target, level) = document.logging_settings();
        let target = self.sink_override.unwrap_or(configured_target);
        let sink = sink::select(target, self.rest_buffer.clone());

        for (position, operation) in document.cmd.iter().enumerate() {
            let index = position + 1;
            self.run_operation(operation, index, &env, &sink, level)
                .await;
        }
        Ok(())
    }

    async fn run_operation(
        &self,
        operation: &Operation,
        index: usize,
        env: &Environment,
        sink: &Arc<dyn Sink>,
        level: LogLevel,
    ) {
        if let Some(desc) = operation.desc.as_deref() {
            if !desc.is_empty() {
                sink.emit(level, &format!("==> {}", desc));
            }
        }

        let plan = match builders::build_operation(operation, env) {
            Ok(plan) => plan,
            Err(mut err) => {
                // Validation catches these before execution; anything left
                // is reported and the operation abandoned.
                err.add_context("operation_index", &index.to_string());
                tracing::error!(operation = index, "build failed: {}", err);
                sink.emit(LogLevel::Error, &format!("Error: {}", err.message));
                return;
            }
        };

        match plan {
            Plan::Skip(reason) => sink.emit(LogLevel::Warn, &reason),
            Plan::Invocations(argvs) => {
                for argv in argvs {
                    let result = executor::run_invocation(
                        &self.runner,
                        sink,
                        env.seed(),
                        level,
                        argv,
                    )
                    .await;
                    if let Err(err) = result {
                        // Abandon the rest of this operation's fragments and
                        // continue the run with the next operation.
                        tracing::warn!(operation = index, "execution failed: {}", err);
                        break;
                    }
                }
            }
            Plan::WriteConfig(write) => {
                if let Err(err) = apply_config_write(&write) {
                    tracing::warn!(operation = index, "config write failed: {}", err);
                    sink.emit(LogLevel::Error, &format!("Error: {}", err.message));
                } else {
                    sink.emit(level, &format!("# create {}", write.dest));
                }
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-attempt file write for a `conf` operation; failure is fatal to
/// the operation, not to the run.
fn apply_config_write(write: &ConfigWrite) -> Result<(), AppError> {
    std::fs::write(&write.dest, write.content.as_bytes()).map_err(|err| {
        AppError::new(
            ErrorCategory::ConfigWriteError,
            format!("failed to write {}: {}", write.dest, err),
        )
        .context("path", &write.dest)
        .with_code("RBK-CONF-001")
    })?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&write.dest, Permissions::from_mode(write.mode)).map_err(
            |err| {
                AppError::new(
                    ErrorCategory::ConfigWriteError,
                    format!("failed to set mode on {}: {}", write.dest, err),
                )
                .context("path", &write.dest)
                .with_code("RBK-CONF-002")
            },
        )?;
    }
    Ok(())
}

/// Engine entry point consumed by every caller: run the document with the
/// default subprocess runner and the document's own sink selection.
pub async fn execute(input: &[u8], debug: bool) -> Result<(), AppError> {
    Engine::new().execute(input, debug).await
}
