#![allow(clippy::result_large_err)] // Executor APIs return AppError to surface subprocess diagnostics without boxing.

use crate::core::engine::sink::Sink;
use crate::core::error::AppError;
use crate::core::types::LogLevel;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

const OUTPUT_CAPTURE_LIMIT_BYTES: usize = 1_048_576;

/// One subprocess to run: the argument vector, the declared-variable seed
/// list appended to the inherited environment, and whether output is
/// captured for the sink or streamed interactively.
#[derive(Clone, Debug)]
pub struct ExecutionRequest {
    pub argv: Vec<String>,
    pub env: Vec<(String, String)>,
    pub capture: bool,
}

#[derive(Clone, Debug)]
pub struct ExecutionOutput {
    /// Combined stdout and stderr when captured; empty for interactive runs.
    pub combined: String,
    pub exit_code: i32,
}

/// Seam between the engine and the operating system. Production uses the
/// tokio-backed runner; tests substitute a recording stub.
#[async_trait]
pub trait CommandRunner: Send + Sync + 'static {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, AppError>;
}

pub struct TokioCommandRunner;

#[async_trait]
impl CommandRunner for TokioCommandRunner {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, AppError> {
        let program = request
            .argv
            .first()
            .ok_or_else(|| AppError::execution("empty argument vector", &request.argv))?;
        let mut command = Command::new(program);
        command.args(&request.argv[1..]);
        // Declared variables are appended over the inherited environment so
        // they shadow inherited ones at invocation time, not earlier.
        for (key, value) in &request.env {
            command.env(key, value);
        }

        if request.capture {
            command.stdin(Stdio::null());
            command.stdout(Stdio::piped());
            command.stderr(Stdio::piped());
            let output = command.output().await.map_err(|err| {
                AppError::execution(format!("failed to spawn command: {}", err), &request.argv)
            })?;
            let mut combined = limit_bytes(&output.stdout);
            combined.push_str(&limit_bytes(&output.stderr));
            Ok(ExecutionOutput {
                combined,
                exit_code: output.status.code().unwrap_or(-1),
            })
        } else {
            command.stdin(Stdio::inherit());
            command.stdout(Stdio::inherit());
            command.stderr(Stdio::inherit());
            let status = command.status().await.map_err(|err| {
                AppError::execution(format!("failed to spawn command: {}", err), &request.argv)
            })?;
            Ok(ExecutionOutput {
                combined: String::new(),
                exit_code: status.code().unwrap_or(-1),
            })
        }
    }
}

/// Run one argument vector and report through the sink.
///
/// The built vector is echoed first, then the run happens, then captured
/// output (if any) is recorded. Failure is reported at error severity with
/// the vector and output attached and surfaced to the orchestrator, which
/// abandons the operation but continues the run.
pub async fn run_invocation(
    runner: &Arc<dyn CommandRunner>,
    sink: &Arc<dyn Sink>,
    env_seed: &[(String, String)],
    level: LogLevel,
    argv: Vec<String>,
) -> Result<(), AppError> {
    sink.emit(level, &argv.join(" "));
    tracing::debug!(argv = %argv.join(" "), "executing");

    let request = ExecutionRequest {
        argv: argv.clone(),
        env: env_seed.to_vec(),
        capture: !sink.is_interactive(),
    };
    let output = match runner.run(&request).await {
        Ok(output) => output,
        Err(err) => {
            sink.emit(LogLevel::Error, &format!("Error: {}", err.message));
            return Err(err);
        }
    };

    if output.exit_code != 0 {
        let mut err = AppError::execution(
            format!("command failed with exit code {}", output.exit_code),
            &argv,
        );
        err.add_context("output", &output.combined);
        sink.emit(
            LogLevel::Error,
            &format!("Error: {} {}", err.message, output.combined),
        );
        return Err(err);
    }

    if !output.combined.is_empty() {
        sink.emit(level, &output.combined);
    }
    Ok(())
}

fn limit_bytes(bytes: &[u8]) -> String {
    let limit = OUTPUT_CAPTURE_LIMIT_BYTES.min(bytes.len());
    String::from_utf8_lossy(&bytes[..limit]).into_owned()
}
