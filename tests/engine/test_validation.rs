//! Document validation at the engine boundary: fail-fast ordering,
//! 1-based indexing, and the type-specific required-field rules.

use async_trait::async_trait;
use runbook::core::engine::{schema, CommandRunner, Engine, ExecutionOutput, ExecutionRequest};
use runbook::core::error::AppError;
use runbook::core::types::ErrorCategory;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

struct CountingRunner {
    spawned: Arc<AtomicUsize>,
}

#[async_trait]
impl CommandRunner for CountingRunner {
    async fn run(&self, _request: &ExecutionRequest) -> Result<ExecutionOutput, AppError> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        Ok(ExecutionOutput {
            combined: String::new(),
            exit_code: 0,
        })
    }
}

#[tokio::test]
async fn invalid_document_spawns_nothing() {
    // The first operation is runnable, but validation must reject the whole
    // document before it runs.
    let document = "\
cmd:
  - type: exec
    values:
      - echo runnable
  - type: docker
    command: run
    values:
      - uname -a
";
    let spawned = Arc::new(AtomicUsize::new(0));
    let runner = Arc::new(CountingRunner {
        spawned: spawned.clone(),
    });
    let buffer = Arc::new(Mutex::new(String::new()));
    let err = Engine::with_runner(runner)
        .with_rest_buffer(buffer)
        .execute(document.as_bytes(), false)
        .await
        .expect_err("document should be rejected");
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert_eq!(spawned.load(Ordering::SeqCst), 0);
}

#[test]
fn violations_report_one_based_indices() {
    let document = "\
cmd:
  - type: shell
    values:
      - ls
  - type: shell
    values:
      - pwd
  - type: ssh
    host: example.com
    values:
      - uptime
";
    let err = schema::check(document.as_bytes()).unwrap_err();
    assert!(err.message.starts_with("operation 3:"), "{}", err.message);
    assert!(err.message.contains("'user'"), "{}", err.message);
    assert_eq!(err.context.get("operation_index"), Some(&"3".to_string()));
}

#[test]
fn unknown_type_is_a_validation_error() {
    let err = schema::check(b"cmd:\n  - type: mystery\n    values: [x]\n").unwrap_err();
    assert_eq!(err.category, ErrorCategory::ValidationError);
    assert!(err.message.contains("mystery"));
}

#[test]
fn missing_type_is_a_validation_error() {
    let err = schema::check(b"cmd:\n  - values: [x]\n").unwrap_err();
    assert!(err.message.contains("missing 'type'"), "{}", err.message);
}

#[test]
fn malformed_yaml_is_a_document_error() {
    let err = schema::check(b"cmd: [unclosed\n").unwrap_err();
    assert_eq!(err.category, ErrorCategory::DocumentError);
}

#[test]
fn empty_values_operations_are_valid_placeholders() {
    // Required fields only bind when values are present.
    let document = "\
cmd:
  - type: docker
    values: []
  - type: ssh
  - type: docker-compose
    command: up
    values: []
";
    assert_eq!(schema::check(document.as_bytes()).unwrap(), 3);
}

#[test]
fn docker_with_values_requires_command() {
    let document = "\
cmd:
  - type: docker
    container: alpine:latest
    values:
      - uname -a
";
    let err = schema::check(document.as_bytes()).unwrap_err();
    assert!(err.message.contains("'command'"), "{}", err.message);
}

#[test]
fn conf_pairing_binds_without_values() {
    let err = schema::check(b"cmd:\n  - type: conf\n    confdata: \"x=1\"\n").unwrap_err();
    assert!(err.message.contains("'confdest'"), "{}", err.message);

    let reversed = schema::check(b"cmd:\n  - type: conf\n    confdest: /tmp/x\n").unwrap_err();
    assert!(reversed.message.contains("'confdata'"), "{}", reversed.message);
}

#[test]
fn conf_with_neither_data_nor_dest_is_valid() {
    assert!(schema::check(b"cmd:\n  - type: conf\n    desc: placeholder\n").is_ok());
}

#[test]
fn empty_document_is_valid() {
    assert_eq!(schema::check(b"{}\n").unwrap(), 0);
}
