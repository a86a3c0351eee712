//! End-to-end engine runs against a recording runner: operation ordering,
//! fragment splitting, best-effort continuation, and environment seeding.

use async_trait::async_trait;
use runbook::core::engine::{CommandRunner, Engine, ExecutionOutput, ExecutionRequest};
use runbook::core::error::AppError;
use serial_test::serial;
use std::sync::{Arc, Mutex};

/// Records every request instead of spawning; fails requests whose argv
/// contains a configured marker.
struct StubRunner {
    requests: Arc<Mutex<Vec<ExecutionRequest>>>,
    fail_on: Option<String>,
}

impl StubRunner {
    fn new() -> (Arc<Self>, Arc<Mutex<Vec<ExecutionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(StubRunner {
            requests: requests.clone(),
            fail_on: None,
        });
        (runner, requests)
    }

    fn failing_on(marker: &str) -> (Arc<Self>, Arc<Mutex<Vec<ExecutionRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let runner = Arc::new(StubRunner {
            requests: requests.clone(),
            fail_on: Some(marker.to_string()),
        });
        (runner, requests)
    }
}

#[async_trait]
impl CommandRunner for StubRunner {
    async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let failed = self
            .fail_on
            .as_deref()
            .map(|marker| request.argv.iter().any(|arg| arg.contains(marker)))
            .unwrap_or(false);
        Ok(ExecutionOutput {
            combined: String::new(),
            exit_code: if failed { 1 } else { 0 },
        })
    }
}

fn recorded_argvs(requests: &Arc<Mutex<Vec<ExecutionRequest>>>) -> Vec<Vec<String>> {
    requests
        .lock()
        .unwrap()
        .iter()
        .map(|request| request.argv.clone())
        .collect()
}

async fn run_with_stub(document: &str) -> Vec<Vec<String>> {
    let (runner, requests) = StubRunner::new();
    let buffer = Arc::new(Mutex::new(String::new()));
    Engine::with_runner(runner)
        .with_rest_buffer(buffer)
        .execute(document.as_bytes(), false)
        .await
        .expect("run failed");
    recorded_argvs(&requests)
}

#[tokio::test]
async fn operations_run_in_document_order() {
    let document = "\
cmd:
  - type: exec
    values:
      - echo first
  - type: shell
    values:
      - echo second
  - type: exec
    values:
      - echo third
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs.len(), 3);
    assert_eq!(argvs[0], vec!["echo", "first"]);
    assert_eq!(argvs[1], vec!["bash", "-c", "echo second"]);
    assert_eq!(argvs[2], vec!["echo", "third"]);
}

#[tokio::test]
async fn exec_semicolons_split_into_separate_invocations() {
    let document = "\
cmd:
  - type: exec
    values:
      - echo a;
      - echo b
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs, vec![vec!["echo", "a"], vec!["echo", "b"]]);
}

#[tokio::test]
async fn shell_semicolons_stay_in_one_invocation() {
    let document = "\
cmd:
  - type: shell
    values:
      - echo a;
      - echo b
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs, vec![vec!["bash", "-c", "echo a; echo b"]]);
}

#[tokio::test]
async fn compose_without_values_runs_the_base_vector_once() {
    let document = "\
cmd:
  - type: docker-compose
    dcoptions:
      - -f docker-compose.yml
    command: up
    cmdoptions:
      - -d
    values: []
";
    let argvs = run_with_stub(document).await;
    assert_eq!(
        argvs,
        vec![vec![
            "docker",
            "compose",
            "-f",
            "docker-compose.yml",
            "up",
            "-d"
        ]]
    );
}

#[tokio::test]
async fn ssh_fragments_are_single_trailing_arguments() {
    let document = "\
cmd:
  - type: ssh
    user: deploy
    host: example.com
    values:
      - systemctl restart app; uptime
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs.len(), 2);
    assert_eq!(
        argvs[0],
        vec![
            "ssh",
            "-p",
            "22",
            "-l",
            "deploy",
            "example.com",
            "systemctl restart app"
        ]
    );
    assert_eq!(argvs[1].last().unwrap(), "uptime");
}

#[tokio::test]
async fn docker_run_wraps_fragments_in_a_container_shell() {
    let document = "\
cmd:
  - type: docker
    command: run
    container: alpine:latest
    values:
      - uname -a
";
    let argvs = run_with_stub(document).await;
    assert_eq!(
        argvs,
        vec![vec![
            "docker",
            "run",
            "-it",
            "--rm",
            "alpine:latest",
            "sh",
            "-c",
            "uname -a"
        ]]
    );
}

#[tokio::test]
async fn empty_values_skip_without_spawning() {
    let document = "\
cmd:
  - type: exec
    values: []
  - type: shell
    values:
      - echo survivor
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs, vec![vec!["bash", "-c", "echo survivor"]]);
}

#[tokio::test]
async fn failed_fragment_abandons_operation_but_run_continues() {
    let document = "\
cmd:
  - type: exec
    values:
      - echo doomed-marker;
      - echo never-reached
  - type: exec
    values:
      - echo survivor
";
    let (runner, requests) = StubRunner::failing_on("doomed-marker");
    let buffer = Arc::new(Mutex::new(String::new()));
    Engine::with_runner(runner)
        .with_rest_buffer(buffer)
        .execute(document.as_bytes(), false)
        .await
        .expect("run should complete despite the failure");
    let argvs = recorded_argvs(&requests);
    assert_eq!(argvs.len(), 2);
    assert_eq!(argvs[0], vec!["echo", "doomed-marker"]);
    assert_eq!(argvs[1], vec!["echo", "survivor"]);
}

#[tokio::test]
async fn identical_documents_produce_identical_invocation_sequences() {
    let document = "\
cmd:
  - type: shell
    values:
      - echo one
  - type: exec
    values:
      - echo two; echo three
";
    let first = run_with_stub(document).await;
    let second = run_with_stub(document).await;
    assert_eq!(first, second);
}

#[tokio::test]
#[serial]
async fn declared_variables_reach_the_invocation_seed() {
    let document = "\
env:
  - key: RUNBOOK_ORDER_SEED
    value: seeded
cmd:
  - type: exec
    values:
      - echo hi
";
    let (runner, requests) = StubRunner::new();
    let buffer = Arc::new(Mutex::new(String::new()));
    Engine::with_runner(runner)
        .with_rest_buffer(buffer)
        .execute(document.as_bytes(), false)
        .await
        .expect("run failed");
    let recorded = requests.lock().unwrap();
    assert!(recorded[0]
        .env
        .iter()
        .any(|(key, value)| key == "RUNBOOK_ORDER_SEED" && value == "seeded"));
    std::env::remove_var("RUNBOOK_ORDER_SEED");
}

#[tokio::test]
#[serial]
async fn expansion_applies_only_with_the_flag() {
    let document = "\
env:
  - key: RUNBOOK_ORDER_TARGET
    value: resolved
cmd:
  - type: exec
    expandenv: true
    values:
      - echo $RUNBOOK_ORDER_TARGET
  - type: exec
    values:
      - echo $RUNBOOK_ORDER_TARGET
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs[0], vec!["echo", "resolved"]);
    assert_eq!(argvs[1], vec!["echo", "$RUNBOOK_ORDER_TARGET"]);
    std::env::remove_var("RUNBOOK_ORDER_TARGET");
}

#[tokio::test]
#[serial]
async fn unknown_variables_expand_to_empty() {
    std::env::remove_var("RUNBOOK_ORDER_MISSING");
    let document = "\
cmd:
  - type: exec
    expandenv: true
    values:
      - echo before-$RUNBOOK_ORDER_MISSING-after
";
    let argvs = run_with_stub(document).await;
    assert_eq!(argvs[0], vec!["echo", "before--after"]);
}

#[tokio::test]
async fn descriptions_and_skips_are_recorded_through_the_sink() {
    let document = "\
cmd:
  - type: exec
    desc: say hello
    values:
      - echo hello
  - type: shell
    values: []
";
    let (runner, _requests) = StubRunner::new();
    let buffer = Arc::new(Mutex::new(String::new()));
    Engine::with_runner(runner)
        .with_rest_buffer(buffer.clone())
        .execute(document.as_bytes(), false)
        .await
        .expect("run failed");
    let records = buffer.lock().unwrap().clone();
    assert!(records.contains("==> say hello"), "records: {}", records);
    assert!(
        records.contains("shell command with empty values"),
        "records: {}",
        records
    );
}
