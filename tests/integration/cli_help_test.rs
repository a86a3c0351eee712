use assert_cmd::Command;
use predicates::prelude::*;
use std::process::Command as StdCommand;

#[test]
fn test_top_level_help_lists_workflow_commands() {
    let output = StdCommand::new(assert_cmd::cargo::cargo_bin!("runbook"))
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("WORKFLOW COMMANDS"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("record"));
    assert!(stdout.contains("generate"));
    assert!(stdout.contains("tools"));
}

#[test]
fn test_version_flag_reports_package_version() {
    Command::cargo_bin("runbook")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help_mentions_document_order() {
    let output = StdCommand::new(assert_cmd::cargo::cargo_bin!("runbook"))
        .arg("run")
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("document order"));
    assert!(stdout.contains("--file"));
}

#[test]
fn test_serve_help_documents_the_auth_token() {
    let output = StdCommand::new(assert_cmd::cargo::cargo_bin!("runbook"))
        .arg("serve")
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("RUNBOOK_API_TOKEN"));
    assert!(stdout.contains("--no-auth"));
}

#[test]
fn test_generate_help_documents_the_fallback() {
    let output = StdCommand::new(assert_cmd::cargo::cargo_bin!("runbook"))
        .arg("generate")
        .arg("--help")
        .output()
        .expect("should run successfully");

    let stdout = std::str::from_utf8(&output.stdout).unwrap();
    assert!(stdout.contains("pattern-matching"));
    assert!(stdout.contains("--prompt"));
    assert!(stdout.contains("--execute"));
}

#[test]
fn test_run_executes_a_workflow_file() {
    let dir = tempfile::tempdir().unwrap();
    let workflow = dir.path().join("workflow.yaml");
    std::fs::write(
        &workflow,
        "cmd:\n  - type: shell\n    desc: greet\n    values:\n      - echo from-the-binary\n",
    )
    .unwrap();

    Command::cargo_bin("runbook")
        .unwrap()
        .arg("run")
        .arg("--file")
        .arg(&workflow)
        .assert()
        .success()
        .stdout(predicate::str::contains("==> greet"));
}

#[test]
fn test_run_rejects_an_invalid_document() {
    let dir = tempfile::tempdir().unwrap();
    let workflow = dir.path().join("broken.yaml");
    std::fs::write(
        &workflow,
        "cmd:\n  - type: ssh\n    values:\n      - uptime\n",
    )
    .unwrap();

    Command::cargo_bin("runbook")
        .unwrap()
        .arg("run")
        .arg("--file")
        .arg(&workflow)
        .assert()
        .failure()
        .stderr(predicate::str::contains("'user'"));
}

#[test]
fn test_run_reports_a_missing_file() {
    Command::cargo_bin("runbook")
        .unwrap()
        .arg("run")
        .arg("--file")
        .arg("no-such-workflow.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-workflow.yaml"));
}

#[test]
fn test_generate_prints_a_document_without_a_key() {
    Command::cargo_bin("runbook")
        .unwrap()
        .env_remove("OPENAI_API_KEY")
        .arg("generate")
        .arg("--prompt")
        .arg("run a docker container")
        .assert()
        .success()
        .stdout(predicate::str::contains("type: docker"));
}
