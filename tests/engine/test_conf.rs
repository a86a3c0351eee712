//! End-to-end `conf` runs: file materialization, permissions, templating,
//! and best-effort continuation after write failures.

use runbook::core::engine::Engine;
use serial_test::serial;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

async fn run(document: &str) -> String {
    let buffer = Arc::new(Mutex::new(String::new()));
    Engine::new()
        .with_rest_buffer(buffer.clone())
        .execute(document.as_bytes(), false)
        .await
        .expect("run failed");
    let records = buffer.lock().unwrap().clone();
    records
}

#[tokio::test]
async fn conf_materializes_the_file_with_description_header() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("app.conf");
    let document = format!(
        "\
cmd:
  - type: conf
    desc: app config
    confdest: {}
    confperm: 0644
    confdata: |
      port=8080
      host=0.0.0.0
",
        dest.display()
    );
    let records = run(&document).await;
    let written = std::fs::read_to_string(&dest).unwrap();
    assert!(written.starts_with("# app config\n"), "{}", written);
    assert!(written.contains("port=8080"));
    assert!(
        records.contains(&format!("# create {}", dest.display())),
        "records: {}",
        records
    );
}

#[cfg(unix)]
#[tokio::test]
async fn confperm_digits_are_applied_as_octal_mode() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("secret.conf");
    let document = format!(
        "\
cmd:
  - type: conf
    desc: secret
    confdest: {}
    confperm: 0600
    confdata: \"token=t\"
",
        dest.display()
    );
    run(&document).await;
    let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[tokio::test]
async fn missing_confperm_defaults_to_0644() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let dest = dir.path().join("plain.conf");
    let document = format!(
        "\
cmd:
  - type: conf
    desc: plain
    confdest: {}
    confdata: \"x=1\"
",
        dest.display()
    );
    run(&document).await;
    let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}

#[tokio::test]
#[serial]
async fn confdata_templating_uses_declared_variables() {
    let dir = tempdir().unwrap();
    let dest = dir.path().join("db.conf");
    let document = format!(
        "\
env:
  - key: RUNBOOK_CONF_DB_HOST
    value: db.internal
cmd:
  - type: conf
    desc: db
    expandenv: true
    confdest: {}
    confdata: \"host={{{{.RUNBOOK_CONF_DB_HOST}}}} raw=$RUNBOOK_CONF_DB_HOST\"
",
        dest.display()
    );
    run(&document).await;
    let written = std::fs::read_to_string(&dest).unwrap();
    // {{.KEY}} templating resolves; $VAR stays literal inside data.
    assert!(written.contains("host=db.internal"), "{}", written);
    assert!(written.contains("raw=$RUNBOOK_CONF_DB_HOST"), "{}", written);
    std::env::remove_var("RUNBOOK_CONF_DB_HOST");
}

#[tokio::test]
#[serial]
async fn confdest_is_always_var_expanded() {
    let dir = tempdir().unwrap();
    std::env::set_var("RUNBOOK_CONF_DIR", dir.path());
    let document = "\
cmd:
  - type: conf
    desc: placed
    confdest: $RUNBOOK_CONF_DIR/placed.conf
    confdata: \"x=1\"
";
    run(document).await;
    assert!(dir.path().join("placed.conf").exists());
    std::env::remove_var("RUNBOOK_CONF_DIR");
}

#[tokio::test]
async fn conf_without_data_and_dest_skips() {
    let records = run("cmd:\n  - type: conf\n    desc: placeholder\n").await;
    assert!(
        records.contains("empty data or destination"),
        "records: {}",
        records
    );
}

#[tokio::test]
async fn write_failure_is_reported_and_the_run_continues() {
    let dir = tempdir().unwrap();
    let unwritable = dir.path().join("missing-parent").join("app.conf");
    let survivor = dir.path().join("survivor.conf");
    let document = format!(
        "\
cmd:
  - type: conf
    desc: doomed
    confdest: {}
    confdata: \"x=1\"
  - type: conf
    desc: survivor
    confdest: {}
    confdata: \"y=2\"
",
        unwritable.display(),
        survivor.display()
    );
    let records = run(&document).await;
    assert!(records.contains("Error:"), "records: {}", records);
    assert!(survivor.exists());
}
