#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::Command;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "frameport-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn frameport() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_frameport"));
    command.arg("--log-level").arg("error");
    command
}

#[test]
fn simulate_outputs_session_json() {
    let output = frameport()
        .args(["--format", "json", "simulate", "--set", r#"{"title":"hello"}"#])
        .output()
        .expect("simulate should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let report: serde_json::Value =
        serde_json::from_str(stdout.trim()).expect("stdout should be one JSON object");
    assert!(report["schema_id"]
        .as_str()
        .unwrap()
        .ends_with("simulate-session.schema.json"));
    assert_eq!(report["category"], "CONTENT_EDITOR");
    assert_eq!(report["height"], 480);
    assert_eq!(report["final_model"], serde_json::json!({ "title": "hello" }));
    assert_eq!(report["host"]["connected"], true);
}

#[test]
fn simulate_reports_schema_errors() {
    let dir = unique_temp_dir("schema");
    let schema = dir.join("article.schema.json");
    std::fs::write(
        &schema,
        r#"{"type":"object","required":["title"],"properties":{"title":{"type":"string"}}}"#,
    )
    .unwrap();
    let model = dir.join("model.json");
    std::fs::write(&model, r#"{"title":42}"#).unwrap();

    let output = frameport()
        .args(["--format", "json", "simulate"])
        .arg("--schema")
        .arg(&schema)
        .arg("--model")
        .arg(&model)
        .output()
        .expect("simulate should run");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(report["initial_model"], serde_json::json!({ "title": 42 }));
    assert_eq!(report["valid"], false);
    assert_eq!(report["validation"][0]["path"], "/title");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn refused_handshake_returns_124() {
    let output = frameport()
        .args([
            "simulate",
            "--refuse-connection",
            "--connection-timeout",
            "50ms",
        ])
        .output()
        .expect("simulate should run");

    assert_eq!(output.status.code(), Some(124));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to establish a connection"));
}

#[test]
fn invalid_timeout_returns_usage() {
    let output = frameport()
        .args(["simulate", "--connection-timeout", "never"])
        .output()
        .expect("simulate should run");
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn unsupported_context_returns_data_invalid() {
    let dir = unique_temp_dir("context");
    let context = dir.join("context.json");
    std::fs::write(&context, r#"{"category":"SIDEBAR"}"#).unwrap();

    let output = frameport()
        .arg("simulate")
        .arg("--context")
        .arg(&context)
        .output()
        .expect("simulate should run");
    assert_eq!(output.status.code(), Some(60));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = frameport().arg("version").output().expect("version should run");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("frameport {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn extended_version_lists_protocol_events() {
    let output = frameport()
        .args(["version", "--extended"])
        .output()
        .expect("version should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("protocol_events:"));
    assert!(stdout.contains("height-get"));
    assert!(stdout.contains("mc-connection-timeout"));
}
