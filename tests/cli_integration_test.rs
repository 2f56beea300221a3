//! CLI integration tests for the jbi binary, run against the bundled
//! configuration in `config/`.

use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

fn jbi(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jbi"))
        .current_dir(Path::new(env!("CARGO_MANIFEST_DIR")))
        .env_remove("JBI_SETTINGS_FILE")
        .env("JBI_LOGGING__LEVEL", "error")
        .args(args)
        .output()
        .expect("Failed to run jbi")
}

/// Run a command with `--json`, assert success, and return the parsed
/// JSON value from stdout.
fn run_json(args: &[&str]) -> Value {
    let mut all = vec!["--json"];
    all.extend_from_slice(args);
    let output = jbi(&all);
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout)
        .unwrap_or_else(|e| panic!("Failed to parse JSON from {args:?}: {e}"))
}

#[test]
fn test_validate_bundled_config() {
    let result = run_json(&["validate"]);

    assert_eq!(result["env"], "local");
    let actions = result["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0]["whiteboard_tag"], "devtest");
    assert_eq!(actions[2]["enabled"], false);
}

#[test]
fn test_steps_lists_catalogue() {
    let result = run_json(&["steps"]);
    let steps = result["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 9);
    assert_eq!(steps[8]["name"], "create_comment");
}

#[test]
fn test_classify_new_bug() {
    let result = run_json(&["classify", "--payload", "tests/fixtures/webhook_create.json"]);

    assert_eq!(result["action"], "devtest");
    assert_eq!(result["operation"], "create");
    assert_eq!(result["steps"][0], "create_issue");
    assert!(result["ignored"].is_null());
}

#[test]
fn test_classify_comment_on_linked_bug() {
    let result = run_json(&[
        "classify",
        "--payload",
        "tests/fixtures/webhook_comment_linked.json",
    ]);

    assert_eq!(result["rid"], "fixture-rid");
    assert_eq!(result["linked_issue"], "FIDEFE-42");
    assert_eq!(result["operation"], "comment");
    assert_eq!(result["steps"], serde_json::json!(["create_comment"]));
}

#[test]
fn test_invalid_actions_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions.yaml");
    let yaml = "- whiteboard_tag: devtest
  parameters:
    jira_project_key: JBI
    steps:
      new: [frobnicate]
";
    std::fs::write(&path, yaml).unwrap();

    let output = jbi(&["validate", "--actions", path.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown step 'frobnicate'"), "stderr: {stderr}");
}
