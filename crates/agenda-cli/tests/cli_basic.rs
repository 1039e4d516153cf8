//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command with `data_dir` as the data directory.
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_agenda"))
        .env("AGENDA_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_ok(data_dir: &Path, args: &[&str]) -> String {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "command {:?} failed: {}", args, stderr);
    stdout
}

fn create_project(dir: &Path, title: &str, hours: &str, priority: &str) -> String {
    let out = run_ok(
        dir,
        &[
            "project", "create", title, "--hours", hours, "--priority", priority, "--due",
            "2030-01-15",
        ],
    );
    let first = out.lines().next().unwrap();
    first.trim_start_matches("Project created: ").trim().to_string()
}

#[test]
fn test_project_create_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_project(dir.path(), "Write report", "2", "4");

    let out = run_ok(dir.path(), &["project", "list", "--json"]);
    let projects: serde_json::Value = serde_json::from_str(&out).unwrap();
    let projects = projects.as_array().unwrap();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], id.as_str());
    assert_eq!(projects[0]["priority"], 4);
    assert_eq!(projects[0]["estimatedHours"], 2.0);
}

#[test]
fn test_projects_are_per_user() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path(), "Mine", "1", "3");

    let out = run_ok(dir.path(), &["project", "list", "--json", "--user", "someone-else"]);
    let projects: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(projects.as_array().unwrap().is_empty());
}

#[test]
fn test_project_update_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_project(dir.path(), "Draft", "1", "3");

    run_ok(dir.path(), &["project", "update", &id, "--priority", "9"]);
    let out = run_ok(dir.path(), &["project", "show", &id]);
    let project: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(project["priority"], 5);

    run_ok(dir.path(), &["project", "delete", &id]);
    let (code, _, stderr) = run_cli(dir.path(), &["project", "show", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("project not found"));
}

#[test]
fn test_project_create_rejects_zero_hours() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(
        dir.path(),
        &["project", "create", "Nothing", "--hours", "0", "--due", "2030-01-15"],
    );
    assert_ne!(code, 0);
}

#[test]
fn test_plan_generate_json_orders_by_priority() {
    let dir = tempfile::tempdir().unwrap();
    let low = create_project(dir.path(), "Low", "1", "1");
    let high = create_project(dir.path(), "High", "1", "5");

    let out = run_ok(
        dir.path(),
        &["plan", "generate", "--horizon", "10", "--energy", "med", "--json"],
    );
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    let blocks = result["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[0]["projectId"], high.as_str());
    assert_eq!(blocks[3]["projectId"], low.as_str());
    assert_eq!(result["totalHours"], 2.0);
}

#[test]
fn test_plan_generate_respects_horizon() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path(), "Big", "5", "3");

    let out = run_ok(
        dir.path(),
        &["plan", "generate", "--horizon", "2", "--energy", "high", "--json"],
    );
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(result["blocks"].as_array().unwrap().len(), 4);
    assert_eq!(result["totalHours"], 2.0);
}

#[test]
fn test_plan_generate_rejects_bad_horizon() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["plan", "generate", "--horizon", "500"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Horizon"));
}

#[test]
fn test_plan_generate_confirm_then_agenda_list() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path(), "Thesis", "1", "3");

    run_ok(dir.path(), &["plan", "generate", "--horizon", "4", "--confirm"]);
    let out = run_ok(dir.path(), &["agenda", "list", "--json"]);
    let blocks: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(blocks.as_array().unwrap().len(), 2);

    let out = run_ok(dir.path(), &["agenda", "clear"]);
    assert!(out.contains("Removed 2 block(s)."));
}

#[test]
fn test_plan_confirm_replaces_agenda() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_project(dir.path(), "Thesis", "1", "3");
    run_ok(dir.path(), &["plan", "generate", "--horizon", "4", "--confirm"]);

    let payload = format!(
        r#"{{"blocks": [{{"projectId": "{id}", "start": "2030-01-10T09:00:00Z", "end": "2030-01-10T09:30:00Z"}}]}}"#
    );
    run_ok(dir.path(), &["plan", "confirm", &payload]);

    let out = run_ok(dir.path(), &["agenda", "list", "--json"]);
    let blocks: serde_json::Value = serde_json::from_str(&out).unwrap();
    let blocks = blocks.as_array().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0]["userId"], "local");
}

#[test]
fn test_plan_confirm_rejects_unknown_project() {
    let dir = tempfile::tempdir().unwrap();
    let payload = r#"[{"projectId": "ghost", "start": "2030-01-10T09:00:00Z", "end": "2030-01-10T09:30:00Z"}]"#;
    let (code, _, stderr) = run_cli(dir.path(), &["plan", "confirm", payload]);
    assert_ne!(code, 0);
    assert!(stderr.contains("project not found"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(run_ok(dir.path(), &["config", "get", "planner.slot_minutes"]).trim(), "30");

    run_ok(dir.path(), &["config", "set", "user_id", "alice"]);
    assert_eq!(run_ok(dir.path(), &["config", "get", "user_id"]).trim(), "alice");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "planner.slot_minutes", "0"]);
    assert_ne!(code, 0);
}

#[test]
fn test_config_slot_length_changes_plan() {
    let dir = tempfile::tempdir().unwrap();
    create_project(dir.path(), "Thesis", "1", "3");
    run_ok(dir.path(), &["config", "set", "planner.slot_minutes", "15"]);

    let out = run_ok(dir.path(), &["plan", "generate", "--horizon", "4", "--json"]);
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(result["blocks"].as_array().unwrap().len(), 4);
}
