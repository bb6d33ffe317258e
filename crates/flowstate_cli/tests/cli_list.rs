use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("flowstate-{nanos}-{file_name}"))
}

fn flowstate(store_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flowstate"))
        .args(args)
        .env("FLOWSTATE_STORE_PATH", store_path)
        .env("FLOWSTATE_CONFIG_PATH", temp_path("missing-config.json"))
        .env("FLOWSTATE_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run flowstate")
}

fn write_store(path: &Path, tasks: serde_json::Value) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": tasks
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

fn task(id: &str, title: &str, status: &str, order: u32) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": title,
        "status": status,
        "order": order,
        "created_at": "2025-12-20T00:00:00Z",
        "updated_at": "2025-12-20T00:00:00Z"
    })
}

#[test]
fn list_plain_text_shows_every_column() {
    let store_path = temp_path("cli-list-plain.json");
    write_store(
        &store_path,
        serde_json::json!([
            task("task-1", "write report", "todo", 0),
            task("task-2", "review", "doing", 0),
        ]),
    );

    let output = flowstate(&store_path, &["list"]);

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("To Do (1)"));
    assert!(stdout.contains("Doing (1)"));
    assert!(stdout.contains("Done (0)"));
    assert!(stdout.contains("write report"));
    assert!(stdout.contains("(empty)"));
}

#[test]
fn list_column_json_is_ordered() {
    let store_path = temp_path("cli-list-column.json");
    write_store(
        &store_path,
        serde_json::json!([
            task("task-1", "second", "do", 1),
            task("task-2", "first", "todo", 0),
            task("task-3", "elsewhere", "done", 0),
        ]),
    );

    let output = flowstate(&store_path, &["--json", "list", "todo"]);

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let tasks: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    let titles: Vec<&str> = tasks
        .as_array()
        .expect("json array")
        .iter()
        .map(|task| task["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[test]
fn list_on_missing_store_is_empty() {
    let store_path = temp_path("cli-list-missing.json");
    let output = flowstate(&store_path, &["--json", "list"]);

    assert!(output.status.success());
    let board: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(board["todo"], serde_json::json!([]));
    assert!(board["active_timer_task_id"].is_null());
}

#[test]
fn list_reports_invalid_store() {
    let store_path = temp_path("cli-list-invalid.json");
    write_store(
        &store_path,
        serde_json::json!([
            task("task-1", "twin", "todo", 0),
            task("task-1", "twin", "todo", 1),
        ]),
    );

    let output = flowstate(&store_path, &["list"]);

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_data - duplicate task id: task-1"));
}
