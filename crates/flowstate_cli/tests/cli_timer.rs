use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

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

fn minutes_ago(minutes: i64) -> String {
    (OffsetDateTime::now_utc() - Duration::minutes(minutes))
        .format(&Rfc3339)
        .expect("format start time")
}

fn write_running_store(path: &Path, timer_minutes: u32, started_at: &str) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "task-1",
                "title": "focus",
                "status": "doing",
                "order": 0,
                "timer_minutes": timer_minutes,
                "timer_started_at": started_at,
                "created_at": "2025-12-20T00:00:00Z",
                "updated_at": "2025-12-20T00:00:00Z"
            },
            {
                "id": "task-2",
                "title": "plain",
                "status": "todo",
                "order": 0,
                "created_at": "2025-12-20T00:00:00Z",
                "updated_at": "2025-12-20T00:00:00Z"
            }
        ],
        "active_timer_task_id": "task-1"
    });
    std::fs::write(path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn timer_status_completes_expired_timer_once() {
    let store_path = temp_path("cli-timer-expired.json");
    write_running_store(&store_path, 25, &minutes_ago(30));

    let first = flowstate(&store_path, &["timer", "status"]);
    let second = flowstate(&store_path, &["timer", "status"]);
    let show = flowstate(&store_path, &["--json", "show", "task-1"]);

    std::fs::remove_file(&store_path).ok();
    assert!(first.status.success());
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(stdout.contains("Timer complete: focus (task-1)"));
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("No timer running"));
    let task: serde_json::Value = serde_json::from_slice(&show.stdout).expect("json output");
    assert!(task["timer_started_at"].is_null());
    assert!(task["timer_ended_at"].is_string());
}

#[test]
fn timer_status_json_reports_remaining_time() {
    let store_path = temp_path("cli-timer-running.json");
    write_running_store(&store_path, 25, &minutes_ago(1));

    let output = flowstate(&store_path, &["--json", "timer", "status"]);

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let tick: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(tick["task_id"], "task-1");
    assert_eq!(tick["expired"], false);
    let remaining = tick["remaining_ms"].as_u64().unwrap();
    assert!(remaining > 23 * 60_000 && remaining <= 24 * 60_000);
}

#[test]
fn timer_start_preempts_running_timer() {
    let store_path = temp_path("cli-timer-preempt.json");
    write_running_store(&store_path, 25, &minutes_ago(1));

    let edit = flowstate(&store_path, &["edit", "task-2", "--timer", "5"]);
    let start = flowstate(&store_path, &["timer", "start", "task-2"]);
    let board = flowstate(&store_path, &["--json", "list"]);

    std::fs::remove_file(&store_path).ok();
    assert!(edit.status.success());
    assert!(start.status.success());
    let stdout = String::from_utf8_lossy(&start.stdout);
    assert!(stdout.contains("Started timer: plain (task-2) for 5m"));
    let board: serde_json::Value = serde_json::from_slice(&board.stdout).expect("json output");
    assert_eq!(board["active_timer_task_id"], "task-2");
    assert!(board["doing"][0]["timer_started_at"].is_null());
    assert!(board["doing"][0]["timer_ended_at"].is_string());
}

#[test]
fn timer_start_requires_duration() {
    let store_path = temp_path("cli-timer-no-duration.json");
    write_running_store(&store_path, 25, &minutes_ago(1));

    let output = flowstate(&store_path, &["timer", "start", "task-2"]);

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_state"));
}

#[test]
fn timer_stop_clears_active_slot() {
    let store_path = temp_path("cli-timer-stop.json");
    write_running_store(&store_path, 25, &minutes_ago(1));

    let output = flowstate(&store_path, &["timer", "stop", "task-1"]);
    let status = flowstate(&store_path, &["timer", "status"]);

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Stopped timer: focus (task-1)"));
    let stdout = String::from_utf8_lossy(&status.stdout);
    assert!(stdout.contains("No timer running"));
}

#[test]
fn delete_running_task_clears_timer() {
    let store_path = temp_path("cli-timer-delete.json");
    write_running_store(&store_path, 25, &minutes_ago(1));

    let output = flowstate(&store_path, &["drop", "task-1"]);
    let status = flowstate(&store_path, &["--json", "timer", "status"]);

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&status.stdout).trim(), "null");
}

#[test]
fn timer_watch_stops_at_expiry() {
    let store_path = temp_path("cli-timer-watch.json");
    write_running_store(&store_path, 1, &minutes_ago(2));

    let output = flowstate(
        &store_path,
        &["--config-override", "poll_interval_ms=10", "timer", "watch"],
    );

    std::fs::remove_file(&store_path).ok();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Timer complete: focus (task-1)"));
}
