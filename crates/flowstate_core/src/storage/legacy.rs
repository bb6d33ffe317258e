//! Import of the web dashboard's persisted to-do list.
//!
//! The dashboard persisted `{"state": {"todos": [...]}, "version": 0}` with
//! camelCase fields and JavaScript ISO dates. A bare array of todos is
//! accepted too. The active timer was never persisted, so imported timers
//! come back idle once the snapshot is loaded into a board.

use crate::error::AppError;
use crate::model::{BoardSnapshot, Task, TaskStatus};
use serde::Deserialize;
use std::path::Path;
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyTodo {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    status: TaskStatus,
    #[serde(default)]
    timer: Option<u32>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    timer_started: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    timer_ended: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    #[serde(default)]
    order: u32,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyState {
    #[serde(default)]
    todos: Vec<LegacyTodo>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyExport {
    Persisted { state: LegacyState },
    Todos(Vec<LegacyTodo>),
}

impl From<LegacyTodo> for Task {
    fn from(todo: LegacyTodo) -> Self {
        Task {
            id: todo.id,
            title: todo.title.trim().to_string(),
            description: todo
                .description
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
            status: todo.status,
            order: todo.order,
            timer_minutes: todo.timer.filter(|minutes| *minutes > 0),
            timer_started_at: todo.timer_started,
            timer_ended_at: todo.timer_ended,
            created_at: todo.created_at,
            updated_at: todo.updated_at,
        }
    }
}

pub fn parse_legacy_export(content: &str) -> Result<BoardSnapshot, AppError> {
    let export: LegacyExport = serde_json::from_str(content).map_err(|err| {
        AppError::invalid_data(format!("unrecognized dashboard export: {err}"))
    })?;
    let todos = match export {
        LegacyExport::Persisted { state } => state.todos,
        LegacyExport::Todos(todos) => todos,
    };

    Ok(BoardSnapshot {
        tasks: todos.into_iter().map(Task::from).collect(),
        active_timer_task_id: None,
    })
}

pub fn read_legacy_export(path: &Path) -> Result<BoardSnapshot, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    parse_legacy_export(&content)
}
