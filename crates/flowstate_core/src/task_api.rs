use crate::board::{Board, DropTarget, MoveOutcome, TimerTick};
use crate::error::AppError;
use crate::model::{Task, TaskPatch, TaskStatus};
use crate::notify::{Notifier, activation_argument, notifier_from_env};
use crate::storage::{json_store, legacy};
use serde::Serialize;
use std::path::Path;
use time::OffsetDateTime;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub todo: Vec<Task>,
    pub doing: Vec<Task>,
    pub done: Vec<Task>,
    pub active_timer_task_id: Option<String>,
}

impl BoardView {
    fn from_board(board: &Board) -> Self {
        let column = |status| {
            board
                .list_by_status(status)
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        };
        Self {
            todo: column(TaskStatus::Todo),
            doing: column(TaskStatus::Doing),
            done: column(TaskStatus::Done),
            active_timer_task_id: board.active_timer_task_id().map(str::to_string),
        }
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::Doing => &self.doing,
            TaskStatus::Done => &self.done,
        }
    }
}

#[derive(Debug)]
pub struct TimerPoll {
    pub tick: TimerTick,
    /// The task whose timer this poll found expired and stopped.
    pub expired: Option<Task>,
    pub notified: bool,
    /// The notifier delivers its click action to this process.
    pub action_pending: bool,
    pub failure: Option<NotificationFailure>,
}

#[derive(Debug)]
pub struct NotificationFailure {
    pub task_id: String,
    pub error: AppError,
}

pub fn add_task(
    title: &str,
    description: Option<&str>,
    timer_minutes: Option<u32>,
) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    add_task_with_path(&path, title, description, timer_minutes)
}

pub fn edit_task(id: &str, patch: TaskPatch) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    edit_task_with_path(&path, id, patch)
}

pub fn delete_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    delete_task_with_path(&path, id)
}

pub fn move_task(id: &str, status: TaskStatus, index: Option<usize>) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    move_task_with_path(&path, id, status, index)
}

pub fn drop_task(id: &str, target: &DropTarget) -> Result<MoveOutcome, AppError> {
    let path = json_store::store_path()?;
    drop_task_with_path(&path, id, target)
}

pub fn get_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

pub fn board_view() -> Result<BoardView, AppError> {
    let path = json_store::store_path()?;
    board_view_with_path(&path)
}

pub fn start_timer(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    start_timer_with_path(&path, id)
}

pub fn stop_timer(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    stop_timer_with_path(&path, id)
}

/// Polls the running timer once. When it has expired the timer is stopped and,
/// if `alerts_enabled`, the platform notifier is raised.
pub fn poll_timer(alerts_enabled: bool) -> Result<Option<TimerPoll>, AppError> {
    let path = json_store::store_path()?;
    let notifier = if alerts_enabled {
        Some(notifier_from_env()?)
    } else {
        None
    };
    poll_timer_with_path(&path, OffsetDateTime::now_utc(), notifier.as_deref())
}

/// Replaces the board with the todos of a dashboard export.
pub fn import_legacy(export_path: &Path) -> Result<BoardView, AppError> {
    let path = json_store::store_path()?;
    import_legacy_with_path(&path, export_path)
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("id is required"));
    }
    Ok(trimmed)
}

fn load_board(path: &Path) -> Result<Board, AppError> {
    Board::from_snapshot(json_store::load_snapshot(path)?)
}

fn with_board<T>(
    path: &Path,
    operation: impl FnOnce(&mut Board) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut board = load_board(path)?;
    let result = operation(&mut board)?;
    json_store::save_snapshot(path, &board.snapshot())?;
    Ok(result)
}

fn add_task_with_path(
    path: &Path,
    title: &str,
    description: Option<&str>,
    timer_minutes: Option<u32>,
) -> Result<Task, AppError> {
    with_board(path, |board| board.create(title, description, timer_minutes))
}

fn edit_task_with_path(path: &Path, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
    let id = require_id(id)?;
    if patch.is_empty() {
        return Err(AppError::validation("nothing to update"));
    }
    with_board(path, |board| board.update(id, patch))
}

fn delete_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = require_id(id)?;
    with_board(path, |board| board.delete(id))
}

fn move_task_with_path(
    path: &Path,
    id: &str,
    status: TaskStatus,
    index: Option<usize>,
) -> Result<Task, AppError> {
    let id = require_id(id)?;
    with_board(path, |board| board.move_task(id, status, index))
}

fn drop_task_with_path(
    path: &Path,
    id: &str,
    target: &DropTarget,
) -> Result<MoveOutcome, AppError> {
    let id = require_id(id)?;
    with_board(path, |board| {
        let destination = board.resolve_drop(id, target)?;
        board.apply_move_intent(id, destination)
    })
}

fn get_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = require_id(id)?;
    let board = load_board(path)?;
    board.get(id).cloned()
}

fn board_view_with_path(path: &Path) -> Result<BoardView, AppError> {
    let board = load_board(path)?;
    Ok(BoardView::from_board(&board))
}

fn start_timer_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = require_id(id)?;
    with_board(path, |board| board.start_timer(id))
}

fn stop_timer_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let id = require_id(id)?;
    with_board(path, |board| board.stop_timer(id))
}

fn poll_timer_with_path(
    path: &Path,
    now: OffsetDateTime,
    notifier: Option<&dyn Notifier>,
) -> Result<Option<TimerPoll>, AppError> {
    let mut board = load_board(path)?;
    let Some(tick) = board.tick(now) else {
        return Ok(None);
    };

    if !tick.expired {
        return Ok(Some(TimerPoll {
            tick,
            expired: None,
            notified: false,
            action_pending: false,
            failure: None,
        }));
    }

    let task = board.stop_timer(&tick.task_id)?;
    json_store::save_snapshot(path, &board.snapshot())?;
    info!(task_id = %task.id, "timer expired");

    let mut notified = false;
    let mut action_pending = false;
    let mut failure = None;
    if let Some(notifier) = notifier {
        match notifier.notify_with_action(&task, &activation_argument(&task.id)) {
            Ok(()) => {
                notified = true;
                action_pending = notifier.awaits_action();
            }
            Err(error) => {
                warn!(task_id = %task.id, %error, "timer notification failed");
                failure = Some(NotificationFailure {
                    task_id: task.id.clone(),
                    error,
                });
            }
        }
    }

    Ok(Some(TimerPoll {
        tick,
        expired: Some(task),
        notified,
        action_pending,
        failure,
    }))
}

fn import_legacy_with_path(path: &Path, export_path: &Path) -> Result<BoardView, AppError> {
    let snapshot = legacy::read_legacy_export(export_path)?;
    let mut board = Board::new();
    board.load(snapshot)?;
    json_store::save_snapshot(path, &board.snapshot())?;
    info!(tasks = board.tasks().len(), "imported dashboard todos");
    Ok(BoardView::from_board(&board))
}
