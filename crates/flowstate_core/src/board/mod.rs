//! The task board: canonical task collection, column ordering and the
//! single active countdown.
//!
//! All mutations go through [`Board`]. Every operation that touches a column
//! leaves that column's `order` values dense (`0..n`), and at most one task
//! holds the active-timer slot.

mod clock;
mod intent;
pub mod reorder;
pub mod timer;

pub use clock::{Clock, SystemClock};
pub use intent::{Destination, DropTarget, MoveOutcome};
pub use timer::{TimerTick, format_remaining};

use crate::error::AppError;
use crate::model::{BoardSnapshot, Task, TaskPatch, TaskStatus};
use reorder::OrderAssignment;
use std::collections::HashSet;
use std::fmt;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct Board {
    tasks: Vec<Task>,
    active_timer_task_id: Option<String>,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("tasks", &self.tasks)
            .field("active_timer_task_id", &self.active_timer_task_id)
            .finish_non_exhaustive()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock<C: Clock + 'static>(clock: C) -> Self {
        Self {
            tasks: Vec::new(),
            active_timer_task_id: None,
            clock: Box::new(clock),
        }
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Result<Self, AppError> {
        let mut board = Self::new();
        board.load(snapshot)?;
        Ok(board)
    }

    /// Replaces the whole board with `snapshot`.
    ///
    /// Rejects duplicate ids, blank titles, zero durations and an active-timer
    /// id that does not name a started task. Timer starts left on idle tasks
    /// are cleared and every column is renumbered densely. On error the board
    /// is left untouched.
    pub fn load(&mut self, snapshot: BoardSnapshot) -> Result<(), AppError> {
        let BoardSnapshot {
            mut tasks,
            active_timer_task_id,
        } = snapshot;

        {
            let mut seen = HashSet::new();
            for task in &tasks {
                if !seen.insert(task.id.as_str()) {
                    return Err(AppError::invalid_data(format!(
                        "duplicate task id: {}",
                        task.id
                    )));
                }
                if task.title.trim().is_empty() {
                    return Err(AppError::invalid_data(format!(
                        "task {} has a blank title",
                        task.id
                    )));
                }
                if task.timer_minutes == Some(0) {
                    return Err(AppError::invalid_data(format!(
                        "task {} has a zero-minute timer",
                        task.id
                    )));
                }
            }
        }

        if let Some(active_id) = active_timer_task_id.as_deref() {
            let active = tasks
                .iter()
                .find(|task| task.id == active_id)
                .ok_or_else(|| AppError::invalid_data("active_timer_task_id not found"))?;
            if active.timer_minutes.is_none() || active.timer_started_at.is_none() {
                return Err(AppError::invalid_data(format!(
                    "active timer task {active_id} has no running countdown"
                )));
            }
        }

        for task in &mut tasks {
            if task.timer_started_at.is_some()
                && active_timer_task_id.as_deref() != Some(task.id.as_str())
            {
                warn!(task_id = %task.id, "clearing timer start on idle task");
                task.timer_started_at = None;
            }
        }

        self.tasks = tasks;
        self.active_timer_task_id = active_timer_task_id;
        for status in TaskStatus::ALL {
            self.compact(status);
        }

        debug!(
            tasks = self.tasks.len(),
            active_timer = ?self.active_timer_task_id,
            "loaded board"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tasks: self.tasks.clone(),
            active_timer_task_id: self.active_timer_task_id.clone(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn active_timer_task_id(&self) -> Option<&str> {
        self.active_timer_task_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Result<&Task, AppError> {
        let index = self.position(id)?;
        Ok(&self.tasks[index])
    }

    /// Tasks of one column, ascending by order.
    pub fn list_by_status(&self, status: TaskStatus) -> Vec<&Task> {
        reorder::column_indices(&self.tasks, status, None)
            .into_iter()
            .map(|index| &self.tasks[index])
            .collect()
    }

    /// Appends a new task to the end of the `todo` column.
    pub fn create(
        &mut self,
        title: &str,
        description: Option<&str>,
        timer_minutes: Option<u32>,
    ) -> Result<Task, AppError> {
        let title = normalize_title(title)?;
        validate_minutes(timer_minutes)?;

        let now = self.clock.now();
        let order = self.list_by_status(TaskStatus::Todo).len() as u32;
        let task = Task {
            id: format!("task-{}", Uuid::new_v4().simple()),
            title,
            description: normalize_description(description),
            status: TaskStatus::Todo,
            order,
            timer_minutes,
            timer_started_at: None,
            timer_ended_at: None,
            created_at: now,
            updated_at: now,
        };

        self.tasks.push(task.clone());
        debug!(task_id = %task.id, order, "created task");
        Ok(task)
    }

    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let title = patch.title.as_deref().map(normalize_title).transpose()?;
        if let Some(minutes) = patch.timer_minutes {
            validate_minutes(minutes)?;
            if minutes.is_none() && self.active_timer_task_id.as_deref() == Some(id) {
                return Err(AppError::invalid_state(
                    "cannot clear the duration of a running timer",
                ));
            }
        }

        let now = self.clock.now();
        let task = &mut self.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = normalize_description(description.as_deref());
        }
        if let Some(minutes) = patch.timer_minutes {
            task.timer_minutes = minutes;
        }
        task.updated_at = now;

        debug!(task_id = %id, "updated task");
        Ok(task.clone())
    }

    /// Removes a task. Unknown ids are reported, not ignored.
    pub fn delete(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);

        if self.active_timer_task_id.as_deref() == Some(id) {
            self.active_timer_task_id = None;
            info!(task_id = %id, "cleared active timer of deleted task");
        }
        self.compact(removed.status);

        debug!(task_id = %id, status = %removed.status, "deleted task");
        Ok(removed)
    }

    /// Moves a task to `status`, at `target_index` among that column's other
    /// tasks or at the end when the index is absent or out of range.
    ///
    /// Timer fields are left alone.
    pub fn move_task(
        &mut self,
        id: &str,
        status: TaskStatus,
        target_index: Option<usize>,
    ) -> Result<Task, AppError> {
        let index = self.position(id)?;
        let plan = reorder::plan_move(&self.tasks, index, status, target_index);
        self.apply(&plan.assignments);

        let now = self.clock.now();
        let task = &mut self.tasks[index];
        task.updated_at = now;

        debug!(task_id = %id, %status, order = plan.order, "moved task");
        Ok(task.clone())
    }

    /// Single entry point for drag-and-drop results.
    pub fn apply_move_intent(
        &mut self,
        id: &str,
        destination: Destination,
    ) -> Result<MoveOutcome, AppError> {
        match destination {
            Destination::Column { status, index } => {
                self.move_task(id, status, index).map(MoveOutcome::Moved)
            }
            Destination::DeleteZone => self.delete(id).map(MoveOutcome::Deleted),
        }
    }

    /// Translates what a drag ended over into a [`Destination`].
    ///
    /// Dropping onto another task targets that task's slot in its column;
    /// dropping a task onto itself keeps its position.
    pub fn resolve_drop(&self, dragged_id: &str, target: &DropTarget) -> Result<Destination, AppError> {
        let dragged = self.position(dragged_id)?;
        match target {
            DropTarget::DeleteZone => Ok(Destination::DeleteZone),
            DropTarget::Column(status) => Ok(Destination::column(*status)),
            DropTarget::Task(over_id) => {
                let over = self.position(over_id)?;
                let status = self.tasks[over].status;
                let exclude = if over == dragged { None } else { Some(dragged) };
                let index = reorder::column_indices(&self.tasks, status, exclude)
                    .iter()
                    .position(|&candidate| candidate == over);
                Ok(Destination::Column { status, index })
            }
        }
    }

    /// Starts `id`'s countdown, stopping any other running one first.
    ///
    /// Restarting the task that already runs resets its start to now.
    pub fn start_timer(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        if self.tasks[index].timer_minutes.is_none() {
            return Err(AppError::invalid_state(
                "task has no timer duration configured",
            ));
        }

        let now = self.clock.now();
        if let Some(previous) = self.active_timer_task_id.clone()
            && previous != id
        {
            self.finish_timer(&previous, now);
            info!(task_id = %previous, preempted_by = %id, "stopped running timer");
        }

        let task = &mut self.tasks[index];
        task.timer_started_at = Some(now);
        task.timer_ended_at = None;
        task.updated_at = now;
        self.active_timer_task_id = Some(task.id.clone());

        info!(task_id = %id, minutes = ?task.timer_minutes, "started timer");
        Ok(task.clone())
    }

    /// Stops `id`'s countdown; a no-op for a task whose timer is not running.
    pub fn stop_timer(&mut self, id: &str) -> Result<Task, AppError> {
        let index = self.position(id)?;
        if self.active_timer_task_id.as_deref() != Some(id) {
            return Ok(self.tasks[index].clone());
        }

        let now = self.clock.now();
        self.finish_timer(id, now);
        info!(task_id = %id, "stopped timer");
        Ok(self.tasks[index].clone())
    }

    /// Polls the running countdown. Does not change state: when the result
    /// reports `expired`, the caller stops the timer and raises the alert.
    pub fn tick(&self, now: OffsetDateTime) -> Option<TimerTick> {
        let active_id = self.active_timer_task_id.as_deref()?;
        let task = self.tasks.iter().find(|task| task.id == active_id)?;
        let result = timer::tick(task, now);
        if let Some(result) = result.as_ref() {
            debug!(
                task_id = %result.task_id,
                remaining_ms = result.remaining_ms,
                expired = result.expired,
                "timer tick"
            );
        }
        result
    }

    fn finish_timer(&mut self, id: &str, now: OffsetDateTime) {
        if let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) {
            task.timer_started_at = None;
            task.timer_ended_at = Some(now);
            task.updated_at = now;
        }
        if self.active_timer_task_id.as_deref() == Some(id) {
            self.active_timer_task_id = None;
        }
    }

    fn position(&self, id: &str) -> Result<usize, AppError> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| AppError::task_not_found(id))
    }

    fn compact(&mut self, status: TaskStatus) {
        let assignments = reorder::compact(&self.tasks, status);
        self.apply(&assignments);
    }

    fn apply(&mut self, assignments: &[OrderAssignment]) {
        for assignment in assignments {
            let task = &mut self.tasks[assignment.index];
            task.status = assignment.status;
            task.order = assignment.order;
        }
    }
}

fn normalize_title(title: &str) -> Result<String, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("title is required"));
    }
    Ok(trimmed.to_string())
}

fn normalize_description(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn validate_minutes(minutes: Option<u32>) -> Result<(), AppError> {
    if minutes == Some(0) {
        return Err(AppError::validation("timer minutes must be positive"));
    }
    Ok(())
}
