//! Table rows for `list` output.

use flowstate_core::model::{Task, TimerState};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled, Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    #[tabled(rename = "#")]
    pub position: u32,

    #[tabled(rename = "ID")]
    pub id: String,

    #[tabled(rename = "Title")]
    pub title: String,

    #[tabled(rename = "Timer")]
    pub timer: String,
}

impl TaskRow {
    pub fn from_task(task: &Task, active_timer_task_id: Option<&str>) -> Self {
        Self {
            position: task.order,
            id: task.id.clone(),
            title: task.title.clone(),
            timer: timer_label(task, active_timer_task_id),
        }
    }
}

pub fn timer_label(task: &Task, active_timer_task_id: Option<&str>) -> String {
    match (task.timer_minutes, task.timer_state(active_timer_task_id)) {
        (None, _) => "-".to_string(),
        (Some(minutes), TimerState::Running) => format!("{minutes}m (running)"),
        (Some(minutes), TimerState::Idle) => format!("{minutes}m"),
    }
}

pub fn render_tasks(tasks: &[Task], active_timer_task_id: Option<&str>) -> String {
    if tasks.is_empty() {
        return "(empty)".to_string();
    }

    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow::from_task(task, active_timer_task_id))
        .collect();
    Table::new(rows).with(Style::sharp()).to_string()
}
