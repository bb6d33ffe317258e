use crate::model::Task;
use serde::Serialize;
use time::OffsetDateTime;

const MILLIS_PER_MINUTE: i128 = 60_000;

/// Result of polling the running countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimerTick {
    pub task_id: String,
    pub remaining_ms: u64,
    pub expired: bool,
}

/// Remaining time of `task`'s countdown at `now`.
///
/// `None` when the task has no configured duration or was never started.
/// Remaining time is floored at zero; `expired` turns true exactly when the
/// full duration has elapsed. A `now` earlier than the start counts as no
/// time elapsed.
pub fn tick(task: &Task, now: OffsetDateTime) -> Option<TimerTick> {
    let minutes = task.timer_minutes?;
    let started_at = task.timer_started_at?;

    let total = i128::from(minutes) * MILLIS_PER_MINUTE;
    let elapsed = (now - started_at).whole_milliseconds().max(0);
    let remaining = (total - elapsed).max(0);

    Some(TimerTick {
        task_id: task.id.clone(),
        remaining_ms: u64::try_from(remaining).unwrap_or(u64::MAX),
        expired: elapsed >= total,
    })
}

/// `MM:SS` rendering of a remaining duration, truncated to whole seconds.
pub fn format_remaining(remaining_ms: u64) -> String {
    let total_seconds = remaining_ms / 1000;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}
