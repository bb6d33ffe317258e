use crate::model::Task;
use serde::{Deserialize, Serialize};

/// Plain-data image of a board, used for persistence and full-replacement loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub active_timer_task_id: Option<String>,
}
