use crate::model::{Task, TaskStatus};

/// Where a dragged task was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// A column, optionally at a position among the column's other tasks.
    Column {
        status: TaskStatus,
        index: Option<usize>,
    },
    DeleteZone,
}

impl Destination {
    pub fn column(status: TaskStatus) -> Self {
        Self::Column {
            status,
            index: None,
        }
    }

    pub fn at(status: TaskStatus, index: usize) -> Self {
        Self::Column {
            status,
            index: Some(index),
        }
    }
}

/// What a drag controller reports it is hovering when the drag ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    Column(TaskStatus),
    Task(String),
    DeleteZone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved(Task),
    Deleted(Task),
}

impl MoveOutcome {
    pub fn task(&self) -> &Task {
        match self {
            Self::Moved(task) => task,
            Self::Deleted(task) => task,
        }
    }
}
