mod snapshot;
mod task;

pub use snapshot::BoardSnapshot;
pub use task::{Task, TaskPatch, TaskStatus, TimerState};
