//! Order computation for board moves.
//!
//! Everything here is pure: functions read a task slice and return the
//! `(status, order)` assignments a move or compaction implies. The board
//! applies them.

use crate::model::{Task, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderAssignment {
    /// Index into the task slice the plan was computed from.
    pub index: usize,
    pub status: TaskStatus,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    /// Final order of the moving task in its destination column.
    pub order: u32,
    pub assignments: Vec<OrderAssignment>,
}

/// Slice indices of the tasks in `status`, ascending by `order`.
///
/// Equal orders keep their slice order, which is insertion order for the board.
pub fn column_indices(tasks: &[Task], status: TaskStatus, exclude: Option<usize>) -> Vec<usize> {
    let mut indices: Vec<usize> = tasks
        .iter()
        .enumerate()
        .filter(|(index, task)| task.status == status && Some(*index) != exclude)
        .map(|(index, _)| index)
        .collect();
    indices.sort_by_key(|&index| tasks[index].order);
    indices
}

/// Position a moving task lands at among `sibling_count` destination siblings.
///
/// An index outside `0..sibling_count`, or none at all, appends.
pub fn insertion_index(sibling_count: usize, target_index: Option<usize>) -> usize {
    match target_index {
        Some(index) if index < sibling_count => index,
        _ => sibling_count,
    }
}

/// Plans moving `tasks[moving]` into `destination` at `target_index`.
///
/// The destination column is renumbered densely with the mover inserted; when
/// the move crosses columns the source column is compacted as well.
/// `moving` must be a valid index into `tasks`.
pub fn plan_move(
    tasks: &[Task],
    moving: usize,
    destination: TaskStatus,
    target_index: Option<usize>,
) -> MovePlan {
    let source = tasks[moving].status;

    let mut sequence = column_indices(tasks, destination, Some(moving));
    let position = insertion_index(sequence.len(), target_index);
    sequence.insert(position, moving);

    let mut assignments = dense(&sequence, destination);
    if source != destination {
        let remaining = column_indices(tasks, source, Some(moving));
        assignments.extend(dense(&remaining, source));
    }

    MovePlan {
        order: position as u32,
        assignments,
    }
}

/// Dense `0..n` renumbering of one column, keeping its current sequence.
pub fn compact(tasks: &[Task], status: TaskStatus) -> Vec<OrderAssignment> {
    dense(&column_indices(tasks, status, None), status)
}

fn dense(sequence: &[usize], status: TaskStatus) -> Vec<OrderAssignment> {
    sequence
        .iter()
        .enumerate()
        .map(|(order, &index)| OrderAssignment {
            index,
            status,
            order: order as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{column_indices, compact, insertion_index, plan_move};
    use crate::model::{Task, TaskStatus};
    use time::macros::datetime;

    fn task(id: &str, status: TaskStatus, order: u32) -> Task {
        Task {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            status,
            order,
            timer_minutes: None,
            timer_started_at: None,
            timer_ended_at: None,
            created_at: datetime!(2025-12-20 08:00 UTC),
            updated_at: datetime!(2025-12-20 08:00 UTC),
        }
    }

    #[test]
    fn column_indices_sorts_by_order_and_keeps_ties_stable() {
        let tasks = vec![
            task("a", TaskStatus::Todo, 2),
            task("b", TaskStatus::Doing, 0),
            task("c", TaskStatus::Todo, 0),
            task("d", TaskStatus::Todo, 2),
        ];

        assert_eq!(column_indices(&tasks, TaskStatus::Todo, None), vec![2, 0, 3]);
        assert_eq!(column_indices(&tasks, TaskStatus::Todo, Some(0)), vec![2, 3]);
        assert!(column_indices(&tasks, TaskStatus::Done, None).is_empty());
    }

    #[test]
    fn insertion_index_appends_when_out_of_range() {
        assert_eq!(insertion_index(3, Some(1)), 1);
        assert_eq!(insertion_index(3, Some(3)), 3);
        assert_eq!(insertion_index(3, Some(99)), 3);
        assert_eq!(insertion_index(3, None), 3);
        assert_eq!(insertion_index(0, Some(0)), 0);
    }

    #[test]
    fn plan_move_inserts_and_shifts_destination_siblings() {
        let tasks = vec![
            task("x", TaskStatus::Doing, 0),
            task("y", TaskStatus::Doing, 1),
            task("z", TaskStatus::Doing, 2),
            task("w", TaskStatus::Todo, 0),
        ];

        let plan = plan_move(&tasks, 3, TaskStatus::Doing, Some(1));

        assert_eq!(plan.order, 1);
        let orders: Vec<(usize, u32)> = plan
            .assignments
            .iter()
            .map(|assignment| (assignment.index, assignment.order))
            .collect();
        assert_eq!(orders, vec![(0, 0), (3, 1), (1, 2), (2, 3)]);
        assert!(
            plan.assignments
                .iter()
                .all(|assignment| assignment.status == TaskStatus::Doing)
        );
    }

    #[test]
    fn plan_move_compacts_source_column() {
        let tasks = vec![
            task("a", TaskStatus::Todo, 0),
            task("b", TaskStatus::Todo, 1),
            task("c", TaskStatus::Todo, 2),
        ];

        let plan = plan_move(&tasks, 0, TaskStatus::Done, None);

        assert_eq!(plan.order, 0);
        assert!(plan.assignments.iter().any(|assignment| {
            assignment.index == 0 && assignment.status == TaskStatus::Done && assignment.order == 0
        }));
        assert!(plan.assignments.iter().any(|assignment| {
            assignment.index == 1 && assignment.status == TaskStatus::Todo && assignment.order == 0
        }));
        assert!(plan.assignments.iter().any(|assignment| {
            assignment.index == 2 && assignment.status == TaskStatus::Todo && assignment.order == 1
        }));
    }

    #[test]
    fn plan_move_within_column_reorders() {
        let tasks = vec![
            task("a", TaskStatus::Todo, 0),
            task("b", TaskStatus::Todo, 1),
            task("c", TaskStatus::Todo, 2),
        ];

        let plan = plan_move(&tasks, 2, TaskStatus::Todo, Some(0));

        let sequence: Vec<usize> = plan
            .assignments
            .iter()
            .map(|assignment| assignment.index)
            .collect();
        assert_eq!(sequence, vec![2, 0, 1]);
        assert_eq!(plan.assignments.len(), 3);
    }

    #[test]
    fn compact_closes_gaps() {
        let tasks = vec![
            task("a", TaskStatus::Done, 7),
            task("b", TaskStatus::Done, 3),
        ];

        let assignments = compact(&tasks, TaskStatus::Done);

        assert_eq!(assignments.len(), 2);
        assert_eq!((assignments[0].index, assignments[0].order), (1, 0));
        assert_eq!((assignments[1].index, assignments[1].order), (0, 1));
    }
}
