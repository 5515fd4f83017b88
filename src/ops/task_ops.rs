use chrono::{DateTime, Utc};

use crate::model::config::InsertionOrder;
use crate::model::task::{Priority, Task, TaskId, fresh_id};

/// Error type for task lookups from user input
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("invalid priority \"{0}\" (expected one of A, B, C, D, E)")]
    InvalidPriority(String),
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task(tasks: &[Task], id: TaskId) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

pub fn find_task_mut(tasks: &mut [Task], id: TaskId) -> Option<&mut Task> {
    tasks.iter_mut().find(|t| t.id == id)
}

pub fn position_of(tasks: &[Task], id: TaskId) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}

/// Resolve a user-supplied task reference against the displayed order: a
/// 1-based position, or a full task id.
pub fn resolve_ref(order: &[TaskId], raw: &str) -> Result<TaskId, TaskError> {
    let n: u64 = raw
        .trim()
        .trim_start_matches('#')
        .parse()
        .map_err(|_| TaskError::NotFound(raw.to_string()))?;
    if n >= 1 && (n as usize) <= order.len() {
        return Ok(order[n as usize - 1]);
    }
    order
        .iter()
        .copied()
        .find(|id| *id == n)
        .ok_or_else(|| TaskError::NotFound(raw.to_string()))
}

/// Parse a priority letter, accepting lower case from the command line.
pub fn parse_priority(raw: &str) -> Result<Priority, TaskError> {
    Priority::from_letter(&raw.trim().to_ascii_uppercase())
        .ok_or_else(|| TaskError::InvalidPriority(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// Build a new task, or `None` when the title is blank.
pub fn new_task(
    existing: &[Task],
    title: &str,
    description: &str,
    bucketing: bool,
    now: DateTime<Utc>,
) -> Option<Task> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let id = fresh_id(existing, now.timestamp_millis().max(0) as u64);
    let mut task = Task::new(id, title, description.trim());
    if bucketing {
        task.priority = Some(Priority::default());
    }
    task.created_at = Some(now);
    Some(task)
}

pub fn insert_task(tasks: &mut Vec<Task>, task: Task, order: InsertionOrder) {
    match order {
        InsertionOrder::Front => tasks.insert(0, task),
        InsertionOrder::Back => tasks.push(task),
    }
}

/// Append `incoming` with freshly generated ids so nothing collides.
pub fn merge_tasks(tasks: &mut Vec<Task>, incoming: Vec<Task>, now_ms: u64) -> usize {
    let count = incoming.len();
    for mut task in incoming {
        task.id = fresh_id(tasks.iter(), now_ms);
        tasks.push(task);
    }
    count
}

// ---------------------------------------------------------------------------
// Mutation
// ---------------------------------------------------------------------------

/// Flip `completed`. Returns false when no task has `id`.
pub fn toggle_complete(tasks: &mut [Task], id: TaskId) -> bool {
    match find_task_mut(tasks, id) {
        Some(task) => {
            task.completed = !task.completed;
            true
        }
        None => false,
    }
}

/// Remove the task with `id`. Returns false when absent.
pub fn delete_task(tasks: &mut Vec<Task>, id: TaskId) -> bool {
    let before = tasks.len();
    tasks.retain(|t| t.id != id);
    tasks.len() != before
}

/// Set a task's bucket. Returns false when absent.
pub fn set_priority(tasks: &mut [Task], id: TaskId, priority: Priority) -> bool {
    match find_task_mut(tasks, id) {
        Some(task) => {
            task.priority = Some(priority);
            true
        }
        None => false,
    }
}
