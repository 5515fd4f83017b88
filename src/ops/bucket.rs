use indexmap::IndexMap;

use crate::model::task::{Priority, Task, TaskId};

/// Group tasks into the five buckets, `A` first. Every bucket is present
/// (possibly empty) and keeps the canonical relative order of its tasks.
/// Tasks without a valid priority land in `C`.
pub fn bucket(tasks: &[Task]) -> IndexMap<Priority, Vec<&Task>> {
    let mut groups: IndexMap<Priority, Vec<&Task>> =
        Priority::ALL.iter().map(|p| (*p, Vec::new())).collect();
    for task in tasks {
        if let Some(group) = groups.get_mut(&task.effective_priority()) {
            group.push(task);
        }
    }
    groups
}

/// Ids per bucket, `A` first: the five sections as the render layer shows them.
pub fn sections(tasks: &[Task]) -> Vec<Vec<TaskId>> {
    bucket(tasks)
        .into_values()
        .map(|group| group.iter().map(|t| t.id).collect())
        .collect()
}

/// The order in which tasks are displayed: bucket by bucket, or simply the
/// canonical order when bucketing is off.
pub fn visual_order(tasks: &[Task], bucketed: bool) -> Vec<TaskId> {
    if bucketed {
        sections(tasks).into_iter().flatten().collect()
    } else {
        tasks.iter().map(|t| t.id).collect()
    }
}

/// Write the letter of section `group_index` (0 = A … 4 = E) onto the task.
/// Returns false when the task is missing, the index names no section, or the
/// task already carries that letter.
pub fn reassign_on_move(tasks: &mut [Task], id: TaskId, group_index: usize) -> bool {
    let Some(priority) = Priority::from_index(group_index) else {
        return false;
    };
    match tasks.iter_mut().find(|t| t.id == id) {
        Some(task) if task.priority != Some(priority) => {
            task.priority = Some(priority);
            true
        }
        _ => false,
    }
}
