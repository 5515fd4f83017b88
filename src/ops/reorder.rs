use std::collections::HashSet;

use crate::model::task::{Priority, Task, TaskId};
use crate::ops::bucket;

/// Vertical extent of an item in a drop container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBox {
    pub top: f64,
    pub height: f64,
}

impl ItemBox {
    pub fn new(top: f64, height: f64) -> Self {
        ItemBox { top, height }
    }

    fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Rebuild the canonical order from the ids in their visual order.
///
/// Unknown and repeated ids are skipped. Tasks the view did not mention keep
/// their relative order and follow the mentioned ones.
pub fn recompute_order(tasks: &[Task], ids_in_visual_order: &[TaskId]) -> Vec<Task> {
    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut ordered = Vec::with_capacity(tasks.len());
    for id in ids_in_visual_order {
        if seen.contains(id) {
            continue;
        }
        if let Some(task) = tasks.iter().find(|t| t.id == *id) {
            seen.insert(*id);
            ordered.push(task.clone());
        }
    }
    ordered.extend(tasks.iter().filter(|t| !seen.contains(&t.id)).cloned());
    ordered
}

/// Bucketed variant of [`recompute_order`]: `sections[i]` lists the ids shown
/// in the i-th section, and each of those tasks takes that section's letter.
/// Sections beyond the fifth are ignored.
pub fn recompute_sections(tasks: &[Task], sections: &[Vec<TaskId>]) -> Vec<Task> {
    let mut placed: HashSet<TaskId> = HashSet::new();
    let mut ids = Vec::new();
    let mut letters = Vec::new();
    for (section, priority) in sections.iter().zip(Priority::ALL) {
        for id in section {
            if placed.insert(*id) {
                ids.push(*id);
                letters.push((*id, priority));
            }
        }
    }

    let mut ordered = recompute_order(tasks, &ids);
    for task in &mut ordered {
        if let Some((_, priority)) = letters.iter().find(|(id, _)| *id == task.id) {
            task.priority = Some(*priority);
        }
    }
    ordered
}

/// Sections for a flat requested order on a bucketed board.
///
/// The requested ids, then every other task in its current visual order, fill
/// the visual slots top to bottom. Section sizes stay as they are, so the
/// visible order becomes the requested one and each task takes the letter of
/// the slot it lands in.
pub fn fill_sections(tasks: &[Task], ids_in_visual_order: &[TaskId]) -> Vec<Vec<TaskId>> {
    let current = bucket::sections(tasks);
    let visual: Vec<TaskId> = current.iter().flatten().copied().collect();
    let in_view = recompute_order(tasks, &visual);
    let mut flat = recompute_order(&in_view, ids_in_visual_order)
        .into_iter()
        .map(|t| t.id);
    current
        .iter()
        .map(|section| flat.by_ref().take(section.len()).collect())
        .collect()
}

/// The collection after adopting `ids_in_visual_order`, without committing it.
pub fn arrange(tasks: &[Task], ids_in_visual_order: &[TaskId], bucketed: bool) -> Vec<Task> {
    if bucketed {
        recompute_sections(tasks, &fill_sections(tasks, ids_in_visual_order))
    } else {
        recompute_order(tasks, ids_in_visual_order)
    }
}

/// Where a dragged item should land in a container of unmoved items.
///
/// Picks the item whose vertical midpoint lies below the pointer and is
/// nearest to it, and returns its index (insert before it). Returns
/// `items.len()` (append) when every midpoint is at or above the pointer.
pub fn drag_insert_index(pointer_y: f64, items: &[ItemBox]) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.iter().enumerate() {
        let offset = pointer_y - item.midpoint();
        if offset < 0.0 && best.is_none_or(|(_, b)| offset > b) {
            best = Some((i, offset));
        }
    }
    best.map_or(items.len(), |(i, _)| i)
}

/// Direction of a keyboard move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

/// Move a task one slot up or down in its visual order.
///
/// With buckets, a task at the edge of its section crosses into the
/// neighbouring section (taking its letter). Returns `None` when the task is
/// unknown or already at the very top/bottom.
pub fn step_task(tasks: &[Task], id: TaskId, step: Step, bucketed: bool) -> Option<Vec<Task>> {
    if !bucketed {
        let mut ids: Vec<TaskId> = tasks.iter().map(|t| t.id).collect();
        let idx = ids.iter().position(|i| *i == id)?;
        let target = match step {
            Step::Up => idx.checked_sub(1)?,
            Step::Down if idx + 1 < ids.len() => idx + 1,
            Step::Down => return None,
        };
        ids.swap(idx, target);
        return Some(recompute_order(tasks, &ids));
    }

    let mut sections = bucket::sections(tasks);
    let (s, i) = sections.iter().enumerate().find_map(|(s, ids)| {
        ids.iter().position(|x| *x == id).map(|i| (s, i))
    })?;

    match step {
        Step::Up if i > 0 => sections[s].swap(i, i - 1),
        Step::Up if s > 0 => {
            sections[s].remove(i);
            sections[s - 1].push(id);
        }
        Step::Down if i + 1 < sections[s].len() => sections[s].swap(i, i + 1),
        Step::Down if s + 1 < sections.len() => {
            sections[s].remove(i);
            sections[s + 1].insert(0, id);
        }
        _ => return None,
    }
    Some(recompute_sections(tasks, &sections))
}
