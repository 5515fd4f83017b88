use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::task::{Priority, Task, TaskId};
use crate::ops::bucket;
use crate::ops::suggest::OrderPlan;
use crate::util::markdown;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    /// 1-based position in the displayed order
    pub number: usize,
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct PlanJson {
    pub matched: usize,
    pub order: Vec<TaskJson>,
    pub applied: bool,
}

#[derive(Serialize)]
pub struct ImportJson {
    pub imported: usize,
    pub dropped: usize,
    pub mode: &'static str,
}

pub fn task_to_json(number: usize, task: &Task) -> TaskJson {
    TaskJson {
        number,
        id: task.id,
        title: task.title.clone(),
        description: task.description.clone(),
        completed: task.completed,
        priority: task.priority,
        created_at: task.created_at,
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// `  3. [x] Title`, with a `+` when the task has a description
pub fn format_task_line(number: usize, task: &Task) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    let more = if task.has_description() { " +" } else { "" };
    format!("{:>3}. [{}] {}{}", number, check, task.title, more)
}

/// Numbered listing in display order. With buckets, each non-empty bucket
/// gets a `== A ==` header. `keep` filters without renumbering.
pub fn format_listing(
    tasks: &[Task],
    bucketed: bool,
    keep: impl Fn(&Task) -> bool,
) -> Vec<String> {
    let mut lines = Vec::new();
    if !bucketed {
        for (i, task) in tasks.iter().enumerate() {
            if keep(task) {
                lines.push(format_task_line(i + 1, task));
            }
        }
        return lines;
    }

    let mut number = 0;
    for (priority, group) in bucket::bucket(tasks) {
        let mut section = Vec::new();
        for task in group {
            number += 1;
            if keep(task) {
                section.push(format_task_line(number, task));
            }
        }
        if section.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("== {} ==", priority));
        lines.extend(section);
    }
    lines
}

/// Full view of one task
pub fn format_task_detail(task: &Task, render_markdown: bool) -> Vec<String> {
    let check = if task.completed { 'x' } else { ' ' };
    let mut lines = vec![format!("[{}] {}", check, task.title)];
    lines.push(format!("id: {}", task.id));
    if let Some(p) = task.priority {
        lines.push(format!("priority: {}", p));
    }
    if let Some(created) = task.created_at {
        lines.push(format!("created: {}", created.format("%Y-%m-%d %H:%M")));
    }
    if task.has_description() {
        lines.push(String::new());
        if render_markdown {
            lines.extend(markdown::render_plain(&task.description));
        } else {
            lines.extend(task.description.lines().map(str::to_string));
        }
    }
    lines
}

/// A suggested order, marking which tasks the suggestion placed explicitly.
/// `preview` is the collection as it would be after applying the plan; with
/// buckets the lines are grouped under the letters the tasks would take.
pub fn format_plan(plan: &OrderPlan, preview: &[Task], bucketed: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "Suggested order ({} of {} placed by the assistant):",
        plan.matched,
        plan.order.len()
    )];
    let mut section = None;
    for (i, id) in plan.order.iter().enumerate() {
        let Some(task) = preview.iter().find(|t| t.id == *id) else {
            continue;
        };
        let priority = task.effective_priority();
        if bucketed && section != Some(priority) {
            section = Some(priority);
            lines.push(format!("== {} ==", priority));
        }
        let tail = if i >= plan.matched { "  (unplaced)" } else { "" };
        lines.push(format!("{}{}", format_task_line(i + 1, task), tail));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::reorder;
    use crate::ops::suggest::Suggestion;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<Task> {
        let mut a = Task::new(1, "Write the report", "with **charts**");
        a.priority = Some(Priority::C);
        let mut b = Task::new(2, "Buy groceries", "");
        b.priority = Some(Priority::A);
        b.completed = true;
        let mut c = Task::new(3, "Call dentist", "");
        c.priority = Some(Priority::C);
        vec![a, b, c]
    }

    #[test]
    fn task_line() {
        let tasks = sample();
        assert_eq!(format_task_line(1, &tasks[0]), "  1. [ ] Write the report +");
        assert_eq!(format_task_line(12, &tasks[1]), " 12. [x] Buy groceries");
    }

    #[test]
    fn bucketed_listing_numbers_in_display_order() {
        let lines = format_listing(&sample(), true, |_| true);
        assert_eq!(
            lines,
            vec![
                "== A ==",
                "  1. [x] Buy groceries",
                "",
                "== C ==",
                "  2. [ ] Write the report +",
                "  3. [ ] Call dentist",
            ]
        );
    }

    #[test]
    fn filtered_listing_keeps_numbers() {
        let lines = format_listing(&sample(), true, |t| !t.completed);
        assert_eq!(
            lines,
            vec!["== C ==", "  2. [ ] Write the report +", "  3. [ ] Call dentist"]
        );
    }

    #[test]
    fn flat_listing_uses_stored_order() {
        let lines = format_listing(&sample(), false, |_| true);
        assert_eq!(lines[0], "  1. [ ] Write the report +");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn detail_renders_markdown() {
        let lines = format_task_detail(&sample()[0], true);
        assert_eq!(lines[0], "[ ] Write the report");
        assert!(lines.contains(&"priority: C".to_string()));
        assert_eq!(lines.last().unwrap(), "with charts");

        let raw = format_task_detail(&sample()[0], false);
        assert_eq!(raw.last().unwrap(), "with **charts**");
    }

    #[test]
    fn plan_marks_unplaced_tasks() {
        let tasks = sample();
        let plan = OrderPlan {
            order: vec![3, 1, 2],
            matched: 1,
            suggestions: vec![Suggestion {
                title: "Call dentist".into(),
                task_ref: None,
            }],
        };
        let lines = format_plan(&plan, &tasks, false);
        assert_eq!(lines[0], "Suggested order (1 of 3 placed by the assistant):");
        assert_eq!(lines[1], "  1. [ ] Call dentist");
        assert!(lines[2].ends_with("(unplaced)"));
    }

    #[test]
    fn bucketed_plan_shows_section_headers() {
        let tasks = sample();
        let plan = OrderPlan {
            order: vec![3, 1, 2],
            matched: 3,
            suggestions: Vec::new(),
        };
        let preview = reorder::arrange(&tasks, &plan.order, true);
        let lines = format_plan(&plan, &preview, true);
        assert_eq!(
            lines[1..].to_vec(),
            vec![
                "== A ==",
                "  1. [ ] Call dentist",
                "== C ==",
                "  2. [ ] Write the report +",
                "  3. [x] Buy groceries",
            ]
        );
    }

    #[test]
    fn json_skips_empty_fields() {
        let json = serde_json::to_value(task_to_json(1, &sample()[2])).unwrap();
        assert_eq!(json["priority"], "C");
        assert!(json.get("description").is_none());
        assert!(json.get("created_at").is_none());
    }
}
