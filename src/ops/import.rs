use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::snapshot::ExportSnapshot;
use crate::model::task::{Priority, Task, TaskId, fresh_id};

/// Error type for import operations
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("import file has no \"tasks\" array")]
    NotAnExport,
}

/// How imported tasks combine with the current collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Append with freshly generated ids
    Merge,
    /// Discard the current collection
    Replace,
}

/// Validated records from an import file
#[derive(Debug, Default)]
pub struct ImportBatch {
    pub tasks: Vec<Task>,
    /// Records that failed validation and were left out
    pub dropped: usize,
}

/// Serialize the collection in the export shape.
pub fn export_json(tasks: &[Task], now: DateTime<Utc>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ExportSnapshot::new(tasks.to_vec(), now))
}

/// Parse an export file, keeping only valid records.
///
/// A record is valid when it has a non-empty string `title` and a `priority`
/// in `A`..`E`. Without buckets the priority may be missing or null. Other
/// fields are optional. A bare JSON array of records is accepted as well.
pub fn parse_import(json: &str, require_priority: bool) -> Result<ImportBatch, ImportError> {
    let root: Value = serde_json::from_str(json)?;
    let records = match root {
        Value::Object(mut obj) => match obj.remove("tasks") {
            Some(Value::Array(records)) => records,
            _ => return Err(ImportError::NotAnExport),
        },
        Value::Array(records) => records,
        _ => return Err(ImportError::NotAnExport),
    };

    let mut batch = ImportBatch::default();
    for record in &records {
        match validate_record(record, require_priority) {
            Some(task) => batch.tasks.push(task),
            None => batch.dropped += 1,
        }
    }
    if batch.dropped > 0 {
        tracing::debug!(dropped = batch.dropped, "dropped invalid import records");
    }
    Ok(batch)
}

fn validate_record(record: &Value, require_priority: bool) -> Option<Task> {
    let obj = record.as_object()?;
    let title = obj.get("title")?.as_str()?.trim();
    if title.is_empty() {
        return None;
    }
    let priority = match obj.get("priority") {
        None | Some(Value::Null) if require_priority => return None,
        None | Some(Value::Null) => None,
        Some(v) => Some(Priority::from_letter(v.as_str()?)?),
    };

    let mut task = Task::new(
        obj.get("id").and_then(Value::as_u64).unwrap_or(0),
        title,
        obj.get("description").and_then(Value::as_str).unwrap_or(""),
    );
    task.completed = obj.get("completed").and_then(Value::as_bool).unwrap_or(false);
    task.priority = priority;
    task.created_at = obj
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc));
    Some(task)
}

/// Prepare a batch for replace mode: imported ids are kept when they are
/// usable and unique, otherwise a fresh one is generated.
pub fn prepare_replacement(batch: Vec<Task>, now_ms: u64) -> Vec<Task> {
    let mut seen: HashSet<TaskId> = HashSet::new();
    let mut out: Vec<Task> = Vec::with_capacity(batch.len());
    for mut task in batch {
        if task.id == 0 || seen.contains(&task.id) {
            task.id = fresh_id(out.iter(), now_ms.max(1));
        }
        seen.insert(task.id);
        out.push(task);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn sample() -> Vec<Task> {
        let mut a = Task::new(10, "Write the report", "Q3 **numbers**");
        a.priority = Some(Priority::A);
        a.created_at = Some(ts());
        let mut b = Task::new(20, "Buy groceries", "");
        b.completed = true;
        b.priority = Some(Priority::D);
        vec![a, b, Task::new(30, "Call dentist", "")]
    }

    #[test]
    fn export_has_version_timestamp_and_tasks() {
        let json = export_json(&sample(), ts()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["timestamp"], "2024-05-01T09:30:00Z");
        assert_eq!(value["tasks"].as_array().unwrap().len(), 3);
        assert_eq!(value["tasks"][0]["createdAt"], "2024-05-01T09:30:00Z");
    }

    #[test]
    fn export_then_replace_import_keeps_content() {
        let original = sample();
        let json = export_json(&original, ts()).unwrap();
        let batch = parse_import(&json, false).unwrap();
        assert_eq!(batch.dropped, 0);
        let restored = prepare_replacement(batch.tasks, 1);

        let strip = |tasks: &[Task]| -> Vec<(String, String, bool, Option<Priority>)> {
            tasks
                .iter()
                .map(|t| (t.title.clone(), t.description.clone(), t.completed, t.priority))
                .collect()
        };
        assert_eq!(strip(&restored), strip(&original));
        assert_eq!(restored[0].created_at, Some(ts()));
    }

    #[test]
    fn invalid_records_are_dropped() {
        let json = r#"{"version":"1.0","tasks":[
            {"id":1,"title":"ok","priority":"B"},
            {"id":2,"title":"   "},
            {"id":3},
            {"id":4,"title":"bad letter","priority":"Z"},
            {"id":5,"title":"lower","priority":"a"},
            {"id":6,"title":42},
            "not an object",
            {"title":"no priority"},
            {"title":"null priority","priority":null}
        ]}"#;
        let batch = parse_import(json, true).unwrap();
        let titles: Vec<&str> = batch.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["ok"]);
        assert_eq!(batch.dropped, 8);

        let flat = parse_import(json, false).unwrap();
        let titles: Vec<&str> = flat.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["ok", "no priority", "null priority"]);
        assert_eq!(flat.tasks[1].priority, None);
    }

    #[test]
    fn non_export_documents_are_errors() {
        assert!(matches!(parse_import("{not json", true), Err(ImportError::Parse(_))));
        assert!(matches!(
            parse_import(r#"{"items":[]}"#, true),
            Err(ImportError::NotAnExport)
        ));
        assert!(matches!(parse_import("12", true), Err(ImportError::NotAnExport)));
    }

    #[test]
    fn bare_array_is_accepted() {
        let batch = parse_import(r#"[{"title":"one","priority":"C"}]"#, true).unwrap();
        assert_eq!(batch.tasks.len(), 1);
    }

    #[test]
    fn replacement_fixes_missing_and_duplicate_ids() {
        let batch = vec![
            Task::new(7, "a", ""),
            Task::new(7, "b", ""),
            Task::new(0, "c", ""),
        ];
        let out = prepare_replacement(batch, 1_000);
        let ids: HashSet<TaskId> = out.iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(out[0].id, 7);
    }
}
