use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::task::Task;

/// Version tag written into every export
pub const EXPORT_VERSION: &str = "1.0";

/// An exported copy of the whole collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSnapshot {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub tasks: Vec<Task>,
}

impl ExportSnapshot {
    pub fn new(tasks: Vec<Task>, timestamp: DateTime<Utc>) -> Self {
        ExportSnapshot {
            version: EXPORT_VERSION.to_string(),
            timestamp,
            tasks,
        }
    }

    /// Default download name: `tasks-<YYYY-MM-DD>.json`
    pub fn file_name(&self) -> String {
        Self::file_name_for(self.timestamp)
    }

    pub fn file_name_for(timestamp: DateTime<Utc>) -> String {
        format!("tasks-{}.json", timestamp.format("%Y-%m-%d"))
    }
}
