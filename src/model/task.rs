use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Task identifier: creation time in milliseconds, bumped until unique
pub type TaskId = u64;

/// Priority bucket letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    A,
    B,
    #[default]
    C,
    D,
    E,
}

impl Priority {
    /// All buckets in display order
    pub const ALL: [Priority; 5] = [
        Priority::A,
        Priority::B,
        Priority::C,
        Priority::D,
        Priority::E,
    ];

    pub fn letter(self) -> char {
        match self {
            Priority::A => 'A',
            Priority::B => 'B',
            Priority::C => 'C',
            Priority::D => 'D',
            Priority::E => 'E',
        }
    }

    /// Parse a single upper-case letter. Anything else is rejected.
    pub fn from_letter(s: &str) -> Option<Priority> {
        match s {
            "A" => Some(Priority::A),
            "B" => Some(Priority::B),
            "C" => Some(Priority::C),
            "D" => Some(Priority::D),
            "E" => Some(Priority::E),
            _ => None,
        }
    }

    /// Position of this bucket among the five
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bucket at the given section position (0 = A)
    pub fn from_index(idx: usize) -> Option<Priority> {
        Self::ALL.get(idx).copied()
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A single todo entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Markdown text, empty when the task has none
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// Bucket letter. Unknown letters load as `None`.
    #[serde(
        default,
        deserialize_with = "lenient_priority",
        skip_serializing_if = "Option::is_none"
    )]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, description: impl Into<String>) -> Self {
        Task {
            id,
            title: title.into(),
            description: description.into(),
            completed: false,
            priority: None,
            created_at: None,
        }
    }

    /// The bucket this task is displayed in (`C` when unset)
    pub fn effective_priority(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// Accept any JSON value for `priority`; keep it only if it is a valid letter.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(|v| v.as_str())
        .and_then(Priority::from_letter))
}

/// Pick an id near `now_ms` that no existing task uses.
pub fn fresh_id<'a>(existing: impl IntoIterator<Item = &'a Task>, now_ms: u64) -> TaskId {
    let used: std::collections::HashSet<TaskId> = existing.into_iter().map(|t| t.id).collect();
    let mut id = now_ms;
    while used.contains(&id) {
        id += 1;
    }
    id
}

/// Current wall-clock time in milliseconds
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
