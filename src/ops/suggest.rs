//! Turning free-text assistant replies into a task order.
//!
//! The assistant is asked for a numbered list under a marker heading. Parsing
//! is best effort: a versioned [`OrderParser`] extracts list items, and
//! [`reconcile`] fuzzily maps them back onto the existing tasks.

use std::sync::LazyLock;

use regex::Regex;

use crate::io::assistant::{self, AssistantError, CompletionClient};
use crate::model::task::{Task, TaskId};

/// Lower-case phrases that open the ranked list in a reply.
const MARKERS: &[&str] = &["ranked priority list", "recommended order"];

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\d+\.\s+(.*\S)").unwrap());
static TASK_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^task\s+(\d+)\s*[:.\-]\s*(.*)$").unwrap());
static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").unwrap());

/// Error type for suggestion requests
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error(transparent)]
    Call(#[from] AssistantError),
    #[error("could not determine order from the suggestion")]
    NoOrder,
    #[error("a suggestion request is already in progress")]
    AlreadyPending,
}

/// One extracted list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub title: String,
    /// 1-based `Task N` reference into the prompt enumeration, when present
    pub task_ref: Option<usize>,
}

/// Extracts suggestions from a completion reply. Implementations are
/// versioned so a prompt format change can ship with its own parser.
pub trait OrderParser {
    fn version(&self) -> &'static str;
    fn parse(&self, text: &str) -> Vec<Suggestion>;
}

/// Numbered list following a marker line; stops at the first blank line
/// after an item has been captured.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkerListParser;

impl OrderParser for MarkerListParser {
    fn version(&self) -> &'static str {
        "1"
    }

    fn parse(&self, text: &str) -> Vec<Suggestion> {
        let mut out = Vec::new();
        let mut capturing = false;
        for line in text.lines() {
            if !capturing {
                let lower = line.to_lowercase();
                capturing = MARKERS.iter().any(|m| lower.contains(m));
                continue;
            }
            if line.trim().is_empty() {
                if out.is_empty() {
                    continue;
                }
                break;
            }
            if let Some(item) = parse_item(line) {
                out.push(item);
            }
        }
        out
    }
}

fn parse_item(line: &str) -> Option<Suggestion> {
    let caps = ITEM_RE.captures(line)?;
    let body = caps[1].replace(['*', '`'], "");
    let body = body.trim();

    let (task_ref, title) = match TASK_REF_RE.captures(body) {
        Some(c) => (c[1].parse::<usize>().ok(), c[2].to_string()),
        None => (None, body.to_string()),
    };
    let title = PAREN_RE.replace_all(&title, "").trim().to_string();

    if title.is_empty() && task_ref.is_none() {
        return None;
    }
    Some(Suggestion { title, task_ref })
}

/// Parse with the current parser.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    MarkerListParser.parse(text)
}

/// Titles only, in suggested order.
pub fn parse_suggested_order(text: &str) -> Vec<String> {
    parse_suggestions(text).into_iter().map(|s| s.title).collect()
}

/// Lowercase, drop punctuation, collapse runs of whitespace.
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A reconciled order awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPlan {
    /// Every task id, in the proposed order
    pub order: Vec<TaskId>,
    /// How many leading entries of `order` came from the suggestion
    pub matched: usize,
    pub suggestions: Vec<Suggestion>,
}

impl OrderPlan {
    /// True when the plan matches the order currently shown.
    pub fn is_unchanged(&self, visual_order: &[TaskId]) -> bool {
        self.order == visual_order
    }
}

/// Map suggestions back onto `tasks` (canonical order).
///
/// Each suggestion claims the first unused task whose normalized title
/// contains it or is contained by it. When nothing matches by title, a
/// `Task N` reference naming an unused task is used instead. Tasks nothing
/// claimed follow in their prior relative order.
pub fn reconcile(tasks: &[Task], suggestions: &[Suggestion]) -> Result<OrderPlan, SuggestError> {
    if suggestions.is_empty() {
        return Err(SuggestError::NoOrder);
    }

    let normalized: Vec<String> = tasks.iter().map(|t| normalize_title(&t.title)).collect();
    let mut used = vec![false; tasks.len()];
    let mut order = Vec::with_capacity(tasks.len());

    for suggestion in suggestions {
        let wanted = normalize_title(&suggestion.title);
        let by_title = if wanted.is_empty() {
            None
        } else {
            (0..tasks.len()).find(|&i| {
                !used[i]
                    && !normalized[i].is_empty()
                    && (normalized[i].contains(&wanted) || wanted.contains(&normalized[i]))
            })
        };
        let by_ref = || {
            suggestion
                .task_ref
                .and_then(|n| n.checked_sub(1))
                .filter(|&i| i < tasks.len() && !used[i])
        };
        if let Some(i) = by_title.or_else(by_ref) {
            used[i] = true;
            order.push(tasks[i].id);
        }
    }

    let matched = order.len();
    order.extend(
        tasks
            .iter()
            .zip(&used)
            .filter(|(_, used)| !**used)
            .map(|(t, _)| t.id),
    );
    tracing::debug!(matched, total = tasks.len(), "reconciled suggested order");

    Ok(OrderPlan {
        order,
        matched,
        suggestions: suggestions.to_vec(),
    })
}

/// Parse `text` and reconcile it against `tasks`.
pub fn plan_from_text(tasks: &[Task], text: &str) -> Result<OrderPlan, SuggestError> {
    reconcile(tasks, &parse_suggestions(text))
}

/// Ask the completion client for an order and reconcile the reply.
pub fn request_plan(
    client: &dyn CompletionClient,
    tasks: &[Task],
) -> Result<OrderPlan, SuggestError> {
    let prompt = assistant::build_prompt(tasks);
    let reply = client.complete(assistant::SYSTEM_INSTRUCTION, &prompt)?;
    plan_from_text(tasks, &reply)
}

// ---------------------------------------------------------------------------
// Request gate
// ---------------------------------------------------------------------------

/// Where the single in-flight suggestion request stands.
#[derive(Debug, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Pending,
    Done(Result<OrderPlan, SuggestError>),
}

/// Allows at most one outstanding suggestion request.
#[derive(Debug, Default)]
pub struct SuggestionGate {
    state: RequestState,
}

impl SuggestionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, RequestState::Pending)
    }

    /// Mark a request as started. Fails while another one is pending.
    pub fn begin(&mut self) -> Result<(), SuggestError> {
        if self.is_pending() {
            return Err(SuggestError::AlreadyPending);
        }
        self.state = RequestState::Pending;
        Ok(())
    }

    /// Record the outcome of the pending request.
    pub fn finish(&mut self, result: Result<OrderPlan, SuggestError>) {
        self.state = RequestState::Done(result);
    }

    /// Take a finished result, returning the gate to idle.
    pub fn take(&mut self) -> Option<Result<OrderPlan, SuggestError>> {
        match std::mem::take(&mut self.state) {
            RequestState::Done(result) => Some(result),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Run `f` as the gated request, blocking.
    pub fn run<F>(&mut self, f: F) -> Result<OrderPlan, SuggestError>
    where
        F: FnOnce() -> Result<OrderPlan, SuggestError>,
    {
        self.begin()?;
        self.finish(f());
        self.take().unwrap_or(Err(SuggestError::NoOrder))
    }
}
