//! Client for the remote text-completion service used to suggest a task order.
//!
//! Speaks the OpenAI chat completions wire format, so any compatible endpoint
//! works (`api_url` in `[assistant]`). The credential is read from the
//! environment variable named by `api_key_env`.

use std::time::Duration;

use serde_json::json;

use crate::model::config::AssistantConfig;
use crate::model::task::Task;

/// Instruction sent as the system message of every suggestion request.
pub const SYSTEM_INSTRUCTION: &str = "You are a productivity assistant that helps \
prioritize a todo list. Consider urgency, importance, dependencies between tasks and \
effort. Completed tasks should go last.";

/// Error type for completion requests
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("no API key: set the {0} environment variable")]
    MissingCredential(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response from service: {0}")]
    Malformed(String),
}

/// A text-completion collaborator: system instruction + prompt in, free text out.
pub trait CompletionClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, AssistantError>;
}

/// Blocking client for `POST {api_url}/chat/completions`.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    agent: ureq::Agent,
}

impl OpenAiClient {
    /// Build a client from config, reading the credential from the environment.
    /// Fails before any request is made when the credential is missing.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AssistantError::MissingCredential(config.api_key_env.clone()))?;
        Ok(Self::with_key(config, api_key))
    }

    pub fn with_key(config: &AssistantConfig, api_key: String) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        OpenAiClient {
            base_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            agent,
        }
    }

    fn request_body(&self, system: &str, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, AssistantError> {
        let base = self.base_url.trim_end_matches('/');
        let url = format!("{base}/chat/completions");
        let auth = format!("Bearer {}", self.api_key);

        tracing::debug!(%url, model = %self.model, "requesting task order suggestion");
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .set("Authorization", &auth)
            .send_json(self.request_body(system, prompt));

        match response {
            Ok(r) => {
                let body: serde_json::Value = r
                    .into_json()
                    .map_err(|e| AssistantError::Malformed(e.to_string()))?;
                extract_content(&body)
            }
            Err(ureq::Error::Status(status, r)) => Err(AssistantError::Status {
                status,
                body: r.into_string().unwrap_or_default(),
            }),
            Err(ureq::Error::Transport(t)) => Err(AssistantError::Transport(t.to_string())),
        }
    }
}

/// Pull `choices[0].message.content` out of a chat completion body.
pub fn extract_content(body: &serde_json::Value) -> Result<String, AssistantError> {
    body.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| AssistantError::Malformed("missing choices[0].message.content".into()))
}

/// Enumerate the tasks for the prompt. Numbering is 1-based and matches the
/// `Task N` references the reconciler understands.
pub fn build_prompt(tasks: &[Task]) -> String {
    let mut out = String::from("Here are my current tasks:\n\n");
    for (i, task) in tasks.iter().enumerate() {
        out.push_str(&format!("Task {}: {}\n", i + 1, task.title));
        if task.has_description() {
            out.push_str(&format!("Description: {}\n", task.description.trim()));
        }
        out.push_str(&format!(
            "Status: {}\n\n",
            if task.completed { "Completed" } else { "Pending" }
        ));
    }
    out.push_str(
        "Analyze these tasks and reply with a section headed \"Ranked Priority List:\" \
followed by every task as a numbered list, most important first, in the form \
\"1. Task N: <title> (short reason)\". After the list, leave a blank line before any \
other commentary.",
    );
    out
}
