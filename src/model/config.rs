use serde::{Deserialize, Serialize};

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Where `add` places a new task in the canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertionOrder {
    #[default]
    Front,
    Back,
}

/// Behaviour switches for the todo board
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub insertion: InsertionOrder,
    /// Group tasks into the A–E priority buckets
    #[serde(default = "default_true")]
    pub bucketing: bool,
    /// Render descriptions as markdown
    #[serde(default = "default_true")]
    pub markdown_descriptions: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            insertion: InsertionOrder::Front,
            bucketing: true,
            markdown_descriptions: true,
        }
    }
}

/// Connection details for the text-completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Base URL including the API version, e.g. `https://api.openai.com/v1`
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the bearer credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        AssistantConfig {
            api_url: default_api_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(default = "default_two_minute_minutes")]
    pub two_minute_minutes: u32,
    /// Default length of the focus-clock countdown
    #[serde(default = "default_countdown_minutes")]
    pub countdown_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            work_minutes: default_work_minutes(),
            break_minutes: default_break_minutes(),
            two_minute_minutes: default_two_minute_minutes(),
            countdown_minutes: default_countdown_minutes(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Show the key hint line in the TUI status row
    #[serde(default)]
    pub show_key_hints: bool,
}

fn default_true() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_work_minutes() -> u32 {
    25
}

fn default_break_minutes() -> u32 {
    5
}

fn default_two_minute_minutes() -> u32 {
    2
}

fn default_countdown_minutes() -> u32 {
    30
}
