use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "pomo", about = concat!("pomo v", env!("CARGO_PKG_VERSION"), " - prioritized todos and a Pomodoro timer"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory (default: $POMO_DIR or the platform data dir)
    #[arg(short = 'D', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a task
    Add(AddArgs),
    /// List tasks, numbered (grouped by priority when buckets are on)
    List(ListArgs),
    /// Show one task with its description
    Show(RefArg),
    /// Mark a task done, or not done again
    Toggle(RefArg),
    /// Delete a task
    Rm(RmArgs),
    /// Set a task's priority bucket (A-E)
    Priority(PriorityArgs),
    /// Move a task one slot up or down
    Mv(MvArgs),
    /// Reorder tasks: list refs in the order you want them
    Order(OrderArgs),
    /// Ask the assistant for a suggested order
    Suggest(SuggestArgs),
    /// Write all tasks to a JSON file
    Export(ExportArgs),
    /// Read tasks from a JSON export
    Import(ImportArgs),
    /// Show or set the color theme
    Theme(ThemeArgs),
    /// Run the productivity timer in the terminal
    Timer(TimerArgs),
    /// Show or edit configuration
    Config(ConfigCmd),
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Markdown description
    #[arg(short, long, default_value = "")]
    pub description: String,
    /// Priority bucket (A-E)
    #[arg(short, long)]
    pub priority: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only tasks not yet done
    #[arg(long, conflicts_with = "done")]
    pub pending: bool,
    /// Only completed tasks
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct RefArg {
    /// Task number as shown by `list`, or task id
    pub task: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task position or id
    pub task: String,
    /// Do not ask for confirmation
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct PriorityArgs {
    /// Task position or id
    pub task: String,
    /// Bucket letter (A-E)
    pub priority: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task position or id
    pub task: String,
    /// Move toward the top
    #[arg(long, conflicts_with = "down", required_unless_present = "down")]
    pub up: bool,
    /// Move toward the bottom
    #[arg(long)]
    pub down: bool,
    /// Number of slots to move
    #[arg(long, default_value_t = 1)]
    pub steps: usize,
}

#[derive(Args)]
pub struct OrderArgs {
    /// Task positions or ids, in the new order; tasks not named keep their
    /// relative order after these
    #[arg(required = true)]
    pub tasks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SuggestArgs {
    /// Use a saved assistant reply instead of calling the service
    #[arg(long, value_name = "FILE")]
    pub from_file: Option<String>,
    /// Apply the suggested order without asking
    #[arg(long, short)]
    pub yes: bool,
    /// Only print the prompt that would be sent
    #[arg(long)]
    pub dry_run: bool,
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output file, or `-` for stdout (default: tasks-<date>.json)
    pub file: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file produced by `export`
    pub file: String,
    /// Append to the current tasks with new ids
    #[arg(long, conflicts_with = "replace")]
    pub merge: bool,
    /// Discard the current tasks first
    #[arg(long)]
    pub replace: bool,
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
    Toggle,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// New theme (omit to show the current one)
    pub theme: Option<ThemeChoice>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum TimerModeArg {
    Pomodoro,
    TwoMinute,
}

#[derive(Args)]
pub struct TimerArgs {
    /// Timer cycle
    #[arg(long, value_enum, default_value = "pomodoro")]
    pub mode: TimerModeArg,
    /// Work phase length in minutes (default from config)
    #[arg(long)]
    pub work: Option<u32>,
    /// Break length in minutes (default from config)
    #[arg(long = "break")]
    pub break_minutes: Option<u32>,
    /// Stop after this many completed phases
    #[arg(long, default_value_t = 1)]
    pub phases: u32,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration (default)
    Show,
    /// Set a value, e.g. `board.insertion back`
    Set(ConfigSetArgs),
    /// Print the path to config.toml
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Dotted key: <table>.<field>
    pub key: String,
    /// New value
    pub value: String,
}
