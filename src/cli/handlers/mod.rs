use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::assistant::{self, OpenAiClient};
use crate::io::config_io;
use crate::io::store::{self, FileStore};
use crate::model::config::AppConfig;
use crate::model::snapshot::ExportSnapshot;
use crate::model::task::{Task, TaskId};
use crate::ops::board::{Board, NullSurface};
use crate::ops::import::{self, ImportMode};
use crate::ops::suggest::{self, SuggestionGate};
use crate::ops::task_ops;
use crate::timer::{MAX_MINUTES, ProductivityTimer, TimerMode};

type CliResult = Result<(), Box<dyn Error>>;
type CliBoard = Board<FileStore, NullSurface>;

/// What every handler needs: where the data lives and how it is configured.
struct Context {
    data_dir: PathBuf,
    config: AppConfig,
    json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CliResult {
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref())?;
    let config = config_io::load_config(&data_dir)?;
    let ctx = Context {
        data_dir,
        config,
        json: cli.json,
    };
    tracing::debug!(data_dir = %ctx.data_dir.display(), "running command");

    match cli.command {
        // main.rs starts the TUI when no subcommand is given
        None => Ok(()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Show(args) => cmd_show(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Toggle(args) => cmd_toggle(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),
            Commands::Priority(args) => cmd_priority(&ctx, args),
            Commands::Mv(args) => cmd_mv(&ctx, args),
            Commands::Order(args) => cmd_order(&ctx, args),

            // Assistant
            Commands::Suggest(args) => cmd_suggest(&ctx, args),

            // Import / export
            Commands::Export(args) => cmd_export(&ctx, args),
            Commands::Import(args) => cmd_import(&ctx, args),

            // Preferences
            Commands::Theme(args) => cmd_theme(&ctx, args),
            Commands::Timer(args) => cmd_timer(&ctx, args),
            Commands::Config(args) => cmd_config(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_board(ctx: &Context) -> Result<CliBoard, Box<dyn Error>> {
    let store = FileStore::open(&ctx.data_dir)?;
    Ok(Board::load(store, NullSurface, ctx.config.board.clone()))
}

/// Surface a save failure that the board only logged.
fn finish(board: &mut CliBoard) -> CliResult {
    match board.take_persist_error() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}

/// Tasks in the order `list` shows them, with their 1-based numbers.
fn numbered(board: &CliBoard) -> Vec<(usize, &Task)> {
    board
        .visual_order()
        .into_iter()
        .filter_map(|id| board.find(id))
        .enumerate()
        .map(|(i, t)| (i + 1, t))
        .collect()
}

fn number_of(board: &CliBoard, id: TaskId) -> usize {
    board
        .visual_order()
        .iter()
        .position(|x| *x == id)
        .map_or(0, |i| i + 1)
}

fn resolve(board: &CliBoard, raw: &str) -> Result<TaskId, Box<dyn Error>> {
    Ok(task_ops::resolve_ref(&board.visual_order(), raw)?)
}

fn confirm(prompt: &str) -> Result<bool, Box<dyn Error>> {
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_task_json(board: &CliBoard, id: TaskId) -> CliResult {
    if let Some(task) = board.find(id) {
        let json = task_to_json(number_of(board, id), task);
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CliResult {
    let board = open_board(ctx)?;
    let keep = |t: &Task| (!args.pending || !t.completed) && (!args.done || t.completed);

    if ctx.json {
        let tasks: Vec<TaskJson> = numbered(&board)
            .into_iter()
            .filter(|(_, t)| keep(t))
            .map(|(n, t)| task_to_json(n, t))
            .collect();
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    let lines = format_listing(board.tasks(), ctx.config.board.bucketing, keep);
    if lines.is_empty() {
        println!("no tasks");
    } else {
        print_lines(&lines);
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: RefArg) -> CliResult {
    let board = open_board(ctx)?;
    let id = resolve(&board, &args.task)?;
    if ctx.json {
        return print_task_json(&board, id);
    }
    if let Some(task) = board.find(id) {
        print_lines(&format_task_detail(
            task,
            ctx.config.board.markdown_descriptions,
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CliResult {
    let priority = args
        .priority
        .as_deref()
        .map(task_ops::parse_priority)
        .transpose()?;
    let mut board = open_board(ctx)?;
    let id = board
        .add(&args.title, &args.description)
        .ok_or("task title cannot be empty")?;
    if let Some(p) = priority {
        board.set_priority(id, p);
    }
    finish(&mut board)?;

    if ctx.json {
        return print_task_json(&board, id);
    }
    if let Some(task) = board.find(id) {
        println!("added {}", format_task_line(number_of(&board, id), task).trim_start());
    }
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: RefArg) -> CliResult {
    let mut board = open_board(ctx)?;
    let id = resolve(&board, &args.task)?;
    board.toggle_complete(id);
    finish(&mut board)?;

    if ctx.json {
        return print_task_json(&board, id);
    }
    if let Some(task) = board.find(id) {
        let verb = if task.completed { "done" } else { "reopened" };
        println!("{}: {}", verb, task.title);
    }
    Ok(())
}

fn cmd_rm(ctx: &Context, args: RmArgs) -> CliResult {
    let mut board = open_board(ctx)?;
    let id = resolve(&board, &args.task)?;
    let title = board.find(id).map(|t| t.title.clone()).unwrap_or_default();

    if !args.yes && !confirm(&format!("Delete \"{}\"?", title))? {
        println!("cancelled");
        return Ok(());
    }
    board.delete(id);
    finish(&mut board)?;
    if !ctx.json {
        println!("deleted: {}", title);
    }
    Ok(())
}

fn cmd_priority(ctx: &Context, args: PriorityArgs) -> CliResult {
    let priority = task_ops::parse_priority(&args.priority)?;
    let mut board = open_board(ctx)?;
    let id = resolve(&board, &args.task)?;
    board.set_priority(id, priority);
    finish(&mut board)?;

    if ctx.json {
        return print_task_json(&board, id);
    }
    if let Some(task) = board.find(id) {
        println!("{} -> {}", task.title, priority);
    }
    Ok(())
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CliResult {
    let mut board = open_board(ctx)?;
    let id = resolve(&board, &args.task)?;
    let mut moved = 0;
    for _ in 0..args.steps {
        let ok = if args.up {
            board.move_up(id)
        } else {
            board.move_down(id)
        };
        if !ok {
            break;
        }
        moved += 1;
    }
    finish(&mut board)?;

    if ctx.json {
        return print_task_json(&board, id);
    }
    if let Some(task) = board.find(id) {
        if moved == 0 {
            println!("{} is already at the {}", task.title, if args.up { "top" } else { "bottom" });
        } else {
            println!("{}", format_task_line(number_of(&board, id), task).trim_start());
        }
    }
    Ok(())
}

fn cmd_order(ctx: &Context, args: OrderArgs) -> CliResult {
    let mut board = open_board(ctx)?;
    let order = board.visual_order();
    let ids = args
        .tasks
        .iter()
        .map(|raw| task_ops::resolve_ref(&order, raw))
        .collect::<Result<Vec<_>, _>>()?;
    board.recompute_order(&ids);
    finish(&mut board)?;

    if !ctx.json {
        print_lines(&format_listing(
            board.tasks(),
            ctx.config.board.bucketing,
            |_| true,
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

fn cmd_suggest(ctx: &Context, args: SuggestArgs) -> CliResult {
    let mut board = open_board(ctx)?;
    if board.is_empty() {
        return Err("no tasks to order".into());
    }
    if args.dry_run {
        println!("{}", assistant::build_prompt(board.tasks()));
        return Ok(());
    }

    let mut gate = SuggestionGate::new();
    let plan = match args.from_file {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| format!("could not read {}: {}", path, e))?;
            gate.run(|| suggest::plan_from_text(board.tasks(), &text))?
        }
        None => {
            let client = OpenAiClient::from_config(&ctx.config.assistant)?;
            if !ctx.json {
                eprintln!("asking {} for a suggested order...", ctx.config.assistant.model);
            }
            gate.run(|| suggest::request_plan(&client, board.tasks()))?
        }
    };

    let unchanged = plan.is_unchanged(&board.visual_order());
    let preview = board.preview_order(&plan.order);

    if ctx.json {
        let order = plan
            .order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                preview
                    .iter()
                    .find(|t| t.id == *id)
                    .map(|t| task_to_json(i + 1, t))
            })
            .collect();
        let applied = args.yes && board.apply_plan(&plan);
        finish(&mut board)?;
        let out = PlanJson {
            matched: plan.matched,
            order,
            applied,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_lines(&format_plan(&plan, &preview, ctx.config.board.bucketing));
    if unchanged {
        println!("order unchanged");
    } else if args.yes || confirm("Apply this order?")? {
        board.apply_plan(&plan);
        finish(&mut board)?;
        println!("applied suggested order");
    } else {
        println!("kept current order");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Import / export
// ---------------------------------------------------------------------------

fn cmd_export(ctx: &Context, args: ExportArgs) -> CliResult {
    let board = open_board(ctx)?;
    let now = Utc::now();
    let text = import::export_json(board.tasks(), now)?;

    let target = args
        .file
        .unwrap_or_else(|| ExportSnapshot::file_name_for(now));
    if target == "-" {
        println!("{}", text);
        return Ok(());
    }
    store::atomic_write(Path::new(&target), text.as_bytes())
        .map_err(|e| format!("could not write {}: {}", target, e))?;
    if !ctx.json {
        println!("exported {} tasks to {}", board.len(), target);
    }
    Ok(())
}

fn cmd_import(ctx: &Context, args: ImportArgs) -> CliResult {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    let batch = import::parse_import(&text, ctx.config.board.bucketing)?;
    let mut board = open_board(ctx)?;

    let mode = if args.replace {
        ImportMode::Replace
    } else if args.merge {
        ImportMode::Merge
    } else if ctx.json {
        return Err("pass --merge or --replace".into());
    } else if board.is_empty() || confirm("Replace all current tasks? (n merges)")? {
        ImportMode::Replace
    } else {
        ImportMode::Merge
    };

    let dropped = batch.dropped;
    let imported = board.import(batch, mode);
    finish(&mut board)?;

    if ctx.json {
        let out = ImportJson {
            imported,
            dropped,
            mode: match mode {
                ImportMode::Merge => "merge",
                ImportMode::Replace => "replace",
            },
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if dropped > 0 {
        println!("imported {} tasks ({} invalid records skipped)", imported, dropped);
    } else {
        println!("imported {} tasks", imported);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CliResult {
    let mut board = open_board(ctx)?;
    let current = board.dark_mode().unwrap_or(false);
    let dark = match args.theme {
        None => current,
        Some(ThemeChoice::Dark) => true,
        Some(ThemeChoice::Light) => false,
        Some(ThemeChoice::Toggle) => !current,
    };
    if args.theme.is_some() {
        board.set_dark_mode(dark);
        finish(&mut board)?;
    }
    let name = if dark { "dark" } else { "light" };
    if ctx.json {
        println!("{}", serde_json::json!({ "theme": name }));
    } else {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_timer(ctx: &Context, args: TimerArgs) -> CliResult {
    let mut timer = ProductivityTimer::new(&ctx.config.timer);
    if let Some(m) = args.work
        && !timer.set_work_minutes(m)
    {
        return Err(format!("--work must be 1 to {} minutes", MAX_MINUTES).into());
    }
    if let Some(m) = args.break_minutes
        && !timer.set_break_minutes(m)
    {
        return Err(format!("--break must be 1 to {} minutes", MAX_MINUTES).into());
    }
    if let TimerModeArg::TwoMinute = args.mode {
        timer.set_mode(TimerMode::TwoMinute);
    }

    let mut completed = 0;
    let mut stdout = std::io::stdout();
    timer.start();
    while completed < args.phases {
        let phase = if timer.on_break() { "break" } else { "work" };
        write!(stdout, "\r{} {} {}  ", timer.mode().label(), phase, timer.display())?;
        stdout.flush()?;
        std::thread::sleep(Duration::from_secs(1));
        if let Some(event) = timer.tick() {
            completed += 1;
            writeln!(stdout, "\r{}", event.message())?;
            if !timer.is_running() && completed < args.phases {
                timer.start();
            }
        }
    }
    println!("sessions: {}", timer.sessions());
    Ok(())
}

fn cmd_config(ctx: &Context, args: ConfigCmd) -> CliResult {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
            }
        }
        ConfigAction::Set(set) => {
            std::fs::create_dir_all(&ctx.data_dir)?;
            let (_, mut doc) = config_io::read_config(&ctx.data_dir)?;
            config_io::set_value(&mut doc, &set.key, &set.value)?;
            config_io::write_config(&ctx.data_dir, &doc)?;
            println!("{} = {}", set.key, set.value);
        }
        ConfigAction::Path => {
            println!("{}", ctx.data_dir.join(config_io::CONFIG_FILE).display());
        }
    }
    Ok(())
}
