use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::assistant::{CompletionClient, OpenAiClient};
use crate::io::config_io;
use crate::io::store::FileStore;
use crate::io::watcher::StoreWatcher;
use crate::logging;
use crate::model::{AppConfig, Task, TaskId};
use crate::ops::board::{Board, Surface};
use crate::ops::bucket;
use crate::ops::reorder::{self, ItemBox};
use crate::ops::suggest::{self, OrderPlan, SuggestError, SuggestionGate};
use crate::timer::{FocusClock, ProductivityTimer};

use super::input;
use super::render;
use super::theme::Theme;

/// Which view is currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Board,
    Timer,
}

impl View {
    pub fn next(self) -> View {
        match self {
            View::Board => View::Timer,
            View::Timer => View::Board,
        }
    }
}

/// Which field the add prompt is collecting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddStage {
    Title,
    Description,
}

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Adding(AddStage),
    ConfirmDelete(TaskId),
    /// A suggested order is waiting for y/n
    PlanReview,
    /// A task is picked up; see [`MoveState`]
    Move,
    Help,
}

/// A task picked up in move mode. Nothing is saved until it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveState {
    pub id: TaskId,
    /// Target section, 0 = A (always 0 without buckets)
    pub section: usize,
    /// Pointer row inside the target section, counting only the other tasks
    pub pointer: usize,
}

/// Surface for the terminal: the event loop repaints when a board mutation
/// has marked it dirty.
#[derive(Debug, Default)]
pub struct ScreenSurface {
    dirty: bool,
    redraws: usize,
}

impl ScreenSurface {
    pub fn redraws(&self) -> usize {
        self.redraws
    }
}

impl Surface for ScreenSurface {
    fn redraw(&mut self, _tasks: &[Task]) {
        self.dirty = true;
        self.redraws += 1;
    }
}

/// Transient message shown in the status row until the next keypress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub type TuiBoard = Board<FileStore, ScreenSurface>;

/// Main application state
pub struct App {
    pub board: TuiBoard,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub view: View,
    pub mode: Mode,
    pub theme: Theme,
    pub should_quit: bool,
    /// Index into the board's visual order
    pub cursor: usize,
    /// First visible row of the board list
    pub scroll: usize,
    /// Text being typed in the add prompt
    pub edit_buffer: String,
    /// Byte offset of the edit cursor
    pub edit_cursor: usize,
    /// Title captured by the first add stage
    pub draft_title: String,
    pub timer: ProductivityTimer,
    pub clock: FocusClock,
    pub gate: SuggestionGate,
    /// Reconciled suggestion waiting for confirmation
    pub pending_plan: Option<OrderPlan>,
    pub status: Option<StatusMessage>,
    pub move_state: Option<MoveState>,
    suggest_rx: Option<Receiver<Result<OrderPlan, SuggestError>>>,
}

impl App {
    pub fn new(board: TuiBoard, config: AppConfig, data_dir: PathBuf) -> Self {
        let theme = Theme::for_mode(board.dark_mode().unwrap_or(false));
        let timer = ProductivityTimer::new(&config.timer);
        App {
            board,
            config,
            data_dir,
            view: View::Board,
            mode: Mode::Navigate,
            theme,
            should_quit: false,
            cursor: 0,
            scroll: 0,
            edit_buffer: String::new(),
            edit_cursor: 0,
            draft_title: String::new(),
            timer,
            clock: FocusClock::default(),
            gate: SuggestionGate::new(),
            pending_plan: None,
            status: None,
            move_state: None,
            suggest_rx: None,
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn visual_order(&self) -> Vec<TaskId> {
        self.board.visual_order()
    }

    pub fn selected_id(&self) -> Option<TaskId> {
        if let Some(state) = &self.move_state {
            return Some(state.id);
        }
        self.visual_order().get(self.cursor).copied()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_id().and_then(|id| self.board.find(id))
    }

    /// Keep the cursor on a real row after the collection shrank.
    pub fn clamp_cursor(&mut self) {
        let len = self.board.len();
        self.cursor = if len == 0 { 0 } else { self.cursor.min(len - 1) };
    }

    /// Put the cursor back on `id` after a reorder.
    pub fn follow(&mut self, id: TaskId) {
        if let Some(pos) = self.visual_order().iter().position(|t| *t == id) {
            self.cursor = pos;
        }
    }

    // -----------------------------------------------------------------------
    // Move mode
    // -----------------------------------------------------------------------

    /// The sections as the board shows them, one section when buckets are off.
    pub fn shown_sections(&self) -> Vec<Vec<TaskId>> {
        if self.board.config().bucketing {
            bucket::sections(self.board.tasks())
        } else {
            vec![self.board.tasks().iter().map(|t| t.id).collect()]
        }
    }

    /// Sections with the carried task placed where the pointer puts it.
    pub fn move_sections(&self) -> Option<Vec<Vec<TaskId>>> {
        let state = self.move_state?;
        let mut sections = self.shown_sections();
        for section in &mut sections {
            section.retain(|id| *id != state.id);
        }
        let target = sections.get_mut(state.section)?;
        let rows: Vec<ItemBox> = (0..target.len())
            .map(|i| ItemBox::new(i as f64, 1.0))
            .collect();
        let slot = reorder::drag_insert_index(state.pointer as f64, &rows);
        target.insert(slot, state.id);
        Some(sections)
    }

    /// The collection as it would look if the carried task were dropped now.
    pub fn move_preview(&self) -> Option<Vec<Task>> {
        let sections = self.move_sections()?;
        let tasks = self.board.tasks();
        Some(if self.board.config().bucketing {
            reorder::recompute_sections(tasks, &sections)
        } else {
            reorder::recompute_order(tasks, &sections.concat())
        })
    }

    /// Keep the cursor on the carried task while it moves.
    pub fn sync_move_cursor(&mut self) {
        let Some(state) = self.move_state else {
            return;
        };
        if let Some(preview) = self.move_preview() {
            let order = bucket::visual_order(&preview, self.board.config().bucketing);
            if let Some(pos) = order.iter().position(|id| *id == state.id) {
                self.cursor = pos;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Status + repaint
    // -----------------------------------------------------------------------

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn mark_dirty(&mut self) {
        self.board.surface_mut().dirty = true;
    }

    /// True once per pending repaint.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.board.surface_mut().dirty)
    }

    /// Surface a save failure from the last mutation, if any.
    pub fn check_persist(&mut self) {
        if let Some(e) = self.board.take_persist_error() {
            self.set_error(format!("could not save: {}", e));
        }
    }

    /// Leave a modal state; a plan that arrived meanwhile gets reviewed next.
    pub fn back_to_navigate(&mut self) {
        self.mode = if self.pending_plan.is_some() {
            Mode::PlanReview
        } else {
            Mode::Navigate
        };
    }

    pub fn toggle_theme(&mut self) {
        let dark = !self.theme.dark;
        self.board.set_dark_mode(dark);
        self.theme = Theme::for_mode(dark);
        self.check_persist();
    }

    // -----------------------------------------------------------------------
    // Suggestions
    // -----------------------------------------------------------------------

    /// Ask the configured assistant for an order in the background.
    pub fn request_suggestion(&mut self) {
        if self.board.is_empty() {
            self.set_error("no tasks to prioritize");
            return;
        }
        if self.gate.is_pending() {
            self.set_error(SuggestError::AlreadyPending.to_string());
            return;
        }
        match OpenAiClient::from_config(&self.config.assistant) {
            Ok(client) => self.spawn_suggestion(Box::new(client)),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Run `client` on a worker thread; the result arrives via
    /// [`poll_suggestion`](Self::poll_suggestion).
    pub fn spawn_suggestion(&mut self, client: Box<dyn CompletionClient + Send>) {
        if let Err(e) = self.gate.begin() {
            self.set_error(e.to_string());
            return;
        }
        let tasks = self.board.tasks().to_vec();
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let result = suggest::request_plan(&*client, &tasks);
            let _ = tx.send(result);
        });
        self.suggest_rx = Some(rx);
        self.set_status("asking the assistant...");
        tracing::info!("suggestion requested");
    }

    /// Non-blocking check for a finished suggestion.
    pub fn poll_suggestion(&mut self) {
        let Some(rx) = &self.suggest_rx else {
            return;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => Err(SuggestError::NoOrder),
        };
        self.suggest_rx = None;
        self.gate.finish(result);

        match self.gate.take() {
            Some(Ok(plan)) if plan.is_unchanged(&self.board.visual_order()) => {
                self.set_status("tasks are already in the suggested order");
            }
            Some(Ok(plan)) => {
                tracing::info!(matched = plan.matched, "suggestion ready");
                self.pending_plan = Some(plan);
                self.set_status("suggested order ready: y to apply, n to keep");
                if self.mode == Mode::Navigate {
                    self.mode = Mode::PlanReview;
                }
            }
            Some(Err(e)) => {
                tracing::warn!(error = %e, "suggestion failed");
                self.set_error(e.to_string());
            }
            None => {}
        }
        self.mark_dirty();
    }

    /// Resolve the plan under review.
    pub fn finish_review(&mut self, accept: bool) {
        let Some(plan) = self.pending_plan.take() else {
            self.mode = Mode::Navigate;
            return;
        };
        let keep = self.selected_id();
        if accept {
            if self.board.apply_plan(&plan) {
                self.set_status("applied suggested order");
            }
            self.check_persist();
        } else {
            self.set_status("kept current order");
        }
        if let Some(id) = keep {
            self.follow(id);
        }
        self.mode = Mode::Navigate;
    }

    // -----------------------------------------------------------------------
    // Background events
    // -----------------------------------------------------------------------

    /// One second passed.
    pub fn on_tick(&mut self) {
        let running = self.timer.is_running() || self.clock.is_running();
        if let Some(event) = self.timer.tick() {
            self.set_status(event.message());
        }
        if let Some(event) = self.clock.tick() {
            self.set_status(event.message());
        }
        if running {
            self.mark_dirty();
        }
    }

    /// The store file changed on disk.
    pub fn on_store_changed(&mut self) {
        let keep = self.selected_id();
        self.board.reload();
        self.clamp_cursor();
        if let Some(state) = self.move_state
            && self.board.find(state.id).is_none()
        {
            self.move_state = None;
            self.set_error("the task being moved was removed elsewhere");
            self.back_to_navigate();
        }
        if self.move_state.is_some() {
            self.sync_move_cursor();
        } else if let Some(id) = keep {
            self.follow(id);
        }
    }
}

/// Open the board in `data_dir` (or the default one) and run the TUI.
pub fn run(data_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let data_dir = config_io::resolve_data_dir(data_dir)?;
    let _log_guard = logging::init_tui_logging(&data_dir);
    let config = config_io::load_config(&data_dir)?;
    let store = FileStore::open(&data_dir)?;
    let board = Board::load(store, ScreenSurface::default(), config.board.clone());
    let mut app = App::new(board, config, data_dir);

    let watcher = match StoreWatcher::start(&app.data_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::warn!(error = %e, "store watcher unavailable");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    const TICK: Duration = Duration::from_secs(1);
    let mut last_tick = Instant::now();
    app.mark_dirty();

    loop {
        if app.take_dirty() {
            terminal.draw(|frame| render::render(frame, app))?;
        }

        let timeout = TICK.saturating_sub(last_tick.elapsed());
        if event::poll(timeout.min(Duration::from_millis(250)))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                    app.mark_dirty();
                }
                Event::Resize(_, _) => app.mark_dirty(),
                _ => {}
            }
        }

        if last_tick.elapsed() >= TICK {
            last_tick = Instant::now();
            app.on_tick();
        }

        if let Some(w) = watcher
            && w.poll()
        {
            app.on_store_changed();
        }

        app.poll_suggestion();

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Path shown in the help overlay
pub fn store_path(data_dir: &Path) -> PathBuf {
    data_dir.join(crate::io::store::STORE_FILE)
}
