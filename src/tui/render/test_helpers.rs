use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use tempfile::TempDir;

use crate::io::store::FileStore;
use crate::model::{AppConfig, Priority, Task};
use crate::ops::board::Board;
use crate::tui::app::{App, ScreenSurface};

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// An App over a fresh data directory holding `titles` (all in bucket C,
/// in the given order). Keep the `TempDir` alive for the test's duration.
pub fn app_with_tasks(titles: &[&str]) -> (TempDir, App) {
    app_with(titles, AppConfig::default())
}

pub fn app_with(titles: &[&str], config: AppConfig) -> (TempDir, App) {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path()).unwrap();
    let mut board = Board::load(store, ScreenSurface::default(), config.board.clone());
    if !titles.is_empty() {
        let tasks = titles
            .iter()
            .enumerate()
            .map(|(i, title)| {
                let mut task = Task::new(i as u64 + 1, *title, "");
                task.priority = Some(Priority::C);
                task
            })
            .collect();
        board.replace_all(tasks);
    }
    let app = App::new(board, config, dir.path().to_path_buf());
    (dir, app)
}
