mod edit;
mod move_mode;
mod navigate;
mod timer;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, View};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Navigate => {
            // Clear any transient status message on keypress
            app.status = None;
            if handle_global(app, key) {
                return;
            }
            match app.view {
                View::Board => navigate::handle_board(app, key),
                View::Timer => timer::handle_timer(app, key),
            }
        }
        Mode::Adding(stage) => edit::handle_add(app, key, stage),
        Mode::ConfirmDelete(id) => handle_confirm_delete(app, key, id),
        Mode::PlanReview => handle_plan_review(app, key),
        Mode::Move => move_mode::handle_move(app, key),
        Mode::Help => {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc) {
                app.back_to_navigate();
            }
        }
    }
}

/// Keys that work in every view. Returns true when the key was consumed.
fn handle_global(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Tab => app.view = app.view.next(),
        KeyCode::Char('t') => app.toggle_theme(),
        _ => return false,
    }
    true
}

fn handle_confirm_delete(app: &mut App, key: KeyEvent, id: crate::model::TaskId) {
    match key.code {
        KeyCode::Char('y') => {
            if app.board.delete(id) {
                app.set_status("deleted");
            }
            app.check_persist();
            app.clamp_cursor();
            app.back_to_navigate();
        }
        KeyCode::Char('n') | KeyCode::Esc => app.back_to_navigate(),
        _ => {}
    }
}

fn handle_plan_review(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => app.finish_review(true),
        KeyCode::Char('n') | KeyCode::Esc => app.finish_review(false),
        _ => {}
    }
}
