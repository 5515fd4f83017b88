use crossterm::event::{KeyCode, KeyEvent};

use crate::timer::MAX_MINUTES;
use crate::tui::app::App;

pub(super) fn handle_timer(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') => app.timer.toggle(),
        KeyCode::Char('r') => app.timer.reset(),
        KeyCode::Char('m') => {
            let mode = app.timer.mode().next();
            app.timer.set_mode(mode);
            app.set_status(format!("{} mode", mode.label()));
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            let m = app.timer.work_minutes() + 1;
            if !app.timer.set_work_minutes(m) {
                app.set_error(format!("work length is at most {} minutes", MAX_MINUTES));
            }
        }
        KeyCode::Char('-') => {
            let m = app.timer.work_minutes().saturating_sub(1);
            if !app.timer.set_work_minutes(m) {
                app.set_error("work length must be at least 1 minute");
            }
        }
        KeyCode::Char(']') => {
            let m = app.timer.break_minutes() + 1;
            if !app.timer.set_break_minutes(m) {
                app.set_error(format!("break length is at most {} minutes", MAX_MINUTES));
            }
        }
        KeyCode::Char('[') => {
            let m = app.timer.break_minutes().saturating_sub(1);
            if !app.timer.set_break_minutes(m) {
                app.set_error("break length must be at least 1 minute");
            }
        }
        KeyCode::Char('c') => {
            let minutes = app.config.timer.countdown_minutes;
            if !app.clock.start_countdown(minutes) {
                app.set_error(format!("countdown must be 1 to {} minutes", MAX_MINUTES));
            }
        }
        KeyCode::Char('w') => app.clock.start_stopwatch(),
        KeyCode::Char('x') => app.clock.reset(),
        _ => {}
    }
}
