use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Priority;
use crate::tui::app::{AddStage, App, Mode};

pub(super) fn handle_board(app: &mut App, key: KeyEvent) {
    let len = app.board.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.cursor + 1 < len {
                app.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.cursor = app.cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.cursor = len.saturating_sub(1),
        KeyCode::Char('J') => move_selected(app, false),
        KeyCode::Char('K') => move_selected(app, true),
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            if let (Some(id), Some(priority)) = (app.selected_id(), Priority::from_index(idx)) {
                if app.board.set_priority(id, priority) {
                    app.set_status(format!("priority {}", priority));
                }
                app.check_persist();
                app.follow(id);
            }
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(id) = app.selected_id() {
                app.board.toggle_complete(id);
                app.check_persist();
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.selected_id() {
                app.mode = Mode::ConfirmDelete(id);
            }
        }
        KeyCode::Char('a') => {
            app.edit_buffer.clear();
            app.edit_cursor = 0;
            app.draft_title.clear();
            app.mode = Mode::Adding(AddStage::Title);
        }
        KeyCode::Char('m') => super::move_mode::enter_move_mode(app),
        KeyCode::Char('s') => app.request_suggestion(),
        _ => {}
    }
}

fn move_selected(app: &mut App, up: bool) {
    let Some(id) = app.selected_id() else {
        return;
    };
    let moved = if up {
        app.board.move_up(id)
    } else {
        app.board.move_down(id)
    };
    if moved {
        app.check_persist();
        app.follow(id);
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use crate::model::Priority;
    use crate::tui::input::tests::press;
    use crate::tui::render::test_helpers::app_with_tasks;

    #[test]
    fn test_cursor_stays_in_bounds() {
        let (_dir, mut app) = app_with_tasks(&["One", "Two"]);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.cursor, 0);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.cursor, 0);
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn test_move_task_cursor_follows() {
        let (_dir, mut app) = app_with_tasks(&["One", "Two", "Three"]);
        press(&mut app, KeyCode::Char('J'));
        let titles: Vec<_> = app.board.tasks().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Two", "One", "Three"]);
        assert_eq!(app.cursor, 1);
        assert_eq!(app.selected_task().unwrap().title, "One");
    }

    #[test]
    fn test_priority_key_moves_task_to_bucket() {
        let (_dir, mut app) = app_with_tasks(&["One", "Two"]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('1'));
        let task = app.selected_task().unwrap();
        assert_eq!(task.title, "Two");
        assert_eq!(task.priority, Some(Priority::A));
        // bucket A is drawn first
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn test_space_toggles() {
        let (_dir, mut app) = app_with_tasks(&["One"]);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.board.tasks()[0].completed);
        press(&mut app, KeyCode::Enter);
        assert!(!app.board.tasks()[0].completed);
    }

    #[test]
    fn test_keys_on_empty_board_do_nothing() {
        let (_dir, mut app) = app_with_tasks(&[]);
        for c in ['j', 'J', 'K', '1', ' ', 'd'] {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(app.board.is_empty());
        assert_eq!(app.cursor, 0);
        assert_eq!(app.mode, crate::tui::app::Mode::Navigate);
    }
}
