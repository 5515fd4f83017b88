use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{AddStage, App, Mode};
use crate::util::unicode::{next_boundary, prev_boundary};

/// Text entry for the two-stage add prompt (title, then description).
pub(super) fn handle_add(app: &mut App, key: KeyEvent, stage: AddStage) {
    match key.code {
        KeyCode::Esc => {
            app.edit_buffer.clear();
            app.draft_title.clear();
            app.back_to_navigate();
        }
        // Alt+Enter starts a new line in the description
        KeyCode::Enter
            if stage == AddStage::Description && key.modifiers.contains(KeyModifiers::ALT) =>
        {
            insert(app, "\n");
        }
        KeyCode::Enter => submit(app, stage),
        KeyCode::Backspace => {
            let start = prev_boundary(&app.edit_buffer, app.edit_cursor);
            app.edit_buffer.replace_range(start..app.edit_cursor, "");
            app.edit_cursor = start;
        }
        KeyCode::Delete => {
            let end = next_boundary(&app.edit_buffer, app.edit_cursor);
            app.edit_buffer.replace_range(app.edit_cursor..end, "");
        }
        KeyCode::Left => app.edit_cursor = prev_boundary(&app.edit_buffer, app.edit_cursor),
        KeyCode::Right => app.edit_cursor = next_boundary(&app.edit_buffer, app.edit_cursor),
        KeyCode::Home => app.edit_cursor = 0,
        KeyCode::End => app.edit_cursor = app.edit_buffer.len(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut buf = [0u8; 4];
            insert(app, c.encode_utf8(&mut buf));
        }
        _ => {}
    }
}

fn insert(app: &mut App, text: &str) {
    app.edit_buffer.insert_str(app.edit_cursor, text);
    app.edit_cursor += text.len();
}

fn submit(app: &mut App, stage: AddStage) {
    let text = std::mem::take(&mut app.edit_buffer);
    app.edit_cursor = 0;
    match stage {
        AddStage::Title => {
            if text.trim().is_empty() {
                app.set_status("nothing added");
                app.back_to_navigate();
                return;
            }
            app.draft_title = text;
            app.mode = Mode::Adding(AddStage::Description);
        }
        AddStage::Description => {
            let title = std::mem::take(&mut app.draft_title);
            if let Some(id) = app.board.add(&title, &text) {
                app.follow(id);
                app.set_status("added");
            }
            app.check_persist();
            app.back_to_navigate();
        }
    }
}
