use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode, MoveState};

/// Pick up the task under the cursor.
pub(super) fn enter_move_mode(app: &mut App) {
    let Some(id) = app.selected_id() else {
        return;
    };
    let sections = app.shown_sections();
    let Some((section, pointer)) = sections
        .iter()
        .enumerate()
        .find_map(|(s, ids)| ids.iter().position(|x| *x == id).map(|i| (s, i)))
    else {
        return;
    };
    app.move_state = Some(MoveState {
        id,
        section,
        pointer,
    });
    app.mode = Mode::Move;
}

pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    let Some(mut state) = app.move_state else {
        app.back_to_navigate();
        return;
    };
    let id = state.id;
    let sections = app.shown_sections();
    let bucketed = app.board.config().bucketing;
    // rows available in a section once the carried task is taken out
    let others = |s: usize| {
        sections
            .get(s)
            .map_or(0, |ids| ids.iter().filter(|x| **x != id).count())
    };

    match key.code {
        KeyCode::Enter | KeyCode::Char('m') => {
            drop_task(app);
            return;
        }
        KeyCode::Esc => {
            app.move_state = None;
            app.follow(id);
            app.back_to_navigate();
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if state.pointer < others(state.section) {
                state.pointer += 1;
            } else if state.section + 1 < sections.len() {
                state.section += 1;
                state.pointer = 0;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if state.pointer > 0 {
                state.pointer -= 1;
            } else if state.section > 0 {
                state.section -= 1;
                state.pointer = others(state.section);
            }
        }
        KeyCode::Tab if bucketed && state.section + 1 < sections.len() => {
            state.section += 1;
            state.pointer = 0;
        }
        KeyCode::BackTab if bucketed && state.section > 0 => {
            state.section -= 1;
            state.pointer = 0;
        }
        KeyCode::Char(c @ '1'..='5') if bucketed => {
            state.section = c as usize - '1' as usize;
            state.pointer = 0;
        }
        _ => return,
    }
    app.move_state = Some(state);
    app.sync_move_cursor();
}

/// Put the carried task down where the pointer is and save.
fn drop_task(app: &mut App) {
    let sections = app.move_sections();
    let Some(state) = app.move_state.take() else {
        return;
    };
    let moved = match sections {
        Some(sections) if app.board.config().bucketing => {
            let relettered = app.board.reassign_on_move(state.id, state.section);
            app.board.recompute_sections(&sections) || relettered
        }
        Some(sections) => app.board.recompute_order(&sections.concat()),
        None => false,
    };
    app.check_persist();
    if moved {
        app.set_status("moved");
    }
    app.follow(state.id);
    app.back_to_navigate();
}
