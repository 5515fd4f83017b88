use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{AddStage, App, Mode, View};
use crate::util::unicode::{display_width, truncate_to_width};

const BOARD_HINTS: &str = "a add  space done  d delete  m move  1-5 priority  s suggest  ? help";
const TIMER_HINTS: &str = "space start/pause  r reset  m mode  c countdown  w stopwatch  ? help";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (left, hint): (Vec<Span>, &str) = match app.mode {
        Mode::Navigate => {
            let left = match &app.status {
                Some(msg) => {
                    let color = if msg.is_error {
                        app.theme.red
                    } else {
                        app.theme.text_bright
                    };
                    vec![Span::styled(msg.text.clone(), Style::default().fg(color).bg(bg))]
                }
                None => Vec::new(),
            };
            let hint = match (app.config.ui.show_key_hints, app.view) {
                (false, _) => "",
                (true, View::Board) => BOARD_HINTS,
                (true, View::Timer) => TIMER_HINTS,
            };
            (left, hint)
        }
        Mode::Adding(stage) => {
            let label = match stage {
                AddStage::Title => "title: ",
                AddStage::Description => "description: ",
            };
            let (before, after) = app.edit_buffer.split_at(app.edit_cursor.min(app.edit_buffer.len()));
            let hint = match stage {
                AddStage::Title => "Enter next  Esc cancel",
                AddStage::Description => "Enter add  Alt+Enter newline  Esc cancel",
            };
            (
                vec![
                    Span::styled(label, Style::default().fg(app.theme.dim).bg(bg)),
                    Span::styled(
                        before.replace('\n', " \u{23CE} "),
                        Style::default().fg(app.theme.text_bright).bg(bg),
                    ),
                    Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)), // ▌ cursor
                    Span::styled(
                        after.replace('\n', " \u{23CE} "),
                        Style::default().fg(app.theme.text_bright).bg(bg),
                    ),
                ],
                hint,
            )
        }
        Mode::ConfirmDelete(id) => {
            let title = app.board.find(id).map_or("", |t| t.title.as_str());
            let prompt = format!("delete \"{}\"?", truncate_to_width(title, width / 2));
            (
                vec![Span::styled(prompt, Style::default().fg(app.theme.red).bg(bg))],
                "y delete  n cancel",
            )
        }
        Mode::PlanReview => (
            vec![Span::styled(
                "apply the suggested order?",
                Style::default().fg(app.theme.text_bright).bg(bg),
            )],
            "y apply  n keep",
        ),
        Mode::Move => {
            let title = app.selected_task().map_or("", |t| t.title.as_str());
            let prompt = format!("moving \"{}\"", truncate_to_width(title, width / 2));
            (
                vec![Span::styled(prompt, Style::default().fg(app.theme.highlight).bg(bg))],
                "j/k place  1-5/Tab section  Enter drop  Esc cancel",
            )
        }
        Mode::Help => (Vec::new(), "? or Esc close"),
    };

    let mut spans = vec![Span::styled(" ", Style::default().bg(bg))];
    spans.extend(left);
    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint) + 1;
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
