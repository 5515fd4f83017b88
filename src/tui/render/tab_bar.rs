use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, View};
use crate::util::unicode::display_width;

/// Render the tab bar (top row + separator)
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = vec![Span::styled(
        " pomo ",
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    for (view, label) in [(View::Board, "Board"), (View::Timer, "Timer")] {
        let style = if app.view == view {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.push(Span::styled(format!(" {} ", label), style));
    }

    // Right side: task counts and a running timer
    let done = app.board.tasks().iter().filter(|t| t.completed).count();
    let open = app.board.len() - done;
    let mut right = format!("{} open  {} done", open, done);
    if app.timer.is_running() {
        right.push_str(&format!("  \u{25CF} {}", app.timer.display()));
    }
    if app.gate.is_pending() {
        right.push_str("  suggesting\u{2026}");
    }
    right.push(' ');

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let right_width = display_width(&right);
    if used + right_width < width {
        spans.push(Span::styled(
            " ".repeat(width - used - right_width),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(right, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let separator = Line::from(Span::styled(
        "\u{2500}".repeat(width),
        Style::default().fg(app.theme.dim).bg(bg),
    ));
    let paragraph = Paragraph::new(vec![Line::from(spans), separator]).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
