use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;
use crate::util::unicode::truncate_to_width;

use super::centered_rect;

/// Popup listing a suggested order while it waits for y/n
pub fn render_plan_popup(frame: &mut Frame, app: &App, area: Rect) {
    let Some(plan) = &app.pending_plan else {
        return;
    };
    let popup = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup);

    let theme = &app.theme;
    let bg = theme.background;
    let inner_width = popup.width.saturating_sub(2) as usize;

    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                " {} of {} placed by the assistant",
                plan.matched,
                plan.order.len()
            ),
            Style::default().fg(theme.dim).bg(bg),
        )),
        Line::from(""),
    ];
    let preview = app.board.preview_order(&plan.order);
    let bucketed = app.board.config().bucketing;
    for (i, id) in plan.order.iter().enumerate() {
        let Some(task) = preview.iter().find(|t| t.id == *id) else {
            continue;
        };
        let placed = i < plan.matched;
        let tail = if placed { "" } else { "  (unplaced)" };
        let text = if bucketed {
            format!(" {:>2}. {} {}", i + 1, task.effective_priority(), task.title)
        } else {
            format!(" {:>2}. {}", i + 1, task.title)
        };
        let style = if placed {
            Style::default().fg(theme.text).bg(bg)
        } else {
            Style::default().fg(theme.dim).bg(bg)
        };
        lines.push(Line::from(vec![
            Span::styled(
                truncate_to_width(&text, inner_width.saturating_sub(tail.len())),
                style,
            ),
            Span::styled(tail, Style::default().fg(theme.dim).bg(bg)),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " Suggested order ",
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::suggest;
    use crate::tui::app::Mode;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn lists_plan_with_unplaced_tasks() {
        let (_dir, mut app) = app_with_tasks(&["Write report", "Buy milk", "Call mom"]);
        let plan = suggest::plan_from_text(
            app.board.tasks(),
            "Recommended order:\n1. Call mom\n2. Buy milk\n",
        )
        .unwrap();
        app.pending_plan = Some(plan);
        app.mode = Mode::PlanReview;
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_plan_popup(frame, &app, area);
        });
        assert!(output.contains("Suggested order"));
        assert!(output.contains("2 of 3 placed by the assistant"));
        assert!(output.contains("1. C Call mom"));
        assert!(output.contains("2. C Buy milk"));
        assert!(output.contains("3. C Write report  (unplaced)"));
    }

    #[test]
    fn nothing_without_plan() {
        let (_dir, app) = app_with_tasks(&["Write report"]);
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_plan_popup(frame, &app, area);
        });
        assert_eq!(output, "");
    }
}
