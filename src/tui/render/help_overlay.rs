use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, View, store_path};

use super::centered_rect;

const BOARD_KEYS: &[(&str, &str)] = &[
    (" \u{2191}\u{2193}/jk", "Move cursor up/down"),
    (" g/G", "Jump to top/bottom"),
    (" J/K", "Move task down/up"),
    (" m", "Pick up / drop task"),
    (" 1-5", "Set priority A-E"),
    (" Space/Enter", "Toggle done"),
    (" a", "Add task (title, then description)"),
    (" d", "Delete task"),
    (" s", "Ask the assistant for an order"),
];

const TIMER_KEYS: &[(&str, &str)] = &[
    (" Space", "Start / pause"),
    (" r", "Reset timer"),
    (" m", "Switch Pomodoro / two-minute"),
    (" +/-", "Work length"),
    (" ]/[", "Break length"),
    (" c", "Start countdown"),
    (" w", "Start stopwatch"),
    (" x", "Reset focus clock"),
];

const GLOBAL_KEYS: &[(&str, &str)] = &[
    (" Tab", "Switch view"),
    (" t", "Toggle dark/light theme"),
    (" ?", "Toggle this help"),
    (" q", "Quit"),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Key Bindings", header_style)),
        Line::from(""),
    ];

    // Context-sensitive section first
    let (title, keys) = match app.view {
        View::Board => (" Board", BOARD_KEYS),
        View::Timer => (" Timer", TIMER_KEYS),
    };
    lines.push(Line::from(Span::styled(title, header_style)));
    for &(key, desc) in keys {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Global", header_style)));
    for &(key, desc) in GLOBAL_KEYS {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {}", store_path(&app.data_dir).display()),
        Style::default().fg(app.theme.dim).bg(bg),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
