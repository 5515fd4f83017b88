use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::timer::{ClockKind, TimerMode};
use crate::tui::app::App;

/// History rows shown below the timers
const HISTORY_ROWS: usize = 8;

/// Render the timer view: productivity timer, focus clock, session history
pub fn render_timer_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // mode + big display
            Constraint::Length(1), // progress gauge
            Constraint::Length(2), // settings
            Constraint::Length(2), // focus clock
            Constraint::Min(0),    // history
        ])
        .split(area);

    render_timer(frame, app, chunks[0]);
    render_gauge(frame, app, chunks[1]);
    render_settings(frame, app, chunks[2]);
    render_clock(frame, app, chunks[3]);
    render_history(frame, app, chunks[4]);
}

fn render_timer(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let timer = &app.timer;

    let phase = match timer.mode() {
        TimerMode::Pomodoro if timer.on_break() => "Break",
        TimerMode::Pomodoro => "Work",
        TimerMode::TwoMinute => "Two-minute rule",
    };
    let state = if timer.is_running() { "running" } else { "paused" };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {} ", timer.mode().label()),
                Style::default()
                    .fg(theme.highlight)
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("\u{00B7} {}", phase), Style::default().fg(theme.text).bg(bg)),
        ]),
        Line::from(Span::styled(
            format!(" {}", timer.display()),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!(" {}  sessions: {}", state, timer.sessions()),
            Style::default().fg(theme.dim).bg(bg),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn render_gauge(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let inner = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(theme.highlight).bg(theme.selection_bg))
        .percent(app.timer.progress().min(100))
        .label(format!("{}%", app.timer.progress().min(100)));
    frame.render_widget(gauge, inner);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let line = Line::from(Span::styled(
        format!(
            " work {}m  break {}m",
            app.timer.work_minutes(),
            app.timer.break_minutes()
        ),
        Style::default().fg(theme.text).bg(bg),
    ));
    frame.render_widget(
        Paragraph::new(vec![Line::from(""), line]).style(Style::default().bg(bg)),
        area,
    );
}

fn render_clock(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let clock = &app.clock;
    let kind = match clock.kind() {
        ClockKind::Countdown => "countdown",
        ClockKind::Stopwatch => "stopwatch",
    };
    let state = if clock.is_running() { "running" } else { "stopped" };
    let line = Line::from(vec![
        Span::styled(" Focus clock ", Style::default().fg(theme.dim).bg(bg)),
        Span::styled(
            clock.display(),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {} {}", kind, state), Style::default().fg(theme.dim).bg(bg)),
    ]);
    frame.render_widget(
        Paragraph::new(vec![Line::from(""), line]).style(Style::default().bg(bg)),
        area,
    );
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let block = Block::default()
        .borders(Borders::TOP)
        .title(" History ")
        .border_style(Style::default().fg(theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let history = app.timer.history();
    let lines: Vec<Line> = if history.is_empty() {
        vec![Line::from(Span::styled(
            " no completed sessions yet",
            Style::default().fg(theme.dim).bg(bg),
        ))]
    } else {
        history
            .iter()
            .take(HISTORY_ROWS)
            .map(|entry| {
                Line::from(Span::styled(
                    format!(" {}", entry.label()),
                    Style::default().fg(theme.text).bg(bg),
                ))
            })
            .collect()
    };

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
