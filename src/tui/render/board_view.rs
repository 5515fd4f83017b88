use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::model::{Priority, Task};
use crate::ops::bucket;
use crate::tui::app::App;
use crate::tui::theme::Theme;
use crate::util::markdown::{self, MdLine, RunStyle};
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Below this width the description pane is hidden
const SPLIT_MIN_WIDTH: u16 = 70;

/// One row of the board list
#[derive(Debug, Clone, Copy, PartialEq)]
enum Row<'a> {
    Header(Priority, usize),
    Empty,
    /// `index` is the position in the visual order
    Task { index: usize, task: &'a Task },
}

fn build_rows(tasks: &[Task], bucketed: bool) -> Vec<Row<'_>> {
    if !bucketed {
        return tasks
            .iter()
            .enumerate()
            .map(|(index, task)| Row::Task { index, task })
            .collect();
    }
    let mut rows = Vec::new();
    let mut index = 0;
    for (priority, group) in bucket::bucket(tasks) {
        rows.push(Row::Header(priority, group.len()));
        if group.is_empty() {
            rows.push(Row::Empty);
        }
        for task in group {
            rows.push(Row::Task { index, task });
            index += 1;
        }
    }
    rows
}

/// Render the board: task list on the left, selected task's description on
/// the right when there is room.
pub fn render_board_view(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.board.is_empty() {
        let empty = Paragraph::new(" No tasks. Press a to add one.")
            .style(Style::default().fg(app.theme.dim).bg(app.theme.background));
        frame.render_widget(empty, area);
        return;
    }

    let (list_area, detail_area) = if area.width >= SPLIT_MIN_WIDTH {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    render_list(frame, app, list_area);
    if let Some(detail_area) = detail_area {
        render_detail(frame, app, detail_area);
    }
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let width = area.width as usize;
    let visible_height = area.height as usize;
    // while a task is carried, show where it would land
    let preview = app.move_preview();
    let carried = app.move_state.map(|m| m.id);
    let tasks = preview.as_deref().unwrap_or(app.board.tasks());
    let rows = build_rows(tasks, app.board.config().bucketing);

    // Keep the cursor row on screen
    let cursor_row = rows
        .iter()
        .position(|r| matches!(r, Row::Task { index, .. } if *index == app.cursor))
        .unwrap_or(0);
    if cursor_row < app.scroll {
        // Show the bucket header above the first task when scrolling up
        app.scroll = match rows.get(cursor_row.saturating_sub(1)) {
            Some(Row::Header(..)) => cursor_row.saturating_sub(1),
            _ => cursor_row,
        };
    } else if visible_height > 0 && cursor_row >= app.scroll + visible_height {
        app.scroll = cursor_row + 1 - visible_height;
    }
    let scroll = app.scroll.min(rows.len().saturating_sub(1));

    let end = rows.len().min(scroll + visible_height);
    let lines: Vec<Line> = rows[scroll..end]
        .iter()
        .map(|row| match *row {
            Row::Header(priority, count) => Line::from(vec![
                Span::styled(
                    format!(" {} ", priority),
                    Style::default()
                        .fg(theme.bucket_color(priority))
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("({})", count), Style::default().fg(theme.dim).bg(bg)),
            ]),
            Row::Empty => Line::from(Span::styled(
                "     (empty)",
                Style::default().fg(theme.dim).bg(bg),
            )),
            Row::Task { index, task } => task_line(
                theme,
                task,
                index,
                index == app.cursor,
                carried == Some(task.id),
                width,
            ),
        })
        .collect();

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn task_line<'a>(
    theme: &Theme,
    task: &Task,
    index: usize,
    is_cursor: bool,
    carried: bool,
    width: usize,
) -> Line<'a> {
    let row_bg = if is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let number = if carried {
        format!(" {:>2}\u{25B8} ", index + 1) // ▸
    } else {
        format!(" {:>2}. ", index + 1)
    };
    let check = if task.completed { "[x] " } else { "[ ] " };
    let more = if task.has_description() { " +" } else { "" };

    let mut title_style = Style::default().fg(theme.text).bg(row_bg);
    if task.completed {
        title_style = title_style.fg(theme.dim).add_modifier(Modifier::CROSSED_OUT);
    }
    if is_cursor {
        title_style = title_style.add_modifier(Modifier::BOLD);
    }
    if carried {
        title_style = title_style.fg(theme.highlight);
    }
    let check_color = if task.completed {
        theme.green
    } else {
        theme.text
    };

    let fixed = display_width(&number) + display_width(check) + display_width(more);
    let title = truncate_to_width(&task.title, width.saturating_sub(fixed));
    let used = fixed + display_width(&title);

    Line::from(vec![
        Span::styled(number, Style::default().fg(theme.dim).bg(row_bg)),
        Span::styled(check, Style::default().fg(check_color).bg(row_bg)),
        Span::styled(title, title_style),
        Span::styled(more, Style::default().fg(theme.dim).bg(row_bg)),
        Span::styled(
            pad_to_width("", width.saturating_sub(used)),
            Style::default().bg(row_bg),
        ),
    ])
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let Some(task) = app.selected_task() else {
        frame.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            format!(" {}", task.title),
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(meta_line(task), Style::default().fg(theme.dim).bg(bg))),
        Line::from(""),
    ];

    if !task.has_description() {
        lines.push(Line::from(Span::styled(
            " no description",
            Style::default().fg(theme.dim).bg(bg),
        )));
    } else if app.board.config().markdown_descriptions {
        lines.extend(
            markdown::render(&task.description)
                .iter()
                .map(|l| md_line(theme, l)),
        );
    } else {
        lines.extend(task.description.lines().map(|l| {
            Line::from(Span::styled(
                format!(" {}", l),
                Style::default().fg(theme.text).bg(bg),
            ))
        }));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

fn meta_line(task: &Task) -> String {
    let mut parts = vec![format!("priority {}", task.effective_priority())];
    if task.completed {
        parts.push("done".to_string());
    }
    if let Some(created) = task.created_at {
        parts.push(format!("added {}", created.format("%Y-%m-%d")));
    }
    format!(" {}", parts.join("  "))
}

/// Map a rendered markdown line onto ratatui spans
fn md_line<'a>(theme: &Theme, line: &MdLine) -> Line<'a> {
    let mut spans = vec![Span::styled(" ", Style::default().bg(theme.background))];
    spans.extend(
        line.runs
            .iter()
            .map(|run| Span::styled(run.text.clone(), run_style(theme, run.style))),
    );
    Line::from(spans)
}

fn run_style(theme: &Theme, style: RunStyle) -> Style {
    let mut s = Style::default().fg(theme.text).bg(theme.background);
    if style.heading {
        s = s.fg(theme.text_bright).add_modifier(Modifier::BOLD);
    }
    if style.bold {
        s = s.add_modifier(Modifier::BOLD);
    }
    if style.italic {
        s = s.add_modifier(Modifier::ITALIC);
    }
    if style.strike {
        s = s.add_modifier(Modifier::CROSSED_OUT);
    }
    if style.code {
        s = s.fg(theme.highlight);
    }
    if style.link {
        s = s.add_modifier(Modifier::UNDERLINED);
    }
    if style.quote {
        s = s.fg(theme.dim);
    }
    s
}
