//! Markdown descriptions rendered for a character terminal.
//!
//! Output is a list of lines made of styled runs; the TUI maps the styles to
//! ratatui modifiers and the CLI prints the plain text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub code: bool,
    pub link: bool,
    pub heading: bool,
    pub quote: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub style: RunStyle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdLine {
    pub runs: Vec<Run>,
}

impl MdLine {
    pub fn plain(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn is_empty(&self) -> bool {
        self.runs.iter().all(|r| r.text.is_empty())
    }
}

struct LineBuilder {
    lines: Vec<MdLine>,
    current: MdLine,
    style: RunStyle,
    /// `None` for bullet lists, `Some(next number)` for ordered ones
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
}

impl LineBuilder {
    fn new() -> Self {
        LineBuilder {
            lines: Vec::new(),
            current: MdLine::default(),
            style: RunStyle::default(),
            lists: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn push(&mut self, text: &str, style: RunStyle) {
        if self.current.runs.is_empty() && self.quote_depth > 0 {
            let bar = "│ ".repeat(self.quote_depth);
            self.current.runs.push(Run {
                text: bar,
                style: RunStyle {
                    quote: true,
                    ..RunStyle::default()
                },
            });
        }
        match self.current.runs.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.current.runs.push(Run {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn text(&mut self, text: &str) {
        let style = self.style;
        self.push(text, style);
    }

    fn break_line(&mut self) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(line);
    }

    /// Finish the current line if it has content.
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.break_line();
        }
    }

    /// Blank separator between blocks, never doubled and never leading.
    fn gap(&mut self) {
        self.flush();
        if self.lists.is_empty() && self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(MdLine::default());
        }
    }

    fn finish(mut self) -> Vec<MdLine> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Render `source` to terminal lines.
pub fn render(source: &str) -> Vec<MdLine> {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let mut b = LineBuilder::new();

    for event in Parser::new_ext(source, options) {
        match event {
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => b.gap(),
            Event::Start(Tag::Heading { .. }) => {
                b.gap();
                b.style.heading = true;
                b.style.bold = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                b.style.heading = false;
                b.style.bold = false;
                b.gap();
            }
            Event::Start(Tag::Emphasis) => b.style.italic = true,
            Event::End(TagEnd::Emphasis) => b.style.italic = false,
            Event::Start(Tag::Strong) => b.style.bold = true,
            Event::End(TagEnd::Strong) => b.style.bold = false,
            Event::Start(Tag::Strikethrough) => b.style.strike = true,
            Event::End(TagEnd::Strikethrough) => b.style.strike = false,
            Event::Start(Tag::Link { .. }) => b.style.link = true,
            Event::End(TagEnd::Link) => b.style.link = false,
            Event::Start(Tag::BlockQuote(_)) => {
                b.gap();
                b.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                b.flush();
                b.quote_depth = b.quote_depth.saturating_sub(1);
                b.gap();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                b.gap();
                b.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                b.in_code_block = false;
                b.gap();
            }
            Event::Start(Tag::List(start)) => {
                b.flush();
                b.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                b.flush();
                b.lists.pop();
                b.gap();
            }
            Event::Start(Tag::Item) => {
                b.flush();
                let indent = "  ".repeat(b.lists.len().saturating_sub(1));
                let marker = match b.lists.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{}{}. ", indent, n);
                        *n += 1;
                        m
                    }
                    _ => format!("{}• ", indent),
                };
                b.push(&marker, RunStyle::default());
            }
            Event::End(TagEnd::Item) => b.flush(),
            Event::TaskListMarker(done) => {
                b.push(if done { "[x] " } else { "[ ] " }, RunStyle::default());
            }
            Event::Text(text) if b.in_code_block => {
                let style = RunStyle {
                    code: true,
                    ..RunStyle::default()
                };
                for (i, line) in text.split('\n').enumerate() {
                    if i > 0 {
                        b.break_line();
                    }
                    if !line.is_empty() {
                        b.push(&format!("  {}", line), style);
                    }
                }
            }
            Event::Text(text) => b.text(&text),
            Event::Code(code) => {
                let style = RunStyle {
                    code: true,
                    ..b.style
                };
                b.push(&code, style);
            }
            Event::SoftBreak => b.text(" "),
            Event::HardBreak => b.break_line(),
            Event::Rule => {
                b.gap();
                b.push("────────", RunStyle::default());
                b.gap();
            }
            Event::Html(html) | Event::InlineHtml(html) => b.text(&html),
            _ => {}
        }
    }
    b.finish()
}

/// Plain text lines, markup removed
pub fn render_plain(source: &str) -> Vec<String> {
    render(source).iter().map(MdLine::plain).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_are_separated_by_one_blank_line() {
        let lines = render_plain("First para\ncontinues.\n\nSecond.");
        assert_eq!(lines, vec!["First para continues.", "", "Second."]);
    }

    #[test]
    fn emphasis_becomes_styles() {
        let lines = render("Ship **now** or *later* with `cargo`");
        let runs = &lines[0].runs;
        assert_eq!(runs[0].text, "Ship ");
        assert_eq!(runs[1].text, "now");
        assert!(runs[1].style.bold);
        assert!(runs[3].style.italic);
        assert!(runs[5].style.code);
        assert_eq!(lines[0].plain(), "Ship now or later with cargo");
    }

    #[test]
    fn lists_get_markers() {
        let lines = render_plain("- milk\n- eggs\n  1. brown\n  2. white\n- [x] bread");
        insta::assert_snapshot!(lines.join("|"), @"• milk|• eggs|  1. brown|  2. white|• [x] bread");
    }

    #[test]
    fn headings_are_bold() {
        let lines = render("# Notes\nbody");
        assert!(lines[0].runs[0].style.heading);
        assert!(lines[0].runs[0].style.bold);
        assert_eq!(render_plain("# Notes\nbody"), vec!["Notes", "", "body"]);
    }

    #[test]
    fn code_blocks_are_indented() {
        let lines = render_plain("```\nlet x = 1;\n```");
        assert_eq!(lines, vec!["  let x = 1;"]);
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(render("").is_empty());
    }
}
