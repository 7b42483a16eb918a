use std::cell::Cell;

use agency_core::{format_time, Banner, Bubble, ChatView, MarkupLine, Role};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::theme::Theme;
use crate::ui::widgets::Spinner;

const BODY_INDENT: &str = "  ";

/// Rows scrolled up from the bottom of the thread. Any new mutation snaps back
/// to the newest message.
#[derive(Debug, Default)]
pub struct ChatScroll {
    offset: u16,
    last_revision: u64,
    max_offset: Cell<u16>,
}

impl ChatScroll {
    /// Returns true when the revision moved and the view jumped to the end.
    pub fn follow(&mut self, revision: u64) -> bool {
        if revision == self.last_revision {
            return false;
        }
        self.last_revision = revision;
        self.offset = 0;
        true
    }

    pub fn up(&mut self, rows: u16) {
        self.offset = self.offset.saturating_add(rows).min(self.max_offset.get());
    }

    pub fn down(&mut self, rows: u16) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn to_end(&mut self) {
        self.offset = 0;
    }

    pub fn offset(&self) -> u16 {
        self.offset
    }

    /// First visible row for `total` rows in a viewport of `height`.
    pub fn top_row(&self, total: u16, height: u16) -> u16 {
        let max_top = total.saturating_sub(height);
        self.max_offset.set(max_top);
        max_top.saturating_sub(self.offset)
    }
}

fn split_at_char(text: &str, n: usize) -> (&str, &str) {
    match text.char_indices().nth(n) {
        Some((i, _)) => text.split_at(i),
        None => (text, ""),
    }
}

/// Word-wrap styled runs into lines of at most `width` columns, each line
/// starting with `indent`. Words longer than a line are split.
pub fn wrap_spans(runs: &[(String, Style)], width: usize, indent: &str) -> Vec<Line<'static>> {
    let fresh = indent.chars().count();
    let width = width.max(fresh + 1);

    let mut lines = Vec::new();
    let mut current = vec![Span::raw(indent.to_string())];
    let mut used = fresh;

    for (text, style) in runs {
        for word in text.split_inclusive(' ') {
            let mut word = word;
            if used + word.chars().count() > width && used > fresh {
                lines.push(Line::from(std::mem::replace(
                    &mut current,
                    vec![Span::raw(indent.to_string())],
                )));
                used = fresh;
                word = word.trim_start();
            }

            while used + word.chars().count() > width {
                let (head, tail) = split_at_char(word, width - used);
                current.push(Span::styled(head.to_string(), *style));
                lines.push(Line::from(std::mem::replace(
                    &mut current,
                    vec![Span::raw(indent.to_string())],
                )));
                used = fresh;
                word = tail;
            }

            if !word.is_empty() {
                used += word.chars().count();
                current.push(Span::styled(word.to_string(), *style));
            }
        }
    }

    lines.push(Line::from(current));
    lines
}

fn markup_runs(line: &MarkupLine, theme: &dyn Theme) -> Vec<(String, Style)> {
    let base = Style::default().fg(theme.foreground());
    let mut runs = Vec::with_capacity(line.spans.len() + 1);
    if line.bullet {
        runs.push(("• ".to_string(), Style::default().fg(theme.accent())));
    }
    for span in &line.spans {
        let style = if span.bold {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        };
        runs.push((span.text.clone(), style));
    }
    runs
}

fn bubble_lines(bubble: &Bubble, width: usize, theme: &dyn Theme) -> Vec<Line<'static>> {
    let (label, color) = match bubble.role {
        Role::User => ("You".to_string(), theme.user_message()),
        Role::Agent => (
            bubble.badge.clone().unwrap_or_else(|| "Agency".to_string()),
            theme.agent_badge(),
        ),
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(
            format_time(bubble.created_at),
            Style::default().fg(theme.foreground_dim()),
        ),
    ])];

    for line in &bubble.lines {
        let indent = if line.bullet { "    " } else { BODY_INDENT };
        lines.extend(wrap_spans(&markup_runs(line, theme), width, indent));
    }
    lines
}

/// All rows of the thread, typing indicator included.
pub fn thread_lines(view: &ChatView, width: usize, theme: &dyn Theme, tick: u64) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for bubble in &view.bubbles {
        lines.extend(bubble_lines(bubble, width, theme));
        lines.push(Line::default());
    }
    if view.typing {
        let spinner = Spinner::typing().with_message("Agent is typing");
        let mut line = spinner.line(theme, tick / 2);
        line.spans.insert(0, Span::raw(BODY_INDENT));
        lines.push(line);
    }
    lines
}

pub struct ChatPanel;

impl ChatPanel {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();
        let banner_height = if app.view.banner.is_some() { 3 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(banner_height),
                Constraint::Length(3),
            ])
            .split(area);

        Self::render_thread(frame, chunks[0], app, theme);
        if let Some(banner) = app.view.banner {
            Self::render_banner(frame, chunks[1], banner, theme);
        }
        Self::render_input(frame, chunks[2], app, theme);
    }

    fn render_thread(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border()))
            .title(Span::styled(
                " Chat ",
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if app.view.bubbles.is_empty() && !app.view.typing {
            let hint = Paragraph::new(Line::from(Span::styled(
                "Say hello to the Orchestrator to get started.",
                Style::default().fg(theme.foreground_dim()),
            )));
            frame.render_widget(hint, inner);
            return;
        }

        let lines = thread_lines(
            &app.view,
            usize::from(inner.width),
            theme,
            app.animation_frame(),
        );
        let total = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let top = app.scroll.top_row(total, inner.height);

        frame.render_widget(Paragraph::new(lines).scroll((top, 0)), inner);
    }

    fn render_banner(frame: &mut Frame, area: Rect, banner: Banner, theme: &dyn Theme) {
        let color = match banner {
            Banner::Remaining(_) => theme.warning(),
            Banner::LimitReached | Banner::WalletRequired => theme.error(),
        };
        let text = Line::from(vec![
            Span::styled(banner.text(), Style::default().fg(color)),
            Span::raw("  "),
            Span::styled(
                format!("[Ctrl+W] {}", banner.action_label()),
                Style::default()
                    .fg(theme.accent())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let paragraph = Paragraph::new(text)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        frame.render_widget(paragraph, area);
    }

    fn render_input(frame: &mut Frame, area: Rect, app: &App, theme: &dyn Theme) {
        let (title, border) = if app.view.typing {
            (" Waiting for reply... ", theme.border())
        } else if !app.can_send {
            (" Connect your wallet to continue ", theme.warning())
        } else {
            (" Message ", theme.accent())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Span::styled(title, Style::default().fg(border)));
        let inner = block.inner(area);

        let width = usize::from(inner.width.max(1));
        let cursor = app.input.cursor();
        let skip = (cursor + 1).saturating_sub(width);
        let visible: String = app.input.text().chars().skip(skip).take(width).collect();

        frame.render_widget(
            Paragraph::new(Span::styled(visible, Style::default().fg(theme.foreground())))
                .block(block),
            area,
        );

        let column = u16::try_from(cursor - skip).unwrap_or(0);
        frame.set_cursor_position(Position::new(inner.x + column, inner.y));
    }
}
