use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::Theme;

/// Animated placeholder shown while a reply is outstanding.
pub struct Spinner {
    frames: &'static [&'static str],
    message: Option<String>,
}

impl Spinner {
    pub fn new() -> Self {
        Self {
            frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            message: None,
        }
    }

    /// Three bouncing dots, the chat "typing" indicator.
    pub fn typing() -> Self {
        Self {
            frames: &["●∙∙", "∙●∙", "∙∙●", "∙●∙"],
            message: None,
        }
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    pub fn frame(&self, tick: u64) -> &'static str {
        self.frames[(tick as usize) % self.frames.len()]
    }

    pub fn line(&self, theme: &dyn Theme, tick: u64) -> Line<'static> {
        let mut spans = vec![Span::styled(
            self.frame(tick),
            Style::default()
                .fg(theme.accent())
                .add_modifier(Modifier::BOLD),
        )];
        if let Some(msg) = &self.message {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                msg.clone(),
                Style::default()
                    .fg(theme.foreground_dim())
                    .add_modifier(Modifier::ITALIC),
            ));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &dyn Theme, tick: u64) {
        frame.render_widget(Paragraph::new(self.line(theme, tick)), area);
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}
