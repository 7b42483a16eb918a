use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

const MAX_WIDTH: u16 = 60;
const MAX_MESSAGE_LINES: u16 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Info => "ℹ",
            ToastLevel::Success => "✓",
            ToastLevel::Warning => "⚠",
            ToastLevel::Error => "✗",
        }
    }

    fn color(&self, theme: &dyn Theme) -> ratatui::style::Color {
        match self {
            ToastLevel::Info => theme.info(),
            ToastLevel::Success => theme.success(),
            ToastLevel::Warning => theme.warning(),
            ToastLevel::Error => theme.error(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub created_at: Instant,
    pub duration: Duration,
    id: u64,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: ToastLevel) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let duration = match level {
            ToastLevel::Info | ToastLevel::Success => Duration::from_secs(4),
            ToastLevel::Warning | ToastLevel::Error => Duration::from_secs(8),
        };

        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
            id: COUNTER.fetch_add(1, Ordering::SeqCst),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Info)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Success)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, ToastLevel::Error)
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Fraction of the lifetime left, 1.0 when fresh.
    pub fn progress(&self) -> f32 {
        let elapsed = self.created_at.elapsed().as_secs_f32();
        let total = self.duration.as_secs_f32();
        1.0 - (elapsed / total).clamp(0.0, 1.0)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Rows needed for the message at `width` columns, capped.
    fn message_lines(&self, width: u16) -> u16 {
        let width = usize::from(width.max(1));
        let chars = self.message.chars().count() + 2;
        (chars.div_ceil(width) as u16).clamp(1, MAX_MESSAGE_LINES)
    }
}

#[derive(Debug)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    max_visible: usize,
}

impl ToastManager {
    pub fn new() -> Self {
        Self {
            toasts: Vec::new(),
            max_visible: 4,
        }
    }

    pub fn push(&mut self, toast: Toast) {
        self.toasts.push(toast);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Toast::info(message));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Toast::success(message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Toast::warning(message));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Toast::error(message));
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn cleanup(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn visible_toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().rev().take(self.max_visible)
    }

    pub fn count(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn render(&self, frame: &mut Frame, screen_area: Rect, theme: &dyn Theme) {
        let toast_width = MAX_WIDTH.min(screen_area.width.saturating_sub(4));
        let margin = 2u16;
        let start_x = screen_area.width.saturating_sub(toast_width + margin);
        let mut start_y = margin + 3;

        for toast in self.visible_toasts() {
            let height = toast.message_lines(toast_width.saturating_sub(2)) + 3;
            if start_y + height > screen_area.height {
                break;
            }

            let area = Rect::new(start_x, start_y, toast_width, height);
            Self::render_toast(frame, area, toast, theme);
            start_y += height + 1;
        }
    }

    fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast, theme: &dyn Theme) {
        frame.render_widget(Clear, area);

        let color = toast.level.color(theme);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .style(Style::default().bg(theme.surface()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let progress_width = ((inner.width as f32) * toast.progress()) as u16;
        if progress_width > 0 {
            let progress_area = Rect::new(
                inner.x,
                inner.y + inner.height.saturating_sub(1),
                progress_width,
                1,
            );
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "─".repeat(progress_width as usize),
                    Style::default().fg(color),
                )),
                progress_area,
            );
        }

        let msg_area = Rect::new(
            inner.x,
            inner.y,
            inner.width,
            inner.height.saturating_sub(1),
        );
        let content = Line::from(vec![
            Span::styled(
                format!("{} ", toast.level.icon()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(toast.message.clone(), Style::default().fg(theme.foreground())),
        ]);
        frame.render_widget(
            Paragraph::new(content).wrap(Wrap { trim: true }),
            msg_area,
        );
    }
}

impl Default for ToastManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_levels() {
        assert_eq!(ToastLevel::Info.icon(), "ℹ");
        assert_eq!(ToastLevel::Warning.icon(), "⚠");
        assert_eq!(ToastLevel::Error.icon(), "✗");
    }

    #[test]
    fn test_problems_stay_longer() {
        assert!(Toast::error("x").duration > Toast::info("x").duration);
        assert!(!Toast::warning("x").is_expired());
    }

    #[test]
    fn test_message_lines() {
        let toast = Toast::info("a".repeat(30));
        assert_eq!(toast.message_lines(58), 1);
        assert_eq!(toast.message_lines(16), 2);
        assert_eq!(Toast::info("a".repeat(500)).message_lines(10), MAX_MESSAGE_LINES);
    }

    #[test]
    fn test_toast_manager_cleanup() {
        let mut manager = ToastManager::new();
        manager.push(Toast::info("gone").with_duration(Duration::from_millis(1)));
        manager.warning("stays");

        std::thread::sleep(Duration::from_millis(10));
        manager.cleanup();

        assert_eq!(manager.count(), 1);
        assert_eq!(
            manager.visible_toasts().next().map(|t| t.message.as_str()),
            Some("stays")
        );
    }

    #[test]
    fn test_unique_toast_ids() {
        assert_ne!(Toast::info("a").id(), Toast::info("b").id());
    }
}
