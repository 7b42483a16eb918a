use agency_core::{short_address, ChatRoute};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Header;

impl Header {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(28),
                Constraint::Min(20),
                Constraint::Length(30),
            ])
            .split(area);

        let logo = Paragraph::new(Line::from(vec![
            Span::styled("◆ ", Style::default().fg(theme.accent())),
            Span::styled(
                "Agency ",
                Style::default()
                    .fg(theme.foreground())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("v{}", VERSION),
                Style::default().fg(theme.foreground_dim()),
            ),
        ]))
        .style(Style::default().bg(theme.background()));
        frame.render_widget(logo, chunks[0]);

        let location = match &app.route {
            ChatRoute::Narrative => "Solopreneur AI Agency".to_string(),
            ChatRoute::Conversation(id) => format!("Conversation #{}", id),
        };
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                location,
                Style::default()
                    .fg(theme.accent_secondary())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", app.base_url),
                Style::default().fg(theme.foreground_dim()),
            ),
        ]))
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.background()));
        frame.render_widget(title, chunks[1]);

        let wallet = match (&app.user_address, app.free_messages_remaining) {
            (Some(address), _) => Span::styled(
                format!("● {}", short_address(address)),
                Style::default().fg(theme.success()),
            ),
            (None, Some(n)) => Span::styled(
                format!("○ {} free left", n),
                Style::default().fg(theme.warning()),
            ),
            (None, None) => Span::styled(
                "○ Wallet not connected",
                Style::default().fg(theme.foreground_dim()),
            ),
        };
        let status = Paragraph::new(Line::from(wallet))
            .alignment(Alignment::Right)
            .style(Style::default().bg(theme.background()));
        frame.render_widget(status, chunks[2]);
    }
}
