use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::events::Keybinds;

pub struct Footer;

impl Footer {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = app.current_theme();

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);

        let keybind_spans: Vec<Span> = Keybinds::hints()
            .iter()
            .flat_map(|(key, desc)| {
                [
                    Span::styled(
                        format!(" {key}"),
                        Style::default()
                            .fg(theme.accent())
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!(":{desc} "),
                        Style::default().fg(theme.foreground_dim()),
                    ),
                ]
            })
            .collect();

        frame.render_widget(
            Paragraph::new(Line::from(keybind_spans)).style(Style::default().bg(theme.surface())),
            chunks[0],
        );

        let status = app.status_message.as_deref().unwrap_or("Ready");
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                status,
                Style::default().fg(theme.foreground_dim()),
            )))
            .alignment(Alignment::Right)
            .style(Style::default().bg(theme.surface())),
            chunks[1],
        );
    }
}
