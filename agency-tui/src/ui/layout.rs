use ratatui::{
    layout::{Constraint, Direction, Layout, Margin},
    style::Style,
    widgets::Block,
    Frame,
};

use crate::app::App;
use crate::ui::chat::ChatPanel;
use crate::ui::widgets::{Footer, Header};

pub struct MainLayout;

impl MainLayout {
    pub fn render(frame: &mut Frame, app: &App) {
        let theme = app.current_theme();
        let size = frame.area();

        frame.render_widget(
            Block::default().style(
                Style::default()
                    .bg(theme.background())
                    .fg(theme.foreground()),
            ),
            size,
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(size);

        Header::render(frame, chunks[0], app);
        ChatPanel::render(frame, chunks[1].inner(Margin::new(1, 0)), app);
        Footer::render(frame, chunks[2], app);

        app.toast_manager.render(frame, size, theme);
    }
}
