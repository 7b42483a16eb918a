mod colors;
mod nord;
mod tokyo_night;

pub use colors::hex_to_color;
pub use nord::NORD;
pub use tokyo_night::TOKYO_NIGHT;

use ratatui::style::Color;

pub trait Theme: Send + Sync {
    fn name(&self) -> &'static str;

    fn background(&self) -> Color;
    fn foreground(&self) -> Color;
    fn foreground_dim(&self) -> Color;

    fn surface(&self) -> Color;
    fn border(&self) -> Color;

    fn accent(&self) -> Color;
    fn accent_secondary(&self) -> Color;

    fn success(&self) -> Color;
    fn warning(&self) -> Color;
    fn error(&self) -> Color;
    fn info(&self) -> Color;

    /// Header color of the user's own messages.
    fn user_message(&self) -> Color {
        self.success()
    }

    /// Header color of agent badges.
    fn agent_badge(&self) -> Color {
        self.accent_secondary()
    }
}

/// A theme described by hex colors.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub name: &'static str,
    pub background: u32,
    pub foreground: u32,
    pub foreground_dim: u32,
    pub surface: u32,
    pub border: u32,
    pub accent: u32,
    pub accent_secondary: u32,
    pub success: u32,
    pub warning: u32,
    pub error: u32,
    pub info: u32,
}

impl Theme for Palette {
    fn name(&self) -> &'static str {
        self.name
    }

    fn background(&self) -> Color {
        hex_to_color(self.background)
    }

    fn foreground(&self) -> Color {
        hex_to_color(self.foreground)
    }

    fn foreground_dim(&self) -> Color {
        hex_to_color(self.foreground_dim)
    }

    fn surface(&self) -> Color {
        hex_to_color(self.surface)
    }

    fn border(&self) -> Color {
        hex_to_color(self.border)
    }

    fn accent(&self) -> Color {
        hex_to_color(self.accent)
    }

    fn accent_secondary(&self) -> Color {
        hex_to_color(self.accent_secondary)
    }

    fn success(&self) -> Color {
        hex_to_color(self.success)
    }

    fn warning(&self) -> Color {
        hex_to_color(self.warning)
    }

    fn error(&self) -> Color {
        hex_to_color(self.error)
    }

    fn info(&self) -> Color {
        hex_to_color(self.info)
    }
}

pub struct ThemeManager {
    themes: Vec<Palette>,
    current_index: usize,
}

impl ThemeManager {
    pub fn new() -> Self {
        Self {
            themes: vec![TOKYO_NIGHT, NORD],
            current_index: 0,
        }
    }

    /// Start on the named theme, falling back to the first one.
    pub fn with_theme(name: &str) -> Self {
        let mut manager = Self::new();
        if !manager.set_theme_by_name(name) {
            tracing::warn!(theme = name, "Unknown theme, using {}", manager.current_theme_name());
        }
        manager
    }

    pub fn current_theme(&self) -> &dyn Theme {
        &self.themes[self.current_index]
    }

    pub fn cycle_theme(&mut self) {
        self.current_index = (self.current_index + 1) % self.themes.len();
    }

    pub fn set_theme_by_name(&mut self, name: &str) -> bool {
        match self
            .themes
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
        {
            Some(index) => {
                self.current_index = index;
                true
            }
            None => false,
        }
    }

    pub fn available_themes(&self) -> Vec<&'static str> {
        self.themes.iter().map(|t| t.name).collect()
    }

    pub fn current_theme_name(&self) -> &'static str {
        self.current_theme().name()
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}
