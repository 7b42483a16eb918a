use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Submit,
    ConnectWallet,
    ClearChat,
    ToggleTheme,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToEnd,
    DismissToasts,
}

/// Chat-level shortcuts. Everything else goes to the input line.
pub struct Keybinds {
    bindings: Vec<(KeyCode, KeyModifiers, Action)>,
}

impl Keybinds {
    pub fn new() -> Self {
        let ctrl = KeyModifiers::CONTROL;
        let none = KeyModifiers::NONE;
        Self {
            bindings: vec![
                (KeyCode::Char('c'), ctrl, Action::Quit),
                (KeyCode::Char('q'), ctrl, Action::Quit),
                (KeyCode::Esc, none, Action::DismissToasts),
                (KeyCode::Enter, none, Action::Submit),
                (KeyCode::Char('w'), ctrl, Action::ConnectWallet),
                (KeyCode::Char('l'), ctrl, Action::ClearChat),
                (KeyCode::Char('t'), ctrl, Action::ToggleTheme),
                (KeyCode::Up, none, Action::ScrollUp),
                (KeyCode::Down, none, Action::ScrollDown),
                (KeyCode::PageUp, none, Action::PageUp),
                (KeyCode::PageDown, none, Action::PageDown),
                (KeyCode::End, ctrl, Action::ScrollToEnd),
            ],
        }
    }

    pub fn get(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(c, m, _)| *c == code && *m == modifiers)
            .map(|(_, _, action)| *action)
    }

    /// `(key, description)` pairs shown in the footer.
    pub fn hints() -> &'static [(&'static str, &'static str)] {
        &[
            ("Enter", "Send"),
            ("^W", "Connect Wallet"),
            ("^L", "Clear"),
            ("^T", "Theme"),
            ("PgUp/PgDn", "Scroll"),
            ("^C", "Quit"),
        ]
    }
}

impl Default for Keybinds {
    fn default() -> Self {
        Self::new()
    }
}
