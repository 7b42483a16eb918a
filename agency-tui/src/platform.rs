use agency_core::{default_user_agent, Platform};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Something the wallet connector wants the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
    /// Wallet app deep link.
    OpenApp(String),
    /// Wallet download page.
    Install(String),
}

/// Platform seam for the terminal: connector callbacks become [`Notice`]s
/// that the UI loop drains into toasts.
pub struct TuiPlatform {
    user_agent: String,
    notices: UnboundedSender<Notice>,
}

impl TuiPlatform {
    pub fn new(user_agent: &str) -> (Self, UnboundedReceiver<Notice>) {
        let (tx, rx) = unbounded_channel();
        let user_agent = if user_agent.is_empty() {
            default_user_agent("agency-tui")
        } else {
            user_agent.to_string()
        };
        (
            Self {
                user_agent,
                notices: tx,
            },
            rx,
        )
    }

    fn send(&self, notice: Notice) {
        if self.notices.send(notice).is_err() {
            tracing::debug!("Notice dropped, UI is gone");
        }
    }
}

impl Platform for TuiPlatform {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn navigate(&self, url: &str) {
        self.send(Notice::OpenApp(url.to_string()));
    }

    fn open_new_context(&self, url: &str) {
        self.send(Notice::Install(url.to_string()));
    }

    fn alert(&self, message: &str) {
        self.send(Notice::Alert(message.to_string()));
    }
}
