use serde::{Deserialize, Serialize};

use super::message::{Message, Role};

/// Everything one open chat view knows about its exchange with the agency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub messages: Vec<Message>,
    pub is_typing: bool,
    pub is_authenticated: bool,
    pub user_address: Option<String>,
    pub free_messages_remaining: Option<u32>,
    pub require_wallet: bool,
    /// Bumped on every mutation; renderers scroll to the end when it changes.
    pub revision: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// True when a free-tier user has run out of messages.
    pub fn is_exhausted(&self) -> bool {
        !self.is_authenticated && self.free_messages_remaining == Some(0)
    }
}
