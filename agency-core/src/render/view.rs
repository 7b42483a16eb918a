use chrono::{DateTime, Utc};

use crate::models::{MessageId, Role, SessionState};

use super::format::{format_agent_name, format_message, parse_markup, MarkupLine};

pub const CONNECT_ACTION_LABEL: &str = "Connect with MetaMask";

const LOW_COUNTER_THRESHOLD: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub id: MessageId,
    pub role: Role,
    /// Agent badge; absent for user messages and unlabelled agent messages.
    pub badge: Option<String>,
    pub text: String,
    pub lines: Vec<MarkupLine>,
    pub created_at: DateTime<Utc>,
}

impl Bubble {
    pub fn html(&self) -> String {
        format_message(&self.text)
    }
}

/// Inline warning offering the wallet-connect action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    /// One or two free messages left.
    Remaining(u32),
    /// Counter reached zero.
    LimitReached,
    /// The backend refused a send until a wallet connects.
    WalletRequired,
}

impl Banner {
    pub fn text(&self) -> String {
        match self {
            Banner::Remaining(n) => format!(
                "You have {} free {} remaining. {} for unlimited access.",
                n,
                if *n == 1 { "message" } else { "messages" },
                CONNECT_ACTION_LABEL
            ),
            Banner::LimitReached => format!(
                "You've reached the free message limit. {} to continue.",
                CONNECT_ACTION_LABEL
            ),
            Banner::WalletRequired => {
                "Free message limit reached. Please connect with MetaMask to continue.".to_string()
            }
        }
    }

    pub fn action_label(&self) -> &'static str {
        CONNECT_ACTION_LABEL
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatView {
    pub bubbles: Vec<Bubble>,
    pub typing: bool,
    pub banner: Option<Banner>,
    pub input_enabled: bool,
    pub revision: u64,
}

fn banner_for(state: &SessionState) -> Option<Banner> {
    if state.require_wallet {
        return Some(Banner::WalletRequired);
    }
    if state.is_authenticated {
        return None;
    }
    match state.free_messages_remaining {
        Some(0) => Some(Banner::LimitReached),
        Some(n) if n <= LOW_COUNTER_THRESHOLD => Some(Banner::Remaining(n)),
        _ => None,
    }
}

/// Project session state into drawable items. Pure: same state, same view.
pub fn project(state: &SessionState) -> ChatView {
    let bubbles = state
        .messages
        .iter()
        .map(|m| Bubble {
            id: m.id,
            role: m.role,
            badge: match m.role {
                Role::User => None,
                Role::Agent => m.agent.as_deref().map(|a| format_agent_name(Some(a))),
            },
            text: m.text.clone(),
            lines: parse_markup(&m.text),
            created_at: m.created_at,
        })
        .collect();

    ChatView {
        bubbles,
        typing: state.is_typing,
        banner: banner_for(state),
        input_enabled: !state.is_typing && !state.require_wallet && !state.is_exhausted(),
        revision: state.revision,
    }
}
