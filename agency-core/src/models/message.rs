use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// Milliseconds since the epoch, unique within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out timestamp-derived ids, bumping past the previous one when two
/// messages land in the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct MessageIdGen {
    last: u64,
}

impl MessageIdGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> MessageId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        self.last = now.max(self.last + 1);
        MessageId(self.last)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub agent: Option<String>,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            agent: None,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn agent(id: MessageId, agent: Option<String>, text: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Agent,
            agent,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}
