use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Server-owned conversation identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// The backend sends integer ids; accept strings too.
impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => ConversationId::from(n),
            Raw::Text(s) => ConversationId(s),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// A message as persisted by the backend under a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub is_user: bool,
    #[serde(default)]
    pub created_at: String,
}

const LOCATION_BASE: &str = "http://localhost/";

/// Chat page location: `/chat` or `/chat?id=<conversation>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLocation {
    pub conversation: Option<ConversationId>,
}

impl ChatLocation {
    pub const PATH: &'static str = "/chat";

    pub fn narrative() -> Self {
        Self { conversation: None }
    }

    pub fn conversation(id: ConversationId) -> Self {
        Self {
            conversation: Some(id),
        }
    }

    /// Parse a path or URL; only the `id` query parameter is read, percent
    /// decoded.
    pub fn parse(location: &str) -> Self {
        let conversation = Url::parse(LOCATION_BASE)
            .and_then(|base| Url::options().base_url(Some(&base)).parse(location.trim()))
            .ok()
            .and_then(|url| {
                url.query_pairs()
                    .find(|(key, _)| key == "id")
                    .map(|(_, value)| value.trim().to_string())
            })
            .filter(|value| !value.is_empty())
            .map(ConversationId::new);

        Self { conversation }
    }
}

impl std::fmt::Display for ChatLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.conversation {
            Some(id) => {
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("id", id.as_str())
                    .finish();
                write!(f, "{}?{}", Self::PATH, query)
            }
            None => write!(f, "{}", Self::PATH),
        }
    }
}
