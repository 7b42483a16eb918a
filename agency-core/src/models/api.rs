//! Wire shapes of the agency backend.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`: either a greeting request or a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ChatRequest {
    pub fn greeting(address: Option<&str>) -> Self {
        Self {
            start: Some(true),
            user_message: None,
            address: address.map(str::to_string),
        }
    }

    pub fn message(text: &str, address: Option<&str>) -> Self {
        Self {
            start: None,
            user_message: Some(text.to_string()),
            address: address.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    #[serde(default)]
    pub agent: Option<String>,
    /// Absent or null for authenticated users.
    #[serde(default)]
    pub free_messages_remaining: Option<i64>,
}

impl ChatReply {
    pub fn remaining(&self) -> Option<u32> {
        self.free_messages_remaining
            .map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
    }
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub require_metamask: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_body() {
        let body = serde_json::to_value(ChatRequest::greeting(None)).unwrap();
        assert_eq!(body, serde_json::json!({"start": true}));

        let body = serde_json::to_value(ChatRequest::greeting(Some("0xabc"))).unwrap();
        assert_eq!(body, serde_json::json!({"start": true, "address": "0xabc"}));
    }

    #[test]
    fn test_message_body() {
        let body = serde_json::to_value(ChatRequest::message("Hello", None)).unwrap();
        assert_eq!(body, serde_json::json!({"user_message": "Hello"}));
    }

    #[test]
    fn test_reply_remaining() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"reply": "Hi", "agent": "OrchestratorAgent", "free_messages_remaining": 3}"#)
                .unwrap();
        assert_eq!(reply.remaining(), Some(3));

        let reply: ChatReply =
            serde_json::from_str(r#"{"reply": "Hi", "free_messages_remaining": null}"#).unwrap();
        assert_eq!(reply.remaining(), None);
        assert!(reply.agent.is_none());

        let reply: ChatReply =
            serde_json::from_str(r#"{"reply": "Hi", "free_messages_remaining": -1}"#).unwrap();
        assert_eq!(reply.remaining(), Some(0));
    }

    #[test]
    fn test_error_body() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"error": "Free message limit reached. Please connect with MetaMask to continue.", "require_metamask": true}"#,
        )
        .unwrap();
        assert!(body.require_metamask);

        let body: ErrorBody = serde_json::from_str(r#"{"error": "boom"}"#).unwrap();
        assert!(!body.require_metamask);
    }
}
