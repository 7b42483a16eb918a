use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgencyResult;
use crate::models::{ChatReply, ConversationId, ConversationSummary, StoredMessage};

/// Outbound calls to the agency backend.
///
/// Implementations never retry: each failure is returned once as
/// `NetworkError`, `HttpError`, `AuthRequired` or `ResponseDecode`.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Ask the orchestrator for its opening line.
    async fn start_chat(&self, address: Option<&str>) -> AgencyResult<ChatReply>;

    async fn send_chat(&self, text: &str, address: Option<&str>) -> AgencyResult<ChatReply>;

    async fn create_conversation(&self) -> AgencyResult<ConversationSummary>;

    async fn delete_conversation(&self, id: &ConversationId) -> AgencyResult<()>;

    /// Post into a stored conversation; returns the agent's persisted reply.
    async fn post_message(&self, id: &ConversationId, content: &str)
        -> AgencyResult<StoredMessage>;

    async fn list_conversations(&self) -> AgencyResult<Vec<ConversationSummary>>;

    async fn list_messages(&self, id: &ConversationId) -> AgencyResult<Vec<StoredMessage>>;
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn start_chat(&self, address: Option<&str>) -> AgencyResult<ChatReply> {
        (**self).start_chat(address).await
    }

    async fn send_chat(&self, text: &str, address: Option<&str>) -> AgencyResult<ChatReply> {
        (**self).send_chat(text, address).await
    }

    async fn create_conversation(&self) -> AgencyResult<ConversationSummary> {
        (**self).create_conversation().await
    }

    async fn delete_conversation(&self, id: &ConversationId) -> AgencyResult<()> {
        (**self).delete_conversation(id).await
    }

    async fn post_message(
        &self,
        id: &ConversationId,
        content: &str,
    ) -> AgencyResult<StoredMessage> {
        (**self).post_message(id, content).await
    }

    async fn list_conversations(&self) -> AgencyResult<Vec<ConversationSummary>> {
        (**self).list_conversations().await
    }

    async fn list_messages(&self, id: &ConversationId) -> AgencyResult<Vec<StoredMessage>> {
        (**self).list_messages(id).await
    }
}
