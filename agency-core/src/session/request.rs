use crate::error::AgencyResult;
use crate::models::{ChatReply, ConversationId, StoredMessage};
use crate::transport::ChatTransport;

/// What an outstanding request asks the backend for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Greeting { address: Option<String> },
    History { conversation: ConversationId },
    Send { text: String, address: Option<String> },
    Post { conversation: ConversationId, content: String },
}

/// Successful response matching a [`RequestKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Chat(ChatReply),
    History(Vec<StoredMessage>),
    Posted(StoredMessage),
}

/// Ticket for a request issued by a `SessionHolder`.
///
/// Run it with [`PendingRequest::execute`] (no lock on the holder needed) and
/// hand the result back to `SessionHolder::complete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub(crate) ticket: u64,
    pub(crate) kind: RequestKind,
}

impl PendingRequest {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    pub async fn execute<T: ChatTransport + ?Sized>(&self, transport: &T) -> AgencyResult<Reply> {
        match &self.kind {
            RequestKind::Greeting { address } => transport
                .start_chat(address.as_deref())
                .await
                .map(Reply::Chat),
            RequestKind::History { conversation } => transport
                .list_messages(conversation)
                .await
                .map(Reply::History),
            RequestKind::Send { text, address } => transport
                .send_chat(text, address.as_deref())
                .await
                .map(Reply::Chat),
            RequestKind::Post {
                conversation,
                content,
            } => transport
                .post_message(conversation, content)
                .await
                .map(Reply::Posted),
        }
    }
}
