mod api;
mod conversation;
mod message;
mod session;

pub use api::{ChatReply, ChatRequest, ErrorBody, PostMessageRequest};
pub use conversation::{ChatLocation, ConversationId, ConversationSummary, StoredMessage};
pub use message::{Message, MessageId, MessageIdGen, Role};
pub use session::SessionState;
