//! Conversation list: create, delete, list and open stored conversations.

use thiserror::Error;
use tracing::{info, warn};

use crate::error::AgencyError;
use crate::models::{ChatLocation, ConversationId, ConversationSummary};
use crate::transport::ChatTransport;

pub const CREATE_FAILED_TEXT: &str = "Failed to create new conversation. Please try again.";
pub const DELETE_FAILED_TEXT: &str = "Failed to delete conversation. Please try again.";
pub const LOAD_FAILED_TEXT: &str = "Failed to load conversations. Please try again.";

/// Failed directory action. Displays as the fixed text shown to the user.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DirectoryError {
    pub message: &'static str,
    #[source]
    pub source: AgencyError,
}

impl DirectoryError {
    fn new(message: &'static str, source: AgencyError) -> Self {
        warn!(error_code = source.error_code(), "{}: {}", message, source);
        Self { message, source }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The open conversation was deleted; go to this location.
    ClearedCurrent(ChatLocation),
    /// Another conversation was deleted and dropped from the list.
    Removed,
}

pub struct ConversationDirectory<T> {
    transport: T,
    conversations: Vec<ConversationSummary>,
    current: Option<ConversationId>,
}

impl<T: ChatTransport> ConversationDirectory<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            conversations: Vec::new(),
            current: None,
        }
    }

    /// Directory for the page at `location` (`/chat?id=...`).
    pub fn at(transport: T, location: &ChatLocation) -> Self {
        Self {
            transport,
            conversations: Vec::new(),
            current: location.conversation.clone(),
        }
    }

    pub fn conversations(&self) -> &[ConversationSummary] {
        &self.conversations
    }

    pub fn current(&self) -> Option<&ConversationId> {
        self.current.as_ref()
    }

    pub fn location(&self) -> ChatLocation {
        match &self.current {
            Some(id) => ChatLocation::conversation(id.clone()),
            None => ChatLocation::narrative(),
        }
    }

    pub async fn refresh(&mut self) -> Result<&[ConversationSummary], DirectoryError> {
        let list = self
            .transport
            .list_conversations()
            .await
            .map_err(|e| DirectoryError::new(LOAD_FAILED_TEXT, e))?;
        self.conversations = list;
        Ok(&self.conversations)
    }

    /// Create a conversation and make it current.
    pub async fn create(&mut self) -> Result<(ConversationId, ChatLocation), DirectoryError> {
        let created = self
            .transport
            .create_conversation()
            .await
            .map_err(|e| DirectoryError::new(CREATE_FAILED_TEXT, e))?;

        let id = created.id.clone();
        info!(conversation = %id, "Conversation created");
        self.conversations.insert(0, created);
        Ok((id.clone(), self.open(id)))
    }

    pub async fn delete(&mut self, id: &ConversationId) -> Result<DeleteOutcome, DirectoryError> {
        self.transport
            .delete_conversation(id)
            .await
            .map_err(|e| DirectoryError::new(DELETE_FAILED_TEXT, e))?;

        info!(conversation = %id, "Conversation deleted");
        self.conversations.retain(|c| &c.id != id);

        if self.current.as_ref() == Some(id) {
            self.current = None;
            Ok(DeleteOutcome::ClearedCurrent(ChatLocation::narrative()))
        } else {
            Ok(DeleteOutcome::Removed)
        }
    }

    pub fn open(&mut self, id: ConversationId) -> ChatLocation {
        self.current = Some(id.clone());
        ChatLocation::conversation(id)
    }
}
