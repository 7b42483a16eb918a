use std::sync::Arc;

use crate::models::{MessageId, Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    MessageAppended { id: MessageId, role: Role },
    TypingChanged(bool),
    Authenticated { address: String },
    GatingChanged(bool),
    CounterUpdated(Option<u32>),
    Cleared,
    Unmounted,
}

/// Emitted after every mutation of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub revision: u64,
    pub kind: SessionEventKind,
}

pub type SessionObserver = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default, Clone)]
pub(crate) struct ObserverList {
    observers: Vec<SessionObserver>,
}

impl ObserverList {
    pub(crate) fn push(&mut self, observer: SessionObserver) {
        self.observers.push(observer);
    }

    pub(crate) fn notify(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer(event);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("count", &self.observers.len())
            .finish()
    }
}
