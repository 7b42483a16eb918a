mod events;
mod holder;
mod request;

pub use events::{SessionEvent, SessionEventKind, SessionObserver};
pub use holder::{
    ChatRoute, GatingPolicy, RequestOutcome, RequestState, SessionHolder, AUTH_CONFIRMATION_TEXT,
    CONVERSATION_SEND_FAILURE_TEXT, DEFAULT_AGENT, GREETING_FAILURE_TEXT, LIMIT_REACHED_TEXT,
    SEND_FAILURE_TEXT,
};
pub use request::{PendingRequest, Reply, RequestKind};
