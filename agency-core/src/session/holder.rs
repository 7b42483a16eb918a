use tracing::{debug, info};

use crate::error::{AgencyError, AgencyResult};
use crate::models::{
    ChatReply, ConversationId, Message, MessageIdGen, Role, SessionState, StoredMessage,
};
use crate::transport::ChatTransport;
use crate::wallet::AuthSubscription;

use super::events::{ObserverList, SessionEvent, SessionEventKind};
use super::request::{PendingRequest, Reply, RequestKind};

pub const DEFAULT_AGENT: &str = "OrchestratorAgent";

pub const GREETING_FAILURE_TEXT: &str =
    "I apologize, but I'm having trouble connecting. Please try again in a moment.";

pub const SEND_FAILURE_TEXT: &str = "I apologize, but I encountered an error. Please try again.";

pub const CONVERSATION_SEND_FAILURE_TEXT: &str = "Failed to get a response. Please try again.";

pub const LIMIT_REACHED_TEXT: &str = "You've reached your free message limit. Please connect with MetaMask to continue using the AI agency.";

pub const AUTH_CONFIRMATION_TEXT: &str = "Great! You're now connected with MetaMask. You have unlimited access to the AI agency. How else can I help you today?";

/// Which backend endpoint a session talks to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ChatRoute {
    /// `POST /api/chat`, free-tier counted.
    #[default]
    Narrative,
    /// `POST /api/conversations/{id}/messages`, never gated.
    Conversation(ConversationId),
}

/// Who decides when free-tier sending stops. A 403 wallet marker from the
/// backend gates under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatingPolicy {
    /// Trust the backend's `free_messages_remaining` counter.
    #[default]
    ServerDriven,
    /// Count unauthenticated sends locally and stop at `limit`.
    ClientCap { limit: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Sending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The backend answered; the reply is in the thread.
    Replied,
    /// The free-tier limit was hit; the thread explains it.
    Gated,
    /// The request failed; a fixed apology is in the thread.
    Failed,
    /// Nothing was sent (empty text, gated, or busy).
    Ignored,
    /// The result arrived for a stale ticket or an unmounted view.
    Discarded,
}

/// Owns the state of one open chat view. Every mutation goes through here.
#[derive(Debug)]
pub struct SessionHolder<T> {
    transport: T,
    route: ChatRoute,
    policy: GatingPolicy,
    default_agent: String,
    state: SessionState,
    ids: MessageIdGen,
    in_flight: Option<u64>,
    next_ticket: u64,
    mounted: bool,
    unauthenticated_sends: u32,
    observers: ObserverList,
}

impl<T: ChatTransport> SessionHolder<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            route: ChatRoute::default(),
            policy: GatingPolicy::default(),
            default_agent: DEFAULT_AGENT.to_string(),
            state: SessionState::new(),
            ids: MessageIdGen::new(),
            in_flight: None,
            next_ticket: 0,
            mounted: true,
            unauthenticated_sends: 0,
            observers: ObserverList::default(),
        }
    }

    pub fn with_route(mut self, route: ChatRoute) -> Self {
        self.route = route;
        self
    }

    pub fn with_policy(mut self, policy: GatingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_agent(mut self, agent: impl Into<String>) -> Self {
        self.default_agent = agent.into();
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn route(&self) -> &ChatRoute {
        &self.route
    }

    pub fn policy(&self) -> GatingPolicy {
        self.policy
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn request_state(&self) -> RequestState {
        if self.in_flight.is_some() {
            RequestState::Sending
        } else {
            RequestState::Idle
        }
    }

    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.observers.push(std::sync::Arc::new(observer));
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Whether a send would currently be issued. Ignores the text itself.
    pub fn can_send(&self) -> bool {
        self.mounted && self.in_flight.is_none() && !self.is_gated()
    }

    fn is_gated(&self) -> bool {
        if matches!(self.route, ChatRoute::Conversation(_)) {
            return false;
        }
        if self.state.require_wallet || self.state.is_exhausted() {
            return true;
        }
        match self.policy {
            GatingPolicy::ServerDriven => false,
            GatingPolicy::ClientCap { limit } => {
                !self.state.is_authenticated && self.unauthenticated_sends >= limit
            }
        }
    }

    // ------------------------------------------------------------------
    // Whole operations
    // ------------------------------------------------------------------

    /// Fetch the greeting (or the stored history on a conversation route).
    pub async fn start_conversation(&mut self) -> RequestOutcome {
        let request = match self.begin_greeting() {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Greeting not issued");
                return RequestOutcome::Ignored;
            }
        };
        let result = request.execute(&self.transport).await;
        self.complete(request, result)
    }

    pub async fn send_message(&mut self, text: &str) -> RequestOutcome {
        let request = match self.begin_send(text) {
            Ok(request) => request,
            Err(e) => {
                debug!(error_code = e.error_code(), "Send ignored: {}", e);
                return RequestOutcome::Ignored;
            }
        };
        let result = request.execute(&self.transport).await;
        self.complete(request, result)
    }

    // ------------------------------------------------------------------
    // Split form
    // ------------------------------------------------------------------

    pub fn begin_greeting(&mut self) -> AgencyResult<PendingRequest> {
        self.ensure_ready()?;

        let kind = match &self.route {
            ChatRoute::Narrative => RequestKind::Greeting {
                address: self.state.user_address.clone(),
            },
            ChatRoute::Conversation(id) => RequestKind::History {
                conversation: id.clone(),
            },
        };

        Ok(self.issue(kind))
    }

    pub fn begin_send(&mut self, text: &str) -> AgencyResult<PendingRequest> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgencyError::EmptyMessage);
        }
        self.ensure_ready()?;
        if self.is_gated() {
            return Err(AgencyError::SendGated);
        }

        let id = self.ids.next_id();
        self.state.messages.push(Message::user(id, text));
        self.emit(SessionEventKind::MessageAppended {
            id,
            role: Role::User,
        });

        let kind = match &self.route {
            ChatRoute::Narrative => {
                if !self.state.is_authenticated {
                    self.unauthenticated_sends += 1;
                }
                RequestKind::Send {
                    text: text.to_string(),
                    address: self.state.user_address.clone(),
                }
            }
            ChatRoute::Conversation(id) => RequestKind::Post {
                conversation: id.clone(),
                content: text.to_string(),
            },
        };

        Ok(self.issue(kind))
    }

    /// Apply the result of a request issued by this holder.
    pub fn complete(
        &mut self,
        request: PendingRequest,
        result: AgencyResult<Reply>,
    ) -> RequestOutcome {
        if !self.mounted {
            debug!(ticket = request.ticket, "Dropping result for unmounted view");
            return RequestOutcome::Discarded;
        }
        if self.in_flight != Some(request.ticket) {
            debug!(ticket = request.ticket, "Dropping stale result");
            return RequestOutcome::Discarded;
        }
        self.in_flight = None;

        let outcome = match (request.kind, result) {
            (RequestKind::Greeting { .. }, Ok(Reply::Chat(reply)))
            | (RequestKind::Send { .. }, Ok(Reply::Chat(reply))) => {
                self.apply_chat_reply(reply);
                RequestOutcome::Replied
            }
            (RequestKind::History { .. }, Ok(Reply::History(history))) => {
                self.apply_history(history);
                RequestOutcome::Replied
            }
            (RequestKind::Post { .. }, Ok(Reply::Posted(message))) => {
                self.push_agent(None, message.content);
                RequestOutcome::Replied
            }
            (RequestKind::Send { .. }, Err(AgencyError::AuthRequired(detail))) => {
                info!(detail = %detail, "Free message limit reached");
                self.state.require_wallet = true;
                self.emit(SessionEventKind::GatingChanged(true));
                self.push_agent(Some(DEFAULT_AGENT.to_string()), LIMIT_REACHED_TEXT);
                RequestOutcome::Gated
            }
            (kind, result) => {
                let error = match result {
                    Err(e) => e,
                    Ok(_) => AgencyError::ResponseDecode("Unexpected reply kind".to_string()),
                };
                error.log();
                let text = failure_text(&kind, &error);
                self.push_agent(None, text);
                RequestOutcome::Failed
            }
        };

        self.set_typing(false);
        outcome
    }

    // ------------------------------------------------------------------
    // Authentication and lifecycle
    // ------------------------------------------------------------------

    /// Wallet connected: lift the gate and confirm in the thread.
    pub fn on_authenticated(&mut self, address: &str) {
        let duplicate = self.state.is_authenticated
            && self.state.user_address.as_deref() == Some(address);

        self.mark_authenticated(address);

        if duplicate {
            debug!(address, "Repeated authentication event");
            return;
        }

        info!(address, "Wallet authenticated");
        self.push_agent(Some(DEFAULT_AGENT.to_string()), AUTH_CONFIRMATION_TEXT);
    }

    /// Apply every queued wallet event. Returns how many were applied.
    pub fn apply_auth_events(&mut self, subscription: &mut AuthSubscription) -> usize {
        let mut applied = 0;
        while let Some(event) = subscription.try_next() {
            self.on_authenticated(&event.address);
            applied += 1;
        }
        applied
    }

    /// Provider already exposes an account at mount: authenticate silently.
    pub fn restore_authentication(&mut self, address: &str) {
        debug!(address, "Restoring wallet session");
        self.mark_authenticated(address);
    }

    pub fn clear(&mut self) {
        self.state.messages.clear();
        self.emit(SessionEventKind::Cleared);
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.emit(SessionEventKind::Unmounted);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn ensure_ready(&self) -> AgencyResult<()> {
        if !self.mounted {
            return Err(AgencyError::Internal("Chat view is unmounted".to_string()));
        }
        if self.in_flight.is_some() {
            return Err(AgencyError::RequestInFlight);
        }
        Ok(())
    }

    fn issue(&mut self, kind: RequestKind) -> PendingRequest {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight = Some(ticket);
        debug!(ticket, ?kind, "Request issued");
        self.set_typing(true);
        PendingRequest { ticket, kind }
    }

    fn mark_authenticated(&mut self, address: &str) {
        let was_gated = self.state.require_wallet;
        self.state.is_authenticated = true;
        self.state.require_wallet = false;
        self.state.user_address = Some(address.to_string());
        self.emit(SessionEventKind::Authenticated {
            address: address.to_string(),
        });
        if was_gated {
            self.emit(SessionEventKind::GatingChanged(false));
        }
    }

    fn apply_chat_reply(&mut self, reply: ChatReply) {
        let remaining = match self.policy {
            GatingPolicy::ServerDriven => reply.remaining(),
            GatingPolicy::ClientCap { limit } if !self.state.is_authenticated => {
                let local = limit.saturating_sub(self.unauthenticated_sends);
                Some(reply.remaining().map_or(local, |server| server.min(local)))
            }
            GatingPolicy::ClientCap { .. } => reply.remaining(),
        };

        if let Some(remaining) = remaining {
            self.state.free_messages_remaining = Some(remaining);
            self.emit(SessionEventKind::CounterUpdated(Some(remaining)));
        }

        let agent = reply.agent.unwrap_or_else(|| self.default_agent.clone());
        self.push_agent(Some(agent), reply.reply);
    }

    fn apply_history(&mut self, history: Vec<StoredMessage>) {
        for stored in history {
            let id = self.ids.next_id();
            let message = if stored.is_user {
                Message::user(id, stored.content)
            } else {
                Message::agent(id, None, stored.content)
            };
            let role = message.role;
            self.state.messages.push(message);
            self.emit(SessionEventKind::MessageAppended { id, role });
        }
    }

    fn push_agent(&mut self, agent: Option<String>, text: impl Into<String>) {
        let id = self.ids.next_id();
        self.state.messages.push(Message::agent(id, agent, text));
        self.emit(SessionEventKind::MessageAppended {
            id,
            role: Role::Agent,
        });
    }

    fn set_typing(&mut self, typing: bool) {
        if self.state.is_typing != typing {
            self.state.is_typing = typing;
            self.emit(SessionEventKind::TypingChanged(typing));
        }
    }

    fn emit(&mut self, kind: SessionEventKind) {
        self.state.revision += 1;
        let event = SessionEvent {
            revision: self.state.revision,
            kind,
        };
        self.observers.notify(&event);
    }
}

fn failure_text(kind: &RequestKind, error: &AgencyError) -> String {
    match kind {
        RequestKind::Greeting { .. } | RequestKind::History { .. } => {
            let detail = error.detail();
            if detail.is_empty() {
                GREETING_FAILURE_TEXT.to_string()
            } else {
                format!("{} Error: {}", GREETING_FAILURE_TEXT, detail)
            }
        }
        RequestKind::Send { .. } => SEND_FAILURE_TEXT.to_string(),
        RequestKind::Post { .. } => CONVERSATION_SEND_FAILURE_TEXT.to_string(),
    }
}
