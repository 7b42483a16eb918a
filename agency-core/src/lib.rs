#![allow(clippy::type_complexity, clippy::derivable_impls)]

pub mod config;
pub mod conversations;
pub mod error;
pub mod logging;
pub mod models;
pub mod render;
pub mod session;
pub mod transport;
pub mod wallet;

pub use config::{
    ensure_data_dir, get_config_dir, get_config_paths, get_data_dir, AgencyConfig, ChatConfig,
    ConfigLoadError, GatingMode, LoggingConfig, ServerConfig, TuiConfig, WalletConfig,
};
pub use conversations::{
    ConversationDirectory, DeleteOutcome, DirectoryError, CREATE_FAILED_TEXT, DELETE_FAILED_TEXT,
    LOAD_FAILED_TEXT,
};
pub use error::{AgencyError, AgencyResult, CliErrorDisplay};
pub use logging::{build_filter, init_logging, LogTarget};
pub use models::{
    ChatLocation, ChatReply, ChatRequest, ConversationId, ConversationSummary, ErrorBody,
    Message, MessageId, MessageIdGen, PostMessageRequest, Role, SessionState, StoredMessage,
};
pub use render::{
    format_agent_name, format_message, format_time, format_timestamp, parse_markup, project,
    short_address, Banner, Bubble, ChatView, MarkupLine, MarkupSpan, CONNECT_ACTION_LABEL,
};
pub use session::{
    ChatRoute, GatingPolicy, PendingRequest, Reply, RequestKind, RequestOutcome, RequestState,
    SessionEvent, SessionEventKind, SessionHolder, SessionObserver, AUTH_CONFIRMATION_TEXT,
    CONVERSATION_SEND_FAILURE_TEXT, DEFAULT_AGENT, GREETING_FAILURE_TEXT, LIMIT_REACHED_TEXT,
    SEND_FAILURE_TEXT,
};
pub use transport::{classify_failure, ChatTransport, HttpTransport};
pub use wallet::{
    default_user_agent, is_mobile_user_agent, AuthBus, AuthEvent, AuthSubscription,
    ConnectOutcome, JsonRpcWalletProvider, Platform, WalletConnector, WalletProvider,
    CONNECT_FAILED_TEXT, NO_ACCOUNT_TEXT,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
