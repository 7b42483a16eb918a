//! Error types for the Agency core library.
//!
//! Every failure a chat client can run into is expressed as an [`AgencyError`].
//! None of them is fatal to a chat session: the session holder converts them
//! into fixed user-facing messages, and the binaries print them with
//! [`CliErrorDisplay`].
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Transport | Network, HTTP status, auth-required and decode errors |
//! | E2001-E2099 | Config | Config file, environment and validation errors |
//! | E3001-E3099 | Wallet | Wallet provider availability, rejection and RPC errors |
//! | E4001-E4099 | Session | User input and request-gating errors |
//! | E9001-E9099 | General | Internal, IO and serialization errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Agency core library.
#[derive(Debug, Error)]
pub enum AgencyError {
    // ========================================================================
    // Transport Errors (E1001-E1099)
    // ========================================================================
    /// Connectivity failure or timeout before any response arrived
    #[error("[E1001] Network error: {0}")]
    NetworkError(String),

    /// Backend answered with a non-2xx status that is not an auth gate
    #[error("[E1002] HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    /// Backend answered 403 with the wallet-auth marker
    #[error("[E1003] Wallet authentication required: {0}")]
    AuthRequired(String),

    /// A 2xx body could not be decoded into the expected shape
    #[error("[E1004] Failed to decode response: {0}")]
    ResponseDecode(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file not found
    #[error("[E2001] Configuration file not found: {0}")]
    ConfigFileNotFound(String),

    /// Configuration file parse error
    #[error("[E2002] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2003] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    // ========================================================================
    // Wallet Errors (E3001-E3099)
    // ========================================================================
    /// No wallet provider is injected
    #[error("[E3001] No wallet provider available")]
    WalletUnavailable,

    /// The user or the wallet refused the account request
    #[error("[E3002] Wallet request rejected: {0}")]
    WalletRejected(String),

    /// The wallet answered with an empty account list
    #[error("[E3003] Wallet returned no accounts")]
    NoWalletAccounts,

    /// The wallet endpoint answered with a JSON-RPC error object
    #[error("[E3004] Wallet RPC error {code}: {message}")]
    WalletRpc { code: i64, message: String },

    // ========================================================================
    // Session Errors (E4001-E4099)
    // ========================================================================
    /// Empty or whitespace-only message
    #[error("[E4001] Message is empty")]
    EmptyMessage,

    /// A request is already outstanding for this session
    #[error("[E4002] A request is already in flight")]
    RequestInFlight,

    /// Free-tier limit reached and the session is waiting for authentication
    #[error("[E4003] Sending is blocked until a wallet is connected")]
    SendGated,

    /// Conversation id that cannot address a single conversation
    #[error("[E4004] Invalid conversation id: '{0}'")]
    InvalidConversationId(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Agency operations.
pub type AgencyResult<T> = Result<T, AgencyError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for AgencyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            AgencyError::NetworkError(err.to_string())
        } else if err.is_status() {
            let status = err.status().map(|s| s.as_u16()).unwrap_or_default();
            AgencyError::HttpError {
                status,
                message: err.to_string(),
            }
        } else if err.is_decode() {
            AgencyError::ResponseDecode(err.to_string())
        } else {
            AgencyError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AgencyError {
    fn from(err: serde_json::Error) -> Self {
        AgencyError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for AgencyError {
    fn from(err: std::io::Error) -> Self {
        AgencyError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for AgencyError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => AgencyError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => AgencyError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => AgencyError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => AgencyError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl AgencyError {
    /// Returns true if this error came from talking to the backend.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            AgencyError::NetworkError(_)
                | AgencyError::HttpError { .. }
                | AgencyError::AuthRequired(_)
                | AgencyError::ResponseDecode(_)
        )
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            AgencyError::ConfigFileNotFound(_)
                | AgencyError::ConfigParseError(_)
                | AgencyError::InvalidConfigValue { .. }
        )
    }

    /// Returns true if this error is related to the wallet connector.
    pub fn is_wallet_error(&self) -> bool {
        matches!(
            self,
            AgencyError::WalletUnavailable
                | AgencyError::WalletRejected(_)
                | AgencyError::NoWalletAccounts
                | AgencyError::WalletRpc { .. }
        )
    }

    /// Returns true for send attempts the session silently ignores.
    pub fn is_ignored_input(&self) -> bool {
        matches!(
            self,
            AgencyError::EmptyMessage | AgencyError::RequestInFlight | AgencyError::SendGated
        )
    }

    /// Returns true if the same action might succeed when the user tries again.
    ///
    /// Nothing is retried automatically; this only drives the wording shown
    /// to the user.
    pub fn is_transient(&self) -> bool {
        match self {
            AgencyError::NetworkError(_) => true,
            AgencyError::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Server-provided or locally built detail, without the error code prefix.
    pub fn detail(&self) -> String {
        match self {
            AgencyError::NetworkError(m)
            | AgencyError::AuthRequired(m)
            | AgencyError::ResponseDecode(m)
            | AgencyError::ConfigFileNotFound(m)
            | AgencyError::ConfigParseError(m)
            | AgencyError::WalletRejected(m)
            | AgencyError::Internal(m)
            | AgencyError::IoError(m)
            | AgencyError::SerializationError(m) => m.clone(),
            AgencyError::HttpError { message, .. }
            | AgencyError::InvalidConfigValue { message, .. }
            | AgencyError::WalletRpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            AgencyError::NetworkError(_) => "E1001",
            AgencyError::HttpError { .. } => "E1002",
            AgencyError::AuthRequired(_) => "E1003",
            AgencyError::ResponseDecode(_) => "E1004",
            AgencyError::ConfigFileNotFound(_) => "E2001",
            AgencyError::ConfigParseError(_) => "E2002",
            AgencyError::InvalidConfigValue { .. } => "E2003",
            AgencyError::WalletUnavailable => "E3001",
            AgencyError::WalletRejected(_) => "E3002",
            AgencyError::NoWalletAccounts => "E3003",
            AgencyError::WalletRpc { .. } => "E3004",
            AgencyError::EmptyMessage => "E4001",
            AgencyError::RequestInFlight => "E4002",
            AgencyError::SendGated => "E4003",
            AgencyError::InvalidConversationId(_) => "E4004",
            AgencyError::Internal(_) => "E9001",
            AgencyError::IoError(_) => "E9002",
            AgencyError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            AgencyError::NetworkError(_) => {
                Some("Check that the agency server is running and server.base_url is correct")
            }
            AgencyError::AuthRequired(_) | AgencyError::SendGated => {
                Some("Connect a wallet with 'agency connect' to continue")
            }
            AgencyError::ConfigFileNotFound(_) => {
                Some("Create agency.toml or set AGENCY_SERVER_URL")
            }
            AgencyError::WalletUnavailable => {
                Some("Install MetaMask or set wallet.rpc_url to a local wallet endpoint")
            }
            AgencyError::NoWalletAccounts => Some("Unlock your wallet and try again"),
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() || self.is_ignored_input() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Recoverable error: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with its suggestion.
pub struct CliErrorDisplay<'a> {
    error: &'a AgencyError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a AgencyError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            writeln!(f)?;
            writeln!(f, "  This error may be temporary. Try again in a moment.")?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
