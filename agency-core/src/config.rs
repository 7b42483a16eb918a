use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::session::GatingPolicy;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigLoadError> for crate::error::AgencyError {
    fn from(err: ConfigLoadError) -> Self {
        match err {
            ConfigLoadError::Config(e) => e.into(),
            ConfigLoadError::MissingRequired(key) => crate::error::AgencyError::InvalidConfigValue {
                key,
                message: "Missing required value".to_string(),
            },
            ConfigLoadError::InvalidValue { key, message } => {
                crate::error::AgencyError::InvalidConfigValue { key, message }
            }
            ConfigLoadError::FileNotFound(path) => {
                crate::error::AgencyError::ConfigFileNotFound(path.display().to_string())
            }
            ConfigLoadError::Io(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AgencyConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub wallet: WalletConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// Which side decides when free-tier sending stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GatingMode {
    #[default]
    ServerDriven,
    ClientCap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub gating: GatingMode,

    #[serde(default = "default_free_message_limit")]
    pub free_message_limit: u32,

    #[serde(default = "default_true")]
    pub greet_on_start: bool,

    #[serde(default = "default_agent")]
    pub default_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_download_url")]
    pub download_url: String,

    #[serde(default = "default_deep_link_base")]
    pub deep_link_base: String,

    #[serde(default = "default_dapp_host")]
    pub dapp_host: String,

    #[serde(default = "default_dapp_path")]
    pub dapp_path: String,

    /// Reported user agent; empty means "detect from the environment".
    #[serde(default)]
    pub user_agent: String,

    /// Ethereum JSON-RPC endpoint of a local wallet. No provider when unset.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Hand wallet links to the desktop browser as well as showing them.
    #[serde(default = "default_true")]
    pub open_browser: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,

    #[serde(default)]
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_free_message_limit() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_agent() -> String {
    "OrchestratorAgent".to_string()
}

fn default_download_url() -> String {
    "https://metamask.io/download/".to_string()
}

fn default_deep_link_base() -> String {
    "https://metamask.app.link/dapp/".to_string()
}

fn default_dapp_host() -> String {
    "localhost:5000".to_string()
}

fn default_dapp_path() -> String {
    "/chat".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_tick_rate() -> u64 {
    100
}

fn default_theme() -> String {
    "Tokyo Night".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            gating: GatingMode::default(),
            free_message_limit: default_free_message_limit(),
            greet_on_start: true,
            default_agent: default_agent(),
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            download_url: default_download_url(),
            deep_link_base: default_deep_link_base(),
            dapp_host: default_dapp_host(),
            dapp_path: default_dapp_path(),
            user_agent: String::new(),
            rpc_url: None,
            open_browser: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
            file_path: String::new(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            theme: default_theme(),
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl ChatConfig {
    pub fn gating_policy(&self) -> GatingPolicy {
        match self.gating {
            GatingMode::ServerDriven => GatingPolicy::ServerDriven,
            GatingMode::ClientCap => GatingPolicy::ClientCap {
                limit: self.free_message_limit,
            },
        }
    }
}

impl WalletConfig {
    /// `https://metamask.app.link/dapp/<host><path>`
    pub fn deep_link(&self) -> String {
        format!("{}{}{}", self.deep_link_base, self.dapp_host, self.dapp_path)
    }
}

impl AgencyConfig {
    pub fn load() -> Result<Self, ConfigLoadError> {
        Self::load_with(None)
    }

    /// Like [`load`](Self::load), with `file` layered over the search paths.
    /// An explicitly named file has to exist.
    pub fn load_with(file: Option<&Path>) -> Result<Self, ConfigLoadError> {
        let mut paths = get_config_paths();
        if let Some(file) = file {
            if !file.is_file() {
                return Err(ConfigLoadError::FileNotFound(file.to_path_buf()));
            }
            paths.push(file.to_path_buf());
        }
        Self::load_from_paths(paths)
    }

    pub fn load_from_paths(paths: Vec<PathBuf>) -> Result<Self, ConfigLoadError> {
        load_dotenv_files();

        let mut builder = ConfigBuilder::builder();

        for path in paths {
            if path.exists() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("AGENCY")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;

        let mut agency_config: AgencyConfig = config.try_deserialize()?;

        if let Ok(url) = std::env::var("AGENCY_SERVER_URL") {
            agency_config.server.base_url = url;
        }

        if let Ok(level) = std::env::var("AGENCY_LOG_LEVEL") {
            agency_config.logging.level = level;
        }

        if let Ok(rpc) = std::env::var("AGENCY_WALLET_RPC_URL") {
            if !rpc.is_empty() {
                agency_config.wallet.rpc_url = Some(rpc);
            }
        }

        agency_config.validate()?;

        Ok(agency_config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.server.base_url.is_empty() {
            return Err(ConfigLoadError::MissingRequired(
                "server.base_url".to_string(),
            ));
        }

        if !is_http_url(&self.server.base_url) {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.base_url".to_string(),
                message: "Must start with http:// or https://".to_string(),
            });
        }

        if self.server.request_timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.request_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.server.connect_timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "server.connect_timeout_secs".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        if self.chat.gating == GatingMode::ClientCap && self.chat.free_message_limit == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "chat.free_message_limit".to_string(),
                message: "Must be greater than 0 when gating is client_cap".to_string(),
            });
        }

        if let Some(rpc) = &self.wallet.rpc_url {
            if !is_http_url(rpc) {
                return Err(ConfigLoadError::InvalidValue {
                    key: "wallet.rpc_url".to_string(),
                    message: "Must start with http:// or https://".to_string(),
                });
            }
        }

        if self.tui.tick_rate_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "tui.tick_rate_ms".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        // Any EnvFilter directive is accepted, including bare targets.
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(ConfigLoadError::InvalidValue {
                key: "logging.level".to_string(),
                message: format!("Invalid log filter '{}': {}", self.logging.level, e),
            });
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.server.base_url
    }

    pub fn log_level(&self) -> &str {
        &self.logging.level
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join("config").join("default.toml"));
        paths.push(cwd.join("config").join("local.toml"));
        paths.push(cwd.join("agency.toml"));
    }

    if let Some(config_dir) = get_config_dir() {
        paths.push(config_dir.join("config.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".agency").join("config.toml"));
    }

    paths
}

fn load_dotenv_files() {
    for path in get_dotenv_paths() {
        if path.exists() {
            let _ = dotenvy::from_path(&path);
        }
    }
}

fn get_dotenv_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".env"));
        paths.push(cwd.join(".env.local"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".agency").join(".env"));
    }

    paths
}

pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("agency"))
}

pub fn get_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("agency"))
}

pub fn ensure_data_dir() -> Result<PathBuf, std::io::Error> {
    let data_dir = get_data_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine data directory",
        )
    })?;

    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}
