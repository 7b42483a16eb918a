use std::sync::Arc;

use tracing::{debug, info};

use crate::config::WalletConfig;
use crate::error::AgencyError;

use super::bus::{AuthBus, AuthEvent};
use super::platform::{is_mobile_user_agent, Platform};
use super::provider::WalletProvider;

pub const CONNECT_FAILED_TEXT: &str = "Could not connect to MetaMask. Please try again.";

pub const NO_ACCOUNT_TEXT: &str = "No account found. Please unlock your MetaMask wallet.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// An account was returned and announced on the bus.
    Connected(String),
    /// The wallet answered with no accounts.
    NoAccounts,
    /// The wallet refused or could not be reached.
    Rejected,
    /// No provider on a mobile agent: sent to the wallet app deep link.
    RedirectedToApp(String),
    /// No provider on desktop: opened the wallet download page.
    OpenedDownload(String),
}

impl ConnectOutcome {
    pub fn address(&self) -> Option<&str> {
        match self {
            ConnectOutcome::Connected(address) => Some(address),
            _ => None,
        }
    }

    /// Why the user is still unauthenticated after this outcome.
    pub fn error(&self) -> Option<AgencyError> {
        match self {
            ConnectOutcome::Connected(_) => None,
            ConnectOutcome::NoAccounts => Some(AgencyError::NoWalletAccounts),
            ConnectOutcome::Rejected => {
                Some(AgencyError::WalletRejected(CONNECT_FAILED_TEXT.to_string()))
            }
            ConnectOutcome::RedirectedToApp(_) | ConnectOutcome::OpenedDownload(_) => {
                Some(AgencyError::WalletUnavailable)
            }
        }
    }
}

/// Obtains a wallet account and announces it on the [`AuthBus`].
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    platform: Arc<dyn Platform>,
    bus: AuthBus,
    config: WalletConfig,
}

impl WalletConnector {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        platform: Arc<dyn Platform>,
        bus: AuthBus,
        config: WalletConfig,
    ) -> Self {
        Self {
            provider,
            platform,
            bus,
            config,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn bus(&self) -> &AuthBus {
        &self.bus
    }

    /// Safe to call repeatedly; a repeated address is a no-op for sessions.
    pub async fn connect(&self) -> ConnectOutcome {
        let Some(provider) = &self.provider else {
            return self.install_wallet();
        };

        match provider.request_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(address) => {
                    info!(address = %address, "Wallet connected");
                    self.bus.publish(AuthEvent {
                        address: address.clone(),
                    });
                    ConnectOutcome::Connected(address)
                }
                None => {
                    AgencyError::NoWalletAccounts.log();
                    self.platform.alert(NO_ACCOUNT_TEXT);
                    ConnectOutcome::NoAccounts
                }
            },
            Err(e) => {
                e.log();
                self.platform.alert(CONNECT_FAILED_TEXT);
                ConnectOutcome::Rejected
            }
        }
    }

    /// Account the provider already exposes, if any. Never prompts, never
    /// publishes.
    pub async fn check_connection(&self) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.selected_address().await {
            Ok(address) => address,
            Err(e) => {
                debug!(error = %e, "No existing wallet session");
                None
            }
        }
    }

    fn install_wallet(&self) -> ConnectOutcome {
        debug!(
            error_code = AgencyError::WalletUnavailable.error_code(),
            "No wallet provider"
        );
        if is_mobile_user_agent(&self.platform.user_agent()) {
            let url = self.config.deep_link();
            info!(url = %url, "Opening wallet app");
            self.platform.navigate(&url);
            ConnectOutcome::RedirectedToApp(url)
        } else {
            let url = self.config.download_url.clone();
            info!(url = %url, "No wallet available, opening download page");
            self.platform.open_new_context(&url);
            ConnectOutcome::OpenedDownload(url)
        }
    }
}
