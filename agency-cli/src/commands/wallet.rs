use std::sync::Arc;

use agency_core::{
    default_user_agent, short_address, AgencyConfig, AgencyError, AuthBus, ConnectOutcome,
    JsonRpcWalletProvider, Platform, WalletConnector, WalletProvider,
};
use colored::Colorize;

/// Terminal host for the wallet connector: links are printed (and opened in
/// the desktop browser when enabled), alerts go to stderr.
pub struct CliPlatform {
    user_agent: String,
    launch_browser: bool,
}

impl CliPlatform {
    pub fn new(config: &AgencyConfig) -> Self {
        let user_agent = if config.wallet.user_agent.is_empty() {
            default_user_agent("agency")
        } else {
            config.wallet.user_agent.clone()
        };
        Self {
            user_agent,
            launch_browser: config.wallet.open_browser,
        }
    }

    pub fn without_browser(mut self) -> Self {
        self.launch_browser = false;
        self
    }

    fn open(&self, url: &str) {
        if !self.launch_browser {
            return;
        }
        if let Err(e) = open::that(url) {
            tracing::debug!(url, error = %e, "Could not launch browser");
        }
    }
}

impl Platform for CliPlatform {
    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn navigate(&self, url: &str) {
        println!("  {} Open the wallet app: {}", "→".blue(), url.underline());
        self.open(url);
    }

    fn open_new_context(&self, url: &str) {
        println!("  {} Install a wallet: {}", "→".blue(), url.underline());
        self.open(url);
    }

    fn alert(&self, message: &str) {
        eprintln!("  {} {}", "!".yellow(), message.yellow());
    }
}

/// Connector wired to the configured JSON-RPC endpoint, or to no provider at
/// all when `wallet.rpc_url` is unset.
pub(crate) fn create_connector(
    config: &AgencyConfig,
    platform: Arc<dyn Platform>,
    bus: AuthBus,
) -> anyhow::Result<WalletConnector> {
    let provider = match &config.wallet.rpc_url {
        Some(url) => {
            let provider: Arc<dyn WalletProvider> = Arc::new(JsonRpcWalletProvider::new(url)?);
            Some(provider)
        }
        None => None,
    };

    Ok(WalletConnector::new(
        provider,
        platform,
        bus,
        config.wallet.clone(),
    ))
}

pub(crate) fn describe_outcome(outcome: &ConnectOutcome) {
    match outcome {
        ConnectOutcome::Connected(address) => println!(
            "  {} Connected as {}",
            "✓".green().bold(),
            short_address(address).green()
        ),
        ConnectOutcome::NoAccounts | ConnectOutcome::Rejected => {
            println!("  {} Wallet not connected", "✗".red())
        }
        ConnectOutcome::RedirectedToApp(_) | ConnectOutcome::OpenedDownload(_) => println!(
            "  {} {}",
            "!".yellow(),
            "No wallet endpoint configured. Set wallet.rpc_url or AGENCY_WALLET_RPC_URL.".dimmed()
        ),
    }
}

pub async fn handle_connect_command(config: AgencyConfig) -> anyhow::Result<()> {
    println!("{}", "Connecting wallet...".cyan().bold());
    println!();

    let platform: Arc<dyn Platform> = Arc::new(CliPlatform::new(&config));
    let connector = create_connector(&config, platform, AuthBus::new())?;

    if let Some(address) = connector.check_connection().await {
        println!(
            "  {} Already connected as {}",
            "✓".green().bold(),
            short_address(&address).green()
        );
        return Ok(());
    }

    let outcome = connector.connect().await;
    describe_outcome(&outcome);

    match outcome.error() {
        Some(e @ (AgencyError::NoWalletAccounts | AgencyError::WalletRejected(_))) => {
            Err(anyhow::Error::new(e).context("wallet connection failed"))
        }
        Some(e) => {
            if let Some(hint) = e.user_suggestion() {
                println!("  {} {}", "→".blue(), hint.dimmed());
            }
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_user_agent_from_config() {
        let mut config = AgencyConfig::default();
        assert!(CliPlatform::new(&config).user_agent().starts_with("agency/"));

        config.wallet.user_agent = "Mozilla/5.0 (iPhone)".to_string();
        assert_eq!(
            CliPlatform::new(&config).user_agent(),
            "Mozilla/5.0 (iPhone)"
        );
    }

    #[tokio::test]
    async fn test_connector_without_rpc_url_has_no_provider() {
        let config = AgencyConfig::default();
        let platform = Arc::new(CliPlatform::new(&config).without_browser());
        let connector = create_connector(&config, platform, AuthBus::new()).unwrap();

        assert!(!connector.has_provider());
        assert_eq!(
            connector.connect().await,
            ConnectOutcome::OpenedDownload(config.wallet.download_url.clone())
        );
    }
}
