pub mod chat;
pub mod config;
pub mod conversations;
pub mod wallet;

pub use chat::{handle_chat_command, ChatArgs};
pub use config::{handle_config_command, ConfigCommand};
pub use conversations::{handle_conversations_command, ConversationsCommand};
pub use wallet::{handle_connect_command, CliPlatform};

use agency_core::{AgencyConfig, HttpTransport};

fn create_transport(config: &AgencyConfig) -> anyhow::Result<HttpTransport> {
    Ok(HttpTransport::from_config(&config.server)?)
}
