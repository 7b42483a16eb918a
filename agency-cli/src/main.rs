use agency_core::{
    init_logging, AgencyConfig, AgencyError, ConfigLoadError, LogTarget, LoggingConfig,
};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

use commands::{
    handle_chat_command, handle_config_command, handle_connect_command,
    handle_conversations_command, ChatArgs, ConfigCommand, ConversationsCommand,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "agency")]
#[command(author = "Solopreneur Agency Contributors")]
#[command(version = VERSION)]
#[command(about = "Agency - chat with the Solopreneur AI Agency from your terminal")]
#[command(long_about = r#"
Agency is a terminal client for the Solopreneur AI Agency. The Orchestrator
agent routes your messages to the Strategy, Creative, Production and Media
agents. A few free messages are available; connect an Ethereum wallet to
unlock unlimited access.

Use 'agency chat' to start talking, 'agency conversations' to manage stored
conversations and 'agency connect' to link your wallet.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Backend base URL (overrides configuration)")]
    server: Option<String>,

    #[arg(
        long,
        global = true,
        env = "AGENCY_CONFIG",
        help = "Extra configuration file, layered over the default locations"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Start an interactive chat with the agency")]
    Chat(ChatArgs),

    #[command(about = "Manage stored conversations")]
    Conversations {
        #[command(subcommand)]
        action: Option<ConversationsCommand>,
    },

    #[command(about = "Connect a wallet for unlimited access")]
    Connect,

    #[command(about = "Inspect and validate configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommand>,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = AgencyConfig::load_with(cli.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    setup_logging(&logging, cli.verbose);

    match run(cli, loaded).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

/// Terminal output stays readable: warnings only unless `-v`, `RUST_LOG` or a
/// log file is configured.
fn setup_logging(logging: &LoggingConfig, verbose: bool) {
    let target = LogTarget::resolve(logging, LogTarget::Stderr);
    let effective = if target == LogTarget::Stderr {
        LoggingConfig {
            level: "warn".to_string(),
            ..logging.clone()
        }
    } else {
        logging.clone()
    };

    if let Err(e) = init_logging(&effective, verbose, target) {
        eprintln!("{} {}", "!".yellow(), e);
    }
}

async fn run(cli: Cli, loaded: Result<AgencyConfig, ConfigLoadError>) -> anyhow::Result<()> {
    let server = cli.server;
    let config = move || -> anyhow::Result<AgencyConfig> {
        let mut config = loaded.map_err(AgencyError::from)?;
        if let Some(url) = server {
            config.server.base_url = url;
            config.validate()?;
        }
        Ok(config)
    };

    match cli.command {
        Commands::Chat(args) => handle_chat_command(config()?, args).await,
        Commands::Conversations { action } => {
            handle_conversations_command(config()?, action).await
        }
        Commands::Connect => handle_connect_command(config()?).await,
        Commands::Config { action } => handle_config_command(config(), action),
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Agency Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} {}", "Core:".bold(), agency_core::VERSION);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Agents:".bold());
        for agent in [
            "OrchestratorAgent",
            "StrategyAgent",
            "CreativeAgent",
            "ProductionAgent",
            "MediaAgent",
        ] {
            println!("    {}", agency_core::format_agent_name(Some(agent)));
        }
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("agency {}", VERSION);
    }

    Ok(())
}
