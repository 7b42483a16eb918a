use agency_core::{get_config_paths, get_data_dir, AgencyConfig, GatingMode};
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Show the effective configuration")]
    Show {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "List the configuration files that are searched")]
    Paths,

    #[command(about = "Validate the configuration")]
    Validate,
}

pub fn handle_config_command(
    config: anyhow::Result<AgencyConfig>,
    cmd: Option<ConfigCommand>,
) -> anyhow::Result<()> {
    match cmd.unwrap_or(ConfigCommand::Show {
        format: "text".to_string(),
    }) {
        ConfigCommand::Show { format } => cmd_config_show(&config?, &format),
        ConfigCommand::Paths => cmd_config_paths(),
        ConfigCommand::Validate => cmd_config_validate(config),
    }
}

fn cmd_config_show(config: &AgencyConfig, format: &str) -> anyhow::Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("{}", "Agency Configuration".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("  {}", "Server".yellow().bold());
    println!("    Base URL:         {}", config.server.base_url);
    println!("    Request timeout:  {}s", config.server.request_timeout_secs);
    println!("    Connect timeout:  {}s", config.server.connect_timeout_secs);
    println!();

    println!("  {}", "Chat".yellow().bold());
    let gating = match config.chat.gating {
        GatingMode::ServerDriven => "server-driven".to_string(),
        GatingMode::ClientCap => format!("client cap ({})", config.chat.free_message_limit),
    };
    println!("    Gating:           {}", gating);
    println!("    Greet on start:   {}", config.chat.greet_on_start);
    println!("    Default agent:    {}", config.chat.default_agent);
    println!();

    println!("  {}", "Wallet".yellow().bold());
    println!(
        "    RPC endpoint:     {}",
        config.wallet.rpc_url.as_deref().unwrap_or("-")
    );
    println!("    Download page:    {}", config.wallet.download_url);
    println!("    App link:         {}", config.wallet.deep_link());
    println!("    Open browser:     {}", config.wallet.open_browser);
    println!();

    println!("  {}", "Logging".yellow().bold());
    println!("    Level:            {}", config.logging.level);
    println!("    JSON:             {}", config.logging.json_format);
    if !config.logging.file_path.is_empty() {
        println!("    File:             {}", config.logging.file_path);
    }
    println!();

    println!("  {}", "TUI".yellow().bold());
    println!("    Tick rate:        {}ms", config.tui.tick_rate_ms);
    println!("    Theme:            {}", config.tui.theme);

    Ok(())
}

fn cmd_config_paths() -> anyhow::Result<()> {
    println!("{}", "Configuration Files".cyan().bold());
    println!();

    for path in get_config_paths() {
        let marker = if path.exists() {
            "✓".green().bold()
        } else {
            "·".dimmed()
        };
        println!("  {} {}", marker, path.display());
    }

    if let Some(dir) = get_data_dir() {
        println!();
        println!("  {} {}", "Data directory:".dimmed(), dir.display());
    }

    Ok(())
}

fn cmd_config_validate(config: anyhow::Result<AgencyConfig>) -> anyhow::Result<()> {
    match config {
        Ok(config) => {
            println!("{} Configuration is valid", "✓".green().bold());
            println!("  {} {}", "→".blue(), config.server.base_url);
            Ok(())
        }
        Err(e) => {
            println!("{} Configuration is invalid", "✗".red().bold());
            Err(e)
        }
    }
}
