use std::io;
use std::path::PathBuf;

use agency_core::{
    ensure_data_dir, init_logging, AgencyConfig, AgencyError, ChatRoute, ConversationId,
    LogTarget,
};
use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

mod app;
mod events;
mod platform;
mod theme;
mod ui;

use app::App;

const LOG_FILE: &str = "agency-tui.log";

#[derive(Parser)]
#[command(name = "agency-tui")]
#[command(version)]
#[command(about = "Full-screen chat with the Solopreneur AI Agency")]
struct Args {
    #[arg(short, long, help = "Open a stored conversation by id")]
    conversation: Option<String>,

    #[arg(long, help = "Backend base URL (overrides configuration)")]
    server: Option<String>,

    #[arg(long, env = "AGENCY_CONFIG", help = "Extra configuration file")]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config =
        AgencyConfig::load_with(args.config.as_deref()).map_err(AgencyError::from)?;
    if let Some(url) = args.server {
        config.server.base_url = url;
        config.validate()?;
    }

    setup_logging(&config, args.verbose);

    let route = match args.conversation {
        Some(id) => ChatRoute::Conversation(ConversationId::new(id)),
        None => ChatRoute::Narrative,
    };

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &config, route);
    restore_terminal(&mut terminal)?;

    if let Err(e) = result {
        eprintln!("Application error: {e}");
        return Err(e);
    }

    Ok(())
}

/// The screen belongs to the UI, so logs go to a file.
fn setup_logging(config: &AgencyConfig, verbose: bool) {
    let default_file = ensure_data_dir()
        .unwrap_or_else(|_| std::env::temp_dir())
        .join(LOG_FILE);
    let target = LogTarget::resolve(&config.logging, LogTarget::File(default_file));

    if let Err(e) = init_logging(&config.logging, verbose, target) {
        eprintln!("Logging disabled: {e}");
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: &AgencyConfig,
    route: ChatRoute,
) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let mut app = App::new(config, route)?;
        app.run(terminal).await
    })
}
