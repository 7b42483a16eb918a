use std::io::Write;
use std::sync::Arc;

use agency_core::{
    format_time, project, short_address, AgencyConfig, AuthBus, Banner, Bubble, ChatLocation,
    ChatRoute, ChatTransport, ConversationId, MarkupLine, Platform, RequestOutcome, Role,
    SessionHolder,
};
use clap::Args;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::create_transport;
use super::wallet::{create_connector, describe_outcome, CliPlatform};

#[derive(Args)]
pub struct ChatArgs {
    #[arg(
        short,
        long,
        help = "Stored conversation id, or a location such as /chat?id=42"
    )]
    conversation: Option<String>,

    #[arg(long, help = "Skip the opening greeting")]
    no_greeting: bool,

    #[arg(short, long, help = "Send a single message and exit")]
    message: Option<String>,
}

enum ReplCommand<'a> {
    Send(&'a str),
    Connect,
    Clear,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_input(line: &str) -> ReplCommand<'_> {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" | "/q" => ReplCommand::Quit,
        "/connect" => ReplCommand::Connect,
        "/clear" => ReplCommand::Clear,
        "/help" | "/?" => ReplCommand::Help,
        other if other.starts_with('/') => ReplCommand::Unknown(other),
        _ => ReplCommand::Send(line),
    }
}

fn route_for(conversation: Option<&str>) -> ChatRoute {
    let Some(raw) = conversation else {
        return ChatRoute::Narrative;
    };
    let raw = raw.trim();
    let conversation = if raw.starts_with(ChatLocation::PATH) {
        ChatLocation::parse(raw).conversation
    } else {
        Some(raw)
            .filter(|id| !id.is_empty())
            .map(ConversationId::new)
    };
    match conversation {
        Some(id) => ChatRoute::Conversation(id),
        None => ChatRoute::Narrative,
    }
}

/// Prints messages appended since the last call and the banner when it changes.
struct Printer {
    printed: usize,
    banner: Option<Banner>,
}

impl Printer {
    fn new() -> Self {
        Self {
            printed: 0,
            banner: None,
        }
    }

    fn flush<T: ChatTransport>(&mut self, holder: &SessionHolder<T>) {
        let view = project(holder.state());
        if view.bubbles.len() < self.printed {
            self.printed = 0;
        }

        for bubble in &view.bubbles[self.printed..] {
            println!("{}", render_bubble(bubble));
            println!();
        }
        self.printed = view.bubbles.len();

        if view.banner != self.banner {
            if let Some(banner) = &view.banner {
                println!(
                    "{} {}  {}",
                    "!".yellow().bold(),
                    banner.text().yellow(),
                    format!("[/connect: {}]", banner.action_label()).dimmed()
                );
                println!();
            }
            self.banner = view.banner;
        }
    }
}

pub(crate) fn render_line(line: &MarkupLine) -> String {
    let mut out = String::new();
    if line.bullet {
        out.push_str("  • ");
    }
    for span in &line.spans {
        if span.bold {
            out.push_str(&span.text.bold().to_string());
        } else {
            out.push_str(&span.text);
        }
    }
    out
}

pub(crate) fn render_bubble(bubble: &Bubble) -> String {
    let header = match bubble.role {
        Role::User => "You".green().bold().to_string(),
        Role::Agent => bubble
            .badge
            .clone()
            .unwrap_or_else(|| "Agency".to_string())
            .cyan()
            .bold()
            .to_string(),
    };

    let mut out = format!("{} {}", header, format_time(bubble.created_at).dimmed());
    for line in &bubble.lines {
        out.push('\n');
        out.push_str("  ");
        out.push_str(&render_line(line));
    }
    out
}

fn print_help() {
    println!("{}", "Commands".yellow().bold());
    println!("  {:<10} Connect a wallet for unlimited access", "/connect");
    println!("  {:<10} Clear the conversation on screen", "/clear");
    println!("  {:<10} Show this help", "/help");
    println!("  {:<10} Leave the chat", "/quit");
    println!();
}

fn prompt() {
    print!("{} ", "›".green().bold());
    let _ = std::io::stdout().flush();
}

fn typing() {
    println!("{}", "Agent is typing...".dimmed().italic());
}

pub async fn handle_chat_command(config: AgencyConfig, args: ChatArgs) -> anyhow::Result<()> {
    let transport = create_transport(&config)?;
    let route = route_for(args.conversation.as_deref());

    let bus = AuthBus::new();
    let mut subscription = bus.subscribe();
    let platform: Arc<dyn Platform> = Arc::new(CliPlatform::new(&config));
    let connector = create_connector(&config, platform, bus)?;

    let mut holder = SessionHolder::new(transport)
        .with_route(route.clone())
        .with_policy(config.chat.gating_policy())
        .with_default_agent(config.chat.default_agent.clone());

    if let Some(address) = connector.check_connection().await {
        holder.restore_authentication(&address);
    }

    let mut printer = Printer::new();

    if let Some(message) = args.message {
        typing();
        let outcome = holder.send_message(&message).await;
        printer.flush(&holder);
        return match outcome {
            RequestOutcome::Replied => Ok(()),
            RequestOutcome::Ignored => anyhow::bail!("message not sent"),
            RequestOutcome::Gated => anyhow::bail!("free message limit reached"),
            RequestOutcome::Failed | RequestOutcome::Discarded => {
                anyhow::bail!("no reply from the agency")
            }
        };
    }

    println!("{}", "Solopreneur AI Agency".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    if let ChatRoute::Conversation(id) = &route {
        println!("  {} Conversation {}", "→".blue(), id.to_string().bold());
    }
    if let Some(address) = &holder.state().user_address {
        println!("  {} Wallet {}", "→".blue(), short_address(address).green());
    }
    println!("  {}", "Type /help for commands.".dimmed());
    println!();

    if config.chat.greet_on_start && !args.no_greeting {
        typing();
        holder.start_conversation().await;
        printer.flush(&holder);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => print_help(),
            ReplCommand::Clear => {
                holder.clear();
                printer.flush(&holder);
            }
            ReplCommand::Connect => {
                let outcome = connector.connect().await;
                describe_outcome(&outcome);
                holder.apply_auth_events(&mut subscription);
                println!();
                printer.flush(&holder);
            }
            ReplCommand::Unknown(cmd) => {
                println!("  {} Unknown command {}", "!".yellow(), cmd);
            }
            ReplCommand::Send(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                if !holder.can_send() {
                    printer.banner = None;
                    printer.flush(&holder);
                    continue;
                }
                println!();
                typing();
                holder.send_message(text).await;
                printer.flush(&holder);
            }
        }
    }

    holder.unmount();
    println!("{}", "Goodbye.".dimmed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_core::parse_markup;

    #[test]
    fn test_parse_input() {
        assert!(matches!(parse_input("/quit"), ReplCommand::Quit));
        assert!(matches!(parse_input("  /connect "), ReplCommand::Connect));
        assert!(matches!(parse_input("/clear"), ReplCommand::Clear));
        assert!(matches!(parse_input("/nope"), ReplCommand::Unknown("/nope")));
        assert!(matches!(parse_input("hello"), ReplCommand::Send("hello")));
    }

    #[test]
    fn test_route_for_accepts_id_or_location() {
        assert_eq!(route_for(None), ChatRoute::Narrative);
        assert_eq!(
            route_for(Some("42")),
            ChatRoute::Conversation(ConversationId::from(42))
        );
        assert_eq!(
            route_for(Some("/chat?id=7")),
            ChatRoute::Conversation(ConversationId::from(7))
        );
        assert_eq!(route_for(Some("/chat")), ChatRoute::Narrative);
        assert_eq!(
            route_for(Some("/chat?id=4%32")),
            ChatRoute::Conversation(ConversationId::from(42))
        );
        assert_eq!(
            route_for(Some("4%32")),
            ChatRoute::Conversation(ConversationId::new("4%32"))
        );
    }

    #[test]
    fn test_render_line_plain() {
        colored::control::set_override(false);
        let lines = parse_markup("Plan:\n• **Launch** first");

        assert_eq!(render_line(&lines[0]), "Plan:");
        assert_eq!(render_line(&lines[1]), "  • Launch first");
    }
}
