use agency_core::{
    format_timestamp, project, AgencyConfig, ChatRoute, ChatTransport, ConversationDirectory,
    ConversationId, DeleteOutcome, HttpTransport, RequestOutcome, SessionHolder, StoredMessage,
};
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use super::chat::render_bubble;
use super::create_transport;

const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Subcommand)]
pub enum ConversationsCommand {
    #[command(about = "List stored conversations")]
    List {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Create a new conversation")]
    New,

    #[command(about = "Delete a conversation")]
    Delete {
        #[arg(help = "Conversation id")]
        id: String,
    },

    #[command(about = "Show the messages of a conversation")]
    Show {
        #[arg(help = "Conversation id")]
        id: String,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Send a message to a stored conversation")]
    Send {
        #[arg(help = "Conversation id")]
        id: String,

        #[arg(help = "Message text")]
        message: String,
    },
}

pub async fn handle_conversations_command(
    config: AgencyConfig,
    cmd: Option<ConversationsCommand>,
) -> anyhow::Result<()> {
    let transport = create_transport(&config)?;

    match cmd.unwrap_or(ConversationsCommand::List {
        format: "text".to_string(),
    }) {
        ConversationsCommand::List { format } => cmd_conversations_list(transport, &format).await,
        ConversationsCommand::New => cmd_conversations_new(transport).await,
        ConversationsCommand::Delete { id } => {
            cmd_conversations_delete(transport, ConversationId::new(id)).await
        }
        ConversationsCommand::Show { id, format } => {
            cmd_conversations_show(transport, ConversationId::new(id), &format).await
        }
        ConversationsCommand::Send { id, message } => {
            cmd_conversations_send(transport, ConversationId::new(id), &message).await
        }
    }
}

async fn cmd_conversations_list(transport: HttpTransport, format: &str) -> anyhow::Result<()> {
    let mut directory = ConversationDirectory::new(transport);
    let conversations = directory.refresh().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!("{}", "No conversations yet.".yellow());
        println!(
            "{}",
            "Create one with 'agency conversations new'.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Conversations".cyan().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Title").fg(Color::White),
            Cell::new("Created").fg(Color::White),
            Cell::new("Updated").fg(Color::White),
        ]);

    for conversation in conversations {
        table.add_row(vec![
            Cell::new(conversation.id.as_str()).fg(Color::Cyan),
            Cell::new(truncate_string(&conversation.title, 40)),
            Cell::new(format_timestamp(&conversation.created_at, LISTING_TIME_FORMAT)),
            Cell::new(format_timestamp(&conversation.updated_at, LISTING_TIME_FORMAT)),
        ]);
    }

    println!("{table}");
    println!();
    println!("  Total: {} conversation(s)", conversations.len());

    Ok(())
}

async fn cmd_conversations_new(transport: HttpTransport) -> anyhow::Result<()> {
    let mut directory = ConversationDirectory::new(transport);
    let (id, location) = directory.create().await?;

    println!(
        "{} Created conversation {}",
        "✓".green().bold(),
        id.to_string().cyan()
    );
    println!("  {} {}", "Location:".dimmed(), location);
    println!(
        "  {} agency chat --conversation {}",
        "Open with:".dimmed(),
        id
    );

    Ok(())
}

async fn cmd_conversations_delete(
    transport: HttpTransport,
    id: ConversationId,
) -> anyhow::Result<()> {
    let mut directory = ConversationDirectory::new(transport);

    match directory.delete(&id).await? {
        DeleteOutcome::ClearedCurrent(location) => println!(
            "{} Deleted conversation {}, back to {}",
            "✓".green().bold(),
            id.to_string().cyan(),
            location
        ),
        DeleteOutcome::Removed => println!(
            "{} Deleted conversation {}",
            "✓".green().bold(),
            id.to_string().cyan()
        ),
    }

    Ok(())
}

async fn cmd_conversations_show(
    transport: HttpTransport,
    id: ConversationId,
    format: &str,
) -> anyhow::Result<()> {
    let mut holder = SessionHolder::new(transport).with_route(ChatRoute::Conversation(id.clone()));

    if format == "json" {
        let messages: Vec<StoredMessage> = holder.transport().list_messages(&id).await?;
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if holder.start_conversation().await == RequestOutcome::Failed {
        anyhow::bail!("could not load conversation {}", id);
    }

    println!("{} {}", "Conversation".cyan().bold(), id.to_string().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    let view = project(holder.state());
    if view.bubbles.is_empty() {
        println!("{}", "No messages yet.".yellow());
        return Ok(());
    }

    for bubble in &view.bubbles {
        println!("{}", render_bubble(bubble));
        println!();
    }

    Ok(())
}

async fn cmd_conversations_send(
    transport: HttpTransport,
    id: ConversationId,
    message: &str,
) -> anyhow::Result<()> {
    let mut holder = SessionHolder::new(transport).with_route(ChatRoute::Conversation(id));

    let outcome = holder.send_message(message).await;
    let view = project(holder.state());

    match outcome {
        RequestOutcome::Replied => {
            if let Some(reply) = view.bubbles.last() {
                println!("{}", render_bubble(reply));
            }
            Ok(())
        }
        RequestOutcome::Ignored => anyhow::bail!("message is empty"),
        _ => {
            let detail = holder
                .state()
                .last_message()
                .map(|m| m.text.clone())
                .unwrap_or_default();
            anyhow::bail!(detail)
        }
    }
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
