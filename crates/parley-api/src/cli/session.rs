//! Session CLI commands: new, list, show, rename, delete, send.
//!
//! Rich tables for listings, a spinner while waiting on the provider, and a
//! confirmation prompt before deletion.

use std::time::Duration;

use anyhow::{Context, Result};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use uuid::Uuid;

use parley_types::chat::{ChatMessage, Role, Session, sort_by_recent};
use parley_types::error::ChatError;

use crate::state::AppState;

/// Create a new session.
///
/// ```bash
/// parley new "Trip planning"
/// ```
pub async fn new_session(state: &AppState, title: &str, json: bool) -> Result<()> {
    let title = title.trim();
    anyhow::ensure!(!title.is_empty(), "Session title cannot be empty");

    let session = state.chat_service.create_session(title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!("  {} Session created", style("✓").green().bold());
    println!("  {}  {}", style("Title:").bold(), style(&session.title).cyan());
    println!("  {}     {}", style("ID:").bold(), style(session.id).dim());
    println!();
    println!(
        "  Start chatting with: {}",
        style(format!("parley chat {}", session.id)).yellow()
    );
    println!();
    Ok(())
}

/// List sessions, most recently updated first.
pub async fn list_sessions(state: &AppState, json: bool) -> Result<()> {
    let mut sessions = state.chat_service.get_sessions().await?;
    sort_by_recent(&mut sessions);

    if json {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!();
        println!(
            "  {} No sessions yet. Start one with: {}",
            style("i").blue().bold(),
            style("parley chat").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
        Cell::new("Last message").fg(Color::White),
    ]);

    for session in &sessions {
        let preview = match session.last_message() {
            Some(msg) if session.awaiting_reply() => {
                Cell::new(format!("(no reply) {}", truncate(&msg.content, 32))).fg(Color::Red)
            }
            Some(msg) => Cell::new(truncate(&msg.content, 40)).fg(Color::DarkGrey),
            None => Cell::new("-").fg(Color::DarkGrey),
        };

        table.add_row(vec![
            Cell::new(session.id.to_string()).fg(Color::DarkGrey),
            Cell::new(truncate(&session.title, 40)).fg(Color::Cyan),
            Cell::new(session.message_count().to_string()).fg(Color::White),
            Cell::new(session.updated_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::White),
            preview,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} session{}",
        style(sessions.len()).bold(),
        if sessions.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}

/// Show a session transcript.
pub async fn show_session(state: &AppState, id: Uuid, json: bool) -> Result<()> {
    let session = fetch(state, id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&session.title).cyan().bold());
    println!(
        "  {} {}  {} {}  {} {}",
        style("ID:").dim(),
        session.id,
        style("Created:").dim(),
        session.created_at.format("%Y-%m-%d %H:%M UTC"),
        style("Updated:").dim(),
        session.updated_at.format("%Y-%m-%d %H:%M UTC"),
    );
    println!();

    if session.messages.is_empty() {
        println!("  {}", style("(no messages)").dim());
        println!();
        return Ok(());
    }

    for msg in &session.messages {
        print_message(msg);
    }

    if session.awaiting_reply() {
        println!(
            "  {} The last message never got a reply. Re-send it with {}",
            style("!").yellow().bold(),
            style(format!("parley send {} \"...\"", session.id)).yellow()
        );
        println!();
    }
    Ok(())
}

/// Rename a session.
pub async fn rename_session(state: &AppState, id: Uuid, title: &str, json: bool) -> Result<()> {
    let title = title.trim();
    anyhow::ensure!(!title.is_empty(), "Session title cannot be empty");

    let session = state.chat_service.rename_session(&id, title).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        println!(
            "  {} Session renamed to '{}'.",
            style("✓").green().bold(),
            style(&session.title).cyan()
        );
    }
    Ok(())
}

/// Delete a session with confirmation.
///
/// ```bash
/// parley delete <session-id>
/// parley delete <session-id> --force
/// ```
pub async fn delete_session(state: &AppState, id: Uuid, force: bool, json: bool) -> Result<()> {
    let session = fetch(state, id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete session '{}' ({} messages)?",
                style(&session.title).red().bold(),
                session.message_count()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_service.delete_session(&id).await?;

    if json {
        println!(
            "{}",
            serde_json::json!({"deleted": true, "session_id": id.to_string()})
        );
    } else {
        println!(
            "  {} Session '{}' deleted.",
            style("x").red().bold(),
            session.title
        );
    }
    Ok(())
}

/// Send one message and print the reply.
pub async fn send(
    state: &AppState,
    id: Uuid,
    message: &str,
    model: Option<&str>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let content = message_content(message)?;

    let reply = match send_with_spinner(state, id, content, model, json || quiet).await {
        Ok(reply) => reply,
        Err(err) => {
            if !json {
                print_send_failure(&err, id);
            }
            return Err(err.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else if quiet {
        println!("{}", reply.content);
    } else {
        println!();
        print_message(&reply);
    }
    Ok(())
}

// --- Shared helpers (also used by the interactive chat) ---

/// Load a session or fail with a "not found" error.
pub async fn fetch(state: &AppState, id: Uuid) -> Result<Session> {
    state
        .chat_service
        .get_session(&id)
        .await?
        .with_context(|| format!("Session '{id}' not found"))
}

/// Run `send_message` behind a spinner (hidden when `silent`).
pub async fn send_with_spinner(
    state: &AppState,
    id: Uuid,
    content: &str,
    model: Option<&str>,
    silent: bool,
) -> Result<ChatMessage, ChatError> {
    let spinner = if silent {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(spinner_style);
        }
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let result = state.chat_service.send_message(&id, content, model).await;
    spinner.finish_and_clear();
    result
}

/// Explain a failed send. The user turn stays persisted, so the fix is to re-send.
pub fn print_send_failure(err: &ChatError, id: Uuid) {
    match err {
        ChatError::NotFound(_) => {
            eprintln!("  {} Session '{id}' not found.", style("!").red().bold());
        }
        ChatError::RateLimited { retry_after_ms } => {
            eprintln!("  {} The AI provider is rate limiting requests.", style("!").yellow().bold());
            if let Some(ms) = retry_after_ms {
                eprintln!("  {} Try again in about {}s.", style("Tip:").dim(), ms.div_ceil(1000));
            }
            eprintln!(
                "  {} Your message was saved; re-send it once the limit resets.",
                style("Tip:").dim()
            );
        }
        ChatError::ProviderFailure(e) => {
            eprintln!("  {} The AI provider failed: {e}", style("!").red().bold());
            eprintln!(
                "  {} Your message was saved; re-send it with {}",
                style("Tip:").dim(),
                style(format!("parley send {id} \"...\"")).cyan()
            );
        }
        ChatError::StoreFailure(e) => {
            eprintln!("  {} Could not save the session: {e}", style("!").red().bold());
        }
    }
}

pub fn print_message(msg: &ChatMessage) {
    let label = match msg.role {
        Role::User => style("You").green().bold(),
        Role::Model => style("AI").magenta().bold(),
        Role::System => style("System").dim().bold(),
    };
    println!("  {} {}", label, style(msg.timestamp.format("%H:%M")).dim());
    for line in msg.content.lines() {
        println!("  {line}");
    }
    println!();
}

/// Reject blank messages. Accepted content is sent as typed.
fn message_content(message: &str) -> Result<&str> {
    anyhow::ensure!(!message.trim().is_empty(), "Message cannot be empty");
    Ok(message)
}

/// Shorten to at most `max` characters, marking the cut with "...".
fn truncate(s: &str, max: usize) -> String {
    let single_line = s.replace('\n', " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let kept: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
