//! Interactive chat loop.
//!
//! Reads user turns from the terminal, sends each through the chat service
//! and prints the reply. Slash commands control the loop itself.

use anyhow::Result;
use console::style;
use dialoguer::Input;
use uuid::Uuid;

use parley_types::chat::DEFAULT_SESSION_TITLE;

use super::session::{fetch, print_message, print_send_failure, send_with_spinner};
use crate::state::AppState;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Message(String),
    Rename(String),
    Help,
    Exit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> ChatInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line.to_string());
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(n, a)| (n, a.trim()))
        .unwrap_or((command, ""));

    match name {
        "exit" | "quit" | "q" => ChatInput::Exit,
        "help" | "?" => ChatInput::Help,
        "rename" if !arg.is_empty() => ChatInput::Rename(arg.to_string()),
        other => ChatInput::Unknown(other.to_string()),
    }
}

/// Run an interactive chat on `id`, or on a fresh session when `id` is `None`.
pub async fn run_chat(state: &AppState, id: Option<Uuid>, model: Option<&str>) -> Result<()> {
    let session = match id {
        Some(id) => fetch(state, id).await?,
        None => state.chat_service.create_session(DEFAULT_SESSION_TITLE).await?,
    };
    let session_id = session.id;
    let mut title = session.title.clone();

    println!();
    println!(
        "  {} {}  {}",
        style("Parley").magenta().bold(),
        style(&title).cyan(),
        style(format!("({session_id})")).dim()
    );
    println!(
        "  {}",
        style("Type a message, /help for commands, /exit to leave.").dim()
    );
    println!();

    for msg in &session.messages {
        print_message(msg);
    }

    loop {
        let line: String = Input::new()
            .with_prompt(format!("{}", style("You").green().bold()))
            .allow_empty(true)
            .interact_text()?;

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => break,
            ChatInput::Help => print_help(),
            ChatInput::Unknown(cmd) => {
                println!("  {} Unknown command '/{cmd}'. Try /help.", style("?").yellow());
            }
            ChatInput::Rename(new_title) => {
                let renamed = state.chat_service.rename_session(&session_id, &new_title).await?;
                title = renamed.title;
                println!("  {} Renamed to '{}'.", style("✓").green(), style(&title).cyan());
            }
            ChatInput::Message(content) => {
                match send_with_spinner(state, session_id, &content, model, false).await {
                    Ok(reply) => {
                        println!();
                        print_message(&reply);
                    }
                    Err(err) => {
                        print_send_failure(&err, session_id);
                        continue;
                    }
                }

                // The first exchange may have retitled the session.
                if let Some(current) = state.chat_service.get_session(&session_id).await? {
                    if current.title != title {
                        title = current.title;
                        println!("  {} {}", style("Titled:").dim(), style(&title).cyan());
                        println!();
                    }
                }
            }
        }
    }

    println!(
        "  {} Session saved. Resume with {}",
        style("✓").green(),
        style(format!("parley chat {session_id}")).yellow()
    );
    Ok(())
}

fn print_help() {
    println!();
    println!("  {}          leave the chat", style("/exit").cyan());
    println!("  {} {}  rename this session", style("/rename").cyan(), style("<title>").dim());
    println!("  {}          show this help", style("/help").cyan());
    println!();
}
