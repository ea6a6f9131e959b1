//! CLI command definitions for the `parley` binary.
//!
//! Uses clap derive macros for argument parsing. Session commands take the
//! session id as their first argument (e.g., `parley send <ID> "hello"`).

pub mod chat;
pub mod provider;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_types::chat::DEFAULT_SESSION_TITLE;

/// Chat with an AI model, one persistent session at a time.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans via OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tracing filter directives for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,parley=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new chat session.
    New {
        /// Session title.
        #[arg(default_value = DEFAULT_SESSION_TITLE)]
        title: String,
    },

    /// List sessions, most recently updated first.
    #[command(alias = "ls")]
    List,

    /// Show a session and its messages.
    Show {
        /// Session ID.
        id: String,
    },

    /// Rename a session.
    Rename {
        /// Session ID.
        id: String,

        /// New title.
        title: String,
    },

    /// Delete a session.
    #[command(alias = "rm")]
    Delete {
        /// Session ID.
        id: String,

        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Send one message to a session and print the reply.
    Send {
        /// Session ID.
        id: String,

        /// Message text.
        message: String,

        /// Model override for this message.
        #[arg(long)]
        model: Option<String>,
    },

    /// Start an interactive chat (creates a new session without an ID).
    Chat {
        /// Session ID to continue.
        id: Option<String>,

        /// Model override for every message in this chat.
        #[arg(long)]
        model: Option<String>,
    },

    /// Inspect the configured LLM provider.
    Provider {
        #[command(subcommand)]
        action: provider::ProviderCommand,
    },

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse a session id argument.
pub fn parse_session_id(id: &str) -> anyhow::Result<uuid::Uuid> {
    id.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid session ID '{id}' (expected a UUID)"))
}
