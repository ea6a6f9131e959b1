//! Provider inspection commands: show the configured provider, test it.

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use parley_infra::config::CONFIG_FILE;
use parley_infra::llm::{create_provider, test_provider_connection};
use parley_infra::secret::resolve_api_key;

use crate::state::AppState;

/// Provider subcommands.
#[derive(Subcommand)]
pub enum ProviderCommand {
    /// Show the configured provider and whether its API key is present.
    Show,

    /// Send a tiny test prompt to verify the key and endpoint.
    Check,
}

pub async fn handle_provider_command(
    cmd: ProviderCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        ProviderCommand::Show => provider_show(state, json),
        ProviderCommand::Check => provider_check(state, json).await,
    }
}

fn provider_show(state: &AppState, json: bool) -> Result<()> {
    let provider = &state.config.provider;
    let key_present = resolve_api_key(provider).is_some();

    if json {
        let out = serde_json::json!({
            "provider": provider,
            "api_key_present": key_present,
            "config_path": state.data_dir.join(CONFIG_FILE),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let key_status = if key_present {
        style("set").green().to_string()
    } else {
        style("missing").red().bold().to_string()
    };

    println!();
    println!("  {}      {}", style("Name:").bold(), style(&provider.name).cyan());
    println!("  {}      {}", style("Type:").bold(), provider.provider_type);
    println!("  {}     {}", style("Model:").bold(), provider.model);
    if let Some(base_url) = &provider.base_url {
        println!("  {}  {}", style("Base URL:").bold(), base_url);
    }
    println!(
        "  {}   {} ({})",
        style("API key:").bold(),
        provider.api_key_env.as_deref().unwrap_or("<none>"),
        key_status
    );
    println!(
        "  {}    {}",
        style("Config:").bold(),
        style(state.data_dir.join(CONFIG_FILE).display()).dim()
    );
    println!();
    Ok(())
}

async fn provider_check(state: &AppState, json: bool) -> Result<()> {
    let config = &state.config.provider;
    let provider = create_provider(config, resolve_api_key(config));

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        let spinner = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")
        {
            spinner.set_style(spinner_style);
        }
        spinner.set_message(format!("Testing connection to {} ({})...", config.name, config.model));
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    };

    let result = match provider {
        Ok(provider) => test_provider_connection(&provider).await,
        Err(e) => Err(e),
    };
    spinner.finish_and_clear();

    if json {
        let out = serde_json::json!({
            "provider": config.name,
            "model": config.model,
            "connected": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match result {
        Ok(()) => {
            println!(
                "  {} Connected to {} ({}).",
                style("✓").green().bold(),
                style(&config.name).cyan(),
                config.model
            );
            Ok(())
        }
        Err(e) => {
            eprintln!(
                "  {} Connection test failed: {}",
                style("!").red().bold(),
                e
            );
            if let Some(env) = &config.api_key_env {
                eprintln!(
                    "  {} Make sure {} is exported in your shell.",
                    style("Tip:").dim(),
                    style(env).cyan()
                );
            }
            anyhow::bail!("provider '{}' is not reachable", config.name)
        }
    }
}
