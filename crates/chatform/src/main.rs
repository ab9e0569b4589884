// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! chatform - a conversational form bot framework.
//!
//! This binary wires the framework together: configuration, storage,
//! handler/form registries, the webhook gateway, and the queue worker.
//! Deployments embedding the library register their own handlers and
//! form kinds; this host registers only a logging fallback per bot.

mod serve;

use clap::{Parser, Subcommand};

/// chatform - a conversational form bot framework.
#[derive(Parser, Debug)]
#[command(name = "chatform", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook gateway and queue worker.
    Serve,
    /// Register the configured webhook URL with the platform.
    SetWebhook,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match chatform_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            chatform_config::render_errors(errors);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let result = match cli.command {
        Some(Commands::Serve) => serve::serve(&config).await,
        Some(Commands::SetWebhook) => serve::set_webhook(&config).await,
        None => {
            println!("chatform: use --help for available commands");
            Ok(())
        }
    };

    if let Err(error) = result {
        tracing::error!(%error, "chatform exited with an error");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config = chatform_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.log_level, "info");
        assert!(config.bots.is_empty());
    }
}
