// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` and `set-webhook` subcommands.

use std::sync::Arc;

use tracing::info;

use chatform_config::ChatformConfig;
use chatform_core::ChatformError;
use chatform_dispatch::{DefaultHandler, Dispatcher, HandlerRegistry};
use chatform_forms::FormRegistry;
use chatform_gateway::server::{AppState, ServerConfig};
use chatform_gateway::{start_server, Worker};
use chatform_storage::queries::bots;
use chatform_storage::Database;
use chatform_telegram::TelegramClient;

/// Build the registries this host serves.
///
/// Deployments embedding the framework register their own forms and
/// handlers here; the default host only installs a logging fallback so
/// every bot answers dispatch without side effects.
pub fn build_registries(config: &ChatformConfig) -> (HandlerRegistry, FormRegistry) {
    let mut handlers = HandlerRegistry::new();
    for bot in &config.bots {
        handlers.register(&bot.slug, Arc::new(DefaultHandler::new("default")));
    }
    (handlers, FormRegistry::new())
}

/// Open storage, sync bots from config, and run gateway plus worker.
pub async fn serve(config: &ChatformConfig) -> Result<(), ChatformError> {
    let db = Database::open(&config.storage.database_path).await?;

    let (handlers, forms) = build_registries(config);
    let mut dispatcher = Dispatcher::new(db.clone(), Arc::new(handlers), Arc::new(forms));

    for bot in &config.bots {
        bots::upsert_bot(&db, &bot.slug, bot.display_name(), &bot.token).await?;
        let client = TelegramClient::new(&bot.token)?;
        dispatcher.register_client(&bot.slug, Arc::new(client));
        info!(slug = %bot.slug, "bot registered");
    }

    let worker = Worker::new(db.clone(), Arc::new(dispatcher));
    tokio::spawn(async move { worker.run().await });

    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };
    start_server(&server_config, AppState { db }).await
}

/// Register `{public_url}/bots/{slug}/webhook` for every configured bot.
pub async fn set_webhook(config: &ChatformConfig) -> Result<(), ChatformError> {
    let base = config.gateway.public_url.as_deref().ok_or_else(|| {
        ChatformError::Config("gateway.public_url is required for set-webhook".into())
    })?;
    let base = base.trim_end_matches('/');

    for bot in &config.bots {
        let client = TelegramClient::new(&bot.token)?;
        let url = format!("{base}/bots/{}/webhook", bot.slug);
        client.set_webhook(&url).await?;
        info!(slug = %bot.slug, %url, "webhook registered");
    }
    Ok(())
}
