// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dispatcher: one inbound update in, one handled event out.
//!
//! Flow: persist the update, ask the form lookup whether an unfinished
//! conversation claims the chat, and only then fall back to the ordinary
//! handler scan. One update is processed per call; cross-event
//! concurrency for the same chat is not serialized here (last-writer-wins
//! on the form row).

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use chatform_core::types::InboundUpdate;
use chatform_core::{ChannelClient, ChatformError};
use chatform_forms::repository::FormRepository;
use chatform_forms::resume::find_active_form;
use chatform_forms::FormRegistry;
use chatform_storage::queries::{bots, updates};
use chatform_storage::Database;

use crate::handlers::DispatchContext;
use crate::registry::HandlerRegistry;

pub struct Dispatcher {
    db: Database,
    clients: HashMap<String, Arc<dyn ChannelClient>>,
    handlers: Arc<HandlerRegistry>,
    forms: Arc<FormRegistry>,
}

impl Dispatcher {
    pub fn new(
        db: Database,
        handlers: Arc<HandlerRegistry>,
        forms: Arc<FormRegistry>,
    ) -> Self {
        Self {
            db,
            clients: HashMap::new(),
            handlers,
            forms,
        }
    }

    /// Bind an outbound client to a bot slug.
    pub fn register_client(&mut self, slug: impl Into<String>, client: Arc<dyn ChannelClient>) {
        self.clients.insert(slug.into(), client);
    }

    /// Process one normalized inbound update for the given bot.
    pub async fn dispatch(&self, slug: &str, update: &InboundUpdate) -> Result<(), ChatformError> {
        let bot = bots::get_bot_by_slug(&self.db, slug)
            .await?
            .ok_or_else(|| ChatformError::UnknownBot { slug: slug.into() })?;
        let client = self
            .clients
            .get(slug)
            .ok_or_else(|| ChatformError::UnknownBot { slug: slug.into() })?
            .clone();

        let saved = updates::save_update(&self.db, &bot, update).await?;

        // An unfinished form claims the event before ordinary matching,
        // unless a suppress-form handler intercepts.
        if let Some(active) = find_active_form(&self.db, &saved).await? {
            if let Some(handler) = self
                .handlers
                .handlers_for(slug)
                .iter()
                .find(|h| h.suppress_form() && h.matches(update))
            {
                debug!(handler = handler.name(), "suppress-form handler matched");
                updates::set_handler(&self.db, saved.update.id, handler.name()).await?;
                let ctx = DispatchContext {
                    db: &self.db,
                    client: &*client,
                    bot: &bot,
                    saved: &saved,
                    update,
                    forms: &self.forms,
                };
                return handler.handle(&ctx).await;
            }

            debug!(form_id = active.form.id, kind = %active.form.kind, "form claims update");
            let mut repo = FormRepository::resumed(&self.db, &*client, &saved, &active);
            let mut form = repo.load(&self.forms, &active).await?;
            let input = update.input_text().unwrap_or_default().to_string();
            form.input(&input, &mut repo).await?;
            return Ok(());
        }

        for handler in self.handlers.handlers_for(slug) {
            if handler.matches(update) {
                debug!(handler = handler.name(), "handler matched");
                updates::set_handler(&self.db, saved.update.id, handler.name()).await?;
                let ctx = DispatchContext {
                    db: &self.db,
                    client: &*client,
                    bot: &bot,
                    saved: &saved,
                    update,
                    forms: &self.forms,
                };
                return handler.handle(&ctx).await;
            }
        }

        warn!(update_id = update.update_id, "no handler matched");
        Ok(())
    }
}
