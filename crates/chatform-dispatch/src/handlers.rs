// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The handler trait and the handlers shipped with the framework.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::debug;

use chatform_core::types::InboundUpdate;
use chatform_core::{ChannelClient, ChatformError};
use chatform_forms::form::Form;
use chatform_forms::repository::FormRepository;
use chatform_forms::FormRegistry;
use chatform_storage::models::{BotRow, SavedUpdate};
use chatform_storage::Database;

/// Everything a handler may act on for one inbound event.
pub struct DispatchContext<'a> {
    pub db: &'a Database,
    pub client: &'a dyn ChannelClient,
    pub bot: &'a BotRow,
    pub saved: &'a SavedUpdate,
    pub update: &'a InboundUpdate,
    pub forms: &'a FormRegistry,
}

/// A routing rule for inbound events.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable name, stamped on handled updates for audit.
    fn name(&self) -> &str;

    /// Whether this handler claims the event. Handlers are scanned in
    /// registration order; the first match wins.
    fn matches(&self, update: &InboundUpdate) -> bool;

    async fn handle(&self, ctx: &DispatchContext<'_>) -> Result<(), ChatformError>;

    /// When true, a match intercepts the event even while an unfinished
    /// form owns the chat.
    fn suppress_form(&self) -> bool {
        false
    }
}

/// Boxed async callback invoked by [`CommandHandler`] and
/// [`DefaultHandler`].
pub type HandlerCallback =
    Arc<dyn for<'a> Fn(&'a DispatchContext<'a>) -> BoxFuture<'a, Result<(), ChatformError>> + Send + Sync>;

/// Wrap an async closure as a [`HandlerCallback`].
///
/// ```ignore
/// let cb = handler_fn(|ctx| Box::pin(async move {
///     ctx.client.send_message(ctx.saved.chat.chat_id, "pong", None).await?;
///     Ok(())
/// }));
/// ```
pub fn handler_fn<F>(f: F) -> HandlerCallback
where
    F: for<'a> Fn(&'a DispatchContext<'a>) -> BoxFuture<'a, Result<(), ChatformError>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(f)
}

/// Does the message text begin with the given bot command?
///
/// Accepts `/cmd`, `/cmd args`, and the `/cmd@botname` addressing form.
pub fn is_command(text: &str, command: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    let head = first.split('@').next().unwrap_or("");
    head == command
}

/// Runs a callback when a message starts with a bot command.
pub struct CommandHandler {
    name: String,
    command: String,
    callback: HandlerCallback,
    suppress_form: bool,
}

impl CommandHandler {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        callback: HandlerCallback,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            callback,
            suppress_form: false,
        }
    }

    /// Let this command intercept events even mid-form.
    pub fn suppress_form(mut self, suppress: bool) -> Self {
        self.suppress_form = suppress;
        self
    }
}

#[async_trait]
impl Handler for CommandHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, update: &InboundUpdate) -> bool {
        update
            .input_text()
            .map(|text| is_command(text, &self.command))
            .unwrap_or(false)
    }

    async fn handle(&self, ctx: &DispatchContext<'_>) -> Result<(), ChatformError> {
        (self.callback)(ctx).await
    }

    fn suppress_form(&self) -> bool {
        self.suppress_form
    }
}

/// Starts a registered form when its command arrives.
pub struct FormHandler {
    name: String,
    command: String,
    form_kind: String,
}

impl FormHandler {
    pub fn new(
        name: impl Into<String>,
        command: impl Into<String>,
        form_kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            form_kind: form_kind.into(),
        }
    }
}

#[async_trait]
impl Handler for FormHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, update: &InboundUpdate) -> bool {
        update
            .input_text()
            .map(|text| is_command(text, &self.command))
            .unwrap_or(false)
    }

    async fn handle(&self, ctx: &DispatchContext<'_>) -> Result<(), ChatformError> {
        let def = ctx.forms.get(&self.form_kind)?;
        debug!(kind = %self.form_kind, "starting form");
        let mut form = Form::new(def);
        let mut repo = FormRepository::new(
            ctx.db,
            ctx.client,
            ctx.saved,
            Some(self.name.clone()),
        );
        form.start(&mut repo).await?;
        Ok(())
    }
}

/// Matches every event. Register last as the fallback.
pub struct DefaultHandler {
    name: String,
    callback: Option<HandlerCallback>,
}

impl DefaultHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: HandlerCallback) -> Self {
        self.callback = Some(callback);
        self
    }
}

#[async_trait]
impl Handler for DefaultHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, _update: &InboundUpdate) -> bool {
        true
    }

    async fn handle(&self, ctx: &DispatchContext<'_>) -> Result<(), ChatformError> {
        match &self.callback {
            Some(callback) => callback(ctx).await,
            None => {
                debug!(update_id = ctx.update.update_id, "default handler drop");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_matching_forms() {
        assert!(is_command("/start", "/start"));
        assert!(is_command("/start now", "/start"));
        assert!(is_command("/start@fatherbot", "/start"));
        assert!(!is_command("/started", "/start"));
        assert!(!is_command("say /start", "/start"));
        assert!(!is_command("", "/start"));
    }
}
