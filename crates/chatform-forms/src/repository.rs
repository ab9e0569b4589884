// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The persistence bridge binding one inbound update to storage and the
//! outbound channel.
//!
//! Persist order is fixed: the form row and field rows are saved BEFORE
//! the outbound prompt is sent, so a crashed send leaves a resumable
//! form. Message pointers are stamped after the send succeeds, since
//! they need the sent message id. One durable row per conversation;
//! saves are last-writer-wins.

use tracing::debug;

use chatform_core::types::{InlineKeyboard, SentMessage};
use chatform_core::{ChannelClient, ChatformError};
use chatform_storage::models::{ChatRow, MessageRow, SavedUpdate, UpdateRow};
use chatform_storage::queries::{forms as form_queries, messages, updates};
use chatform_storage::Database;

use crate::error::FormError;
use crate::form::{Form, FormDefinition, FormState};
use crate::graph::PromptKind;
use crate::registry::FormRegistry;
use crate::resume::ActiveForm;
use crate::snapshot;

/// Repository for one form conversation, scoped to one inbound update.
pub struct FormRepository<'a> {
    db: &'a Database,
    client: &'a dyn ChannelClient,
    chat: ChatRow,
    update: UpdateRow,
    /// The stored message this update revolves around.
    inbound: MessageRow,
    /// The root prompt message, once known.
    root: Option<MessageRow>,
    /// The latest outbound prompt -- the edit target for in-place updates.
    anchor: Option<MessageRow>,
    form_row_id: Option<i64>,
    handler: Option<String>,
}

impl<'a> FormRepository<'a> {
    /// Repository for a conversation being started by a handler.
    pub fn new(
        db: &'a Database,
        client: &'a dyn ChannelClient,
        saved: &SavedUpdate,
        handler: Option<String>,
    ) -> Self {
        Self {
            db,
            client,
            chat: saved.chat.clone(),
            update: saved.update.clone(),
            inbound: saved.message.clone(),
            root: None,
            anchor: None,
            form_row_id: None,
            handler,
        }
    }

    /// Repository for a conversation resumed through the lookup.
    pub fn resumed(
        db: &'a Database,
        client: &'a dyn ChannelClient,
        saved: &SavedUpdate,
        active: &ActiveForm,
    ) -> Self {
        Self {
            db,
            client,
            chat: saved.chat.clone(),
            update: saved.update.clone(),
            inbound: saved.message.clone(),
            root: Some(active.root.clone()),
            anchor: Some(active.anchor.clone()),
            form_row_id: Some(active.form.id),
            handler: active.form.handler.clone(),
        }
    }

    pub fn chat(&self) -> &ChatRow {
        &self.chat
    }

    pub fn update_row(&self) -> &UpdateRow {
        &self.update
    }

    pub fn form_row_id(&self) -> Option<i64> {
        self.form_row_id
    }

    /// Rehydrate the form a lookup resolved: definition from the
    /// registry by stored kind, state from the snapshot and field rows.
    pub async fn load(
        &self,
        registry: &FormRegistry,
        active: &ActiveForm,
    ) -> Result<Form, FormError> {
        let def = registry.get(&active.form.kind)?;
        let snapshot: snapshot::FormSnapshot = serde_json::from_str(&active.form.context)
            .map_err(|e| FormError::InvalidSnapshot(e.to_string()))?;

        let field_rows = form_queries::get_fields(self.db, active.form.id).await?;
        let mut records = Vec::with_capacity(field_rows.len());
        for row in field_rows {
            let value = row
                .value
                .as_deref()
                .map(serde_json::from_str)
                .transpose()
                .map_err(|e| FormError::InvalidSnapshot(e.to_string()))?;
            records.push(snapshot::FieldRecord {
                name: row.name,
                value,
                is_valid: row.is_valid,
            });
        }

        let state = snapshot::restore(&def, &snapshot, &records)?;
        Ok(Form::from_state(def, state))
    }

    /// Persist the conversation: form row, field rows, and the handler
    /// audit stamp on the inbound update.
    pub async fn save(
        &mut self,
        def: &FormDefinition,
        state: &FormState,
    ) -> Result<(), FormError> {
        let (snapshot, records) = snapshot::capture(def, state);
        let context = serde_json::to_string(&snapshot)
            .map_err(|e| FormError::InvalidSnapshot(e.to_string()))?;

        let form_id = match self.form_row_id {
            Some(id) => {
                form_queries::update_form(
                    self.db,
                    id,
                    snapshot.current_field.as_deref(),
                    &context,
                    snapshot.is_finished,
                )
                .await?;
                id
            }
            None => {
                let row = form_queries::create_form(
                    self.db,
                    def.kind(),
                    snapshot.current_field.as_deref(),
                    &context,
                    snapshot.is_finished,
                    self.handler.as_deref(),
                )
                .await?;
                debug!(form_id = row.id, kind = def.kind(), "form row created");
                self.form_row_id = Some(row.id);
                row.id
            }
        };

        for record in &records {
            let value = record
                .value
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| FormError::InvalidSnapshot(e.to_string()))?;
            form_queries::upsert_field(
                self.db,
                form_id,
                &record.name,
                value.as_deref(),
                record.is_valid,
            )
            .await?;
        }

        if let Some(handler) = self.handler.as_deref() {
            updates::set_handler(self.db, self.update.id, handler).await?;
        }

        Ok(())
    }

    /// Deliver the current field's prompt and stamp the form pointers.
    ///
    /// `UpdateMessage` edits the latest prompt in place when one exists;
    /// everything else sends a fresh message. The first prompt of a
    /// conversation becomes the root and takes the `form_id` pointer;
    /// later prompts point back at it through `form_root_id`, which is
    /// how the next inbound reply finds its way here.
    pub async fn send_prompt(
        &mut self,
        kind: PromptKind,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), FormError> {
        let form_id = self.form_row_id.ok_or_else(|| {
            FormError::Chatform(ChatformError::Internal(
                "prompt sent before the form was saved".into(),
            ))
        })?;

        let sent = match (kind, self.anchor.as_ref()) {
            (PromptKind::UpdateMessage, Some(anchor)) => {
                self.client
                    .edit_message(self.chat.chat_id, anchor.message_id, text, keyboard)
                    .await?
            }
            _ => {
                self.client
                    .send_message(self.chat.chat_id, text, keyboard)
                    .await?
            }
        };

        let mut row = messages::record_outbound(self.db, self.chat.id, &sent).await?;

        match &self.root {
            None => {
                messages::set_form(self.db, row.id, form_id).await?;
                row.form_id = Some(form_id);
                self.root = Some(row.clone());
            }
            Some(root) if row.id != root.id && row.form_root_id.is_none() => {
                messages::set_form_root(self.db, row.id, root.id).await?;
                row.form_root_id = Some(root.id);
            }
            Some(_) => {}
        }

        // Audit pointer on the inbound message as well.
        if let Some(root) = &self.root
            && self.inbound.id != root.id
            && self.inbound.form_root_id.is_none()
        {
            messages::set_form_root(self.db, self.inbound.id, root.id).await?;
            self.inbound.form_root_id = Some(root.id);
        }

        self.anchor = Some(row);
        Ok(())
    }

    /// Send a plain message into the chat, outside the prompt protocol.
    ///
    /// This is what hooks use for confirmations. The recorded message
    /// carries no form pointer, so subsequent replies fall through to
    /// ordinary handler dispatch.
    pub async fn reply(&mut self, text: &str) -> Result<SentMessage, FormError> {
        let sent = self
            .client
            .send_message(self.chat.chat_id, text, None)
            .await?;
        messages::record_outbound(self.db, self.chat.id, &sent).await?;
        Ok(sent)
    }
}
