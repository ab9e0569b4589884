// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalized platform types shared across the chatform crates.
//!
//! Inbound webhook payloads are flattened into these channel-agnostic
//! types by the platform crate; the storage layer persists them and the
//! form engine consumes them. Only the fields the framework actually
//! routes on are carried; the raw payload is kept alongside for audit.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Direction of a stored message relative to the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    In,
    Out,
}

/// The kind of inbound webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    Message,
    EditedMessage,
    CallbackQuery,
}

/// One selectable option attached to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    /// Label shown to the user.
    pub text: String,
    /// Value delivered back as callback data when pressed.
    pub callback_data: Option<String>,
}

impl InlineKeyboardButton {
    /// A button that sends `data` back as a callback query when pressed.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: Some(data.into()),
        }
    }
}

/// A grid of selectable options attached to an outbound prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboard {
    pub fn from_rows(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self { rows }
    }
}

/// Normalized representation of a message sent or edited by the bot,
/// as reported back by the platform API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    /// Platform-assigned message id, unique within the chat.
    pub message_id: i64,
    /// Platform-assigned chat id.
    pub chat_id: i64,
    /// Platform timestamp (unix seconds).
    pub date: i64,
    /// Message text as accepted by the platform.
    pub text: String,
}

/// Normalized platform user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Normalized platform chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundChat {
    pub id: i64,
    /// Chat type as reported by the platform (private, group, ...).
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// Normalized inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub message_id: i64,
    pub chat: InboundChat,
    #[serde(default)]
    pub from: Option<InboundUser>,
    /// Platform timestamp (unix seconds) -- the chat-scoped ordering key.
    pub date: i64,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub reply_to_message_id: Option<i64>,
}

/// Normalized callback query (inline keyboard button press).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundCallbackQuery {
    pub id: String,
    pub from: InboundUser,
    /// The bot message the pressed keyboard was attached to.
    pub message: InboundMessage,
    #[serde(default)]
    pub data: Option<String>,
}

/// The payload variants of a normalized update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InboundEvent {
    Message(InboundMessage),
    EditedMessage(InboundMessage),
    CallbackQuery(InboundCallbackQuery),
}

/// One normalized webhook delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundUpdate {
    /// Platform-assigned update id.
    pub update_id: i64,
    pub event: InboundEvent,
    /// The raw webhook payload, kept for audit.
    pub payload: serde_json::Value,
}

impl InboundUpdate {
    pub fn kind(&self) -> UpdateKind {
        match &self.event {
            InboundEvent::Message(_) => UpdateKind::Message,
            InboundEvent::EditedMessage(_) => UpdateKind::EditedMessage,
            InboundEvent::CallbackQuery(_) => UpdateKind::CallbackQuery,
        }
    }

    /// The message this update revolves around: the inbound message itself,
    /// or the bot message a callback query is attached to.
    pub fn message(&self) -> &InboundMessage {
        match &self.event {
            InboundEvent::Message(m) | InboundEvent::EditedMessage(m) => m,
            InboundEvent::CallbackQuery(q) => &q.message,
        }
    }

    /// The textual input the user produced with this update: message text
    /// for messages, callback data for button presses.
    pub fn input_text(&self) -> Option<&str> {
        match &self.event {
            InboundEvent::Message(m) | InboundEvent::EditedMessage(m) => m.text.as_deref(),
            InboundEvent::CallbackQuery(q) => q.data.as_deref(),
        }
    }
}
