// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound messaging client trait.

use async_trait::async_trait;

use crate::error::ChatformError;
use crate::types::{InlineKeyboard, SentMessage};

/// Client for outbound calls against the messaging platform API.
///
/// The form engine calls exactly one of [`send_message`] or
/// [`edit_message`] per prompt, chosen by the prompt kind of the edge
/// being traversed. Implementations do not retry; transport failures
/// propagate to the caller.
///
/// [`send_message`]: ChannelClient::send_message
/// [`edit_message`]: ChannelClient::edit_message
#[async_trait]
pub trait ChannelClient: Send + Sync {
    /// Sends a new message to a chat.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError>;

    /// Edits the text (and keyboard) of a previously sent message in place.
    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError>;

    /// Replaces only the inline keyboard of a previously sent message.
    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError>;
}
