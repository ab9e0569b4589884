// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! teloxide-backed implementation of [`ChannelClient`].

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    ChatId, InlineKeyboardButton as TgButton, InlineKeyboardMarkup, MessageId, Recipient,
    ReplyMarkup,
};
use tracing::{debug, warn};

use chatform_core::types::{InlineKeyboard, SentMessage};
use chatform_core::{ChannelClient, ChatformError};

/// Telegram Bot API client implementing [`ChannelClient`].
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    /// Creates a new client for the given bot token.
    pub fn new(token: &str) -> Result<Self, ChatformError> {
        if token.is_empty() {
            return Err(ChatformError::Config(
                "bot token cannot be empty".into(),
            ));
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Register `url` as this bot's webhook target.
    pub async fn set_webhook(&self, url: &str) -> Result<(), ChatformError> {
        let url = reqwest::Url::parse(url).map_err(|e| ChatformError::Channel {
            message: format!("invalid webhook url: {e}"),
            source: Some(Box::new(e)),
        })?;
        self.bot
            .set_webhook(url.clone())
            .await
            .map_err(|e| ChatformError::Channel {
                message: format!("failed to set webhook: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(%url, "webhook registered");
        Ok(())
    }
}

/// Convert the normalized keyboard into teloxide's markup type.
///
/// A button without callback data falls back to its label as the data,
/// so every button produces a callback query the dispatcher can route.
pub fn to_markup(keyboard: &InlineKeyboard) -> InlineKeyboardMarkup {
    let rows = keyboard.rows.iter().map(|row| {
        row.iter().map(|button| {
            let data = button
                .callback_data
                .clone()
                .unwrap_or_else(|| button.text.clone());
            TgButton::callback(button.text.clone(), data)
        })
    });
    InlineKeyboardMarkup::new(rows)
}

fn to_sent(message: &Message) -> SentMessage {
    SentMessage {
        message_id: i64::from(message.id.0),
        chat_id: message.chat.id.0,
        date: message.date.timestamp(),
        text: message.text().unwrap_or_default().to_string(),
    }
}

fn channel_error(context: &str, e: teloxide::RequestError) -> ChatformError {
    ChatformError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl ChannelClient for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        let request = self
            .bot
            .send_message(Recipient::Id(ChatId(chat_id)), text);
        let sent = match keyboard {
            Some(kb) => {
                request
                    .reply_markup(ReplyMarkup::InlineKeyboard(to_markup(kb)))
                    .await
            }
            None => request.await,
        }
        .map_err(|e| channel_error("failed to send message", e))?;
        Ok(to_sent(&sent))
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        let msg_id = MessageId(message_id as i32);
        let request = self.bot.edit_message_text(ChatId(chat_id), msg_id, text);
        let result = match keyboard {
            Some(kb) => request.reply_markup(to_markup(kb)).await,
            None => request.await,
        };
        match result {
            Ok(edited) => Ok(to_sent(&edited)),
            // Re-sending identical prompt text is routine on retries; the
            // platform rejects the no-op edit but the message is intact.
            Err(e) if e.to_string().contains("message is not modified") => {
                warn!(chat_id, message_id, "edit was a no-op");
                Ok(SentMessage {
                    message_id,
                    chat_id,
                    date: 0,
                    text: text.to_string(),
                })
            }
            Err(e) => Err(channel_error("failed to edit message", e)),
        }
    }

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        let msg_id = MessageId(message_id as i32);
        let request = self.bot.edit_message_reply_markup(ChatId(chat_id), msg_id);
        let edited = match keyboard {
            Some(kb) => request.reply_markup(to_markup(kb)).await,
            None => request.await,
        }
        .map_err(|e| channel_error("failed to edit reply markup", e))?;
        Ok(to_sent(&edited))
    }
}
