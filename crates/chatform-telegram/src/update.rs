// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook payload normalization.
//!
//! Flattens the subset of the Telegram `Update` object the framework
//! routes on into the core inbound types. Unsupported update kinds
//! (channel posts, chat member changes, ...) normalize to `None` and are
//! dropped by the worker.

use serde::Deserialize;
use tracing::debug;

use chatform_core::types::{
    InboundCallbackQuery, InboundChat, InboundEvent, InboundMessage, InboundUpdate, InboundUser,
};
use chatform_core::ChatformError;

#[derive(Debug, Deserialize)]
struct WireUpdate {
    update_id: i64,
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    edited_message: Option<WireMessage>,
    #[serde(default)]
    callback_query: Option<WireCallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    message_id: i64,
    date: i64,
    chat: WireChat,
    #[serde(default)]
    from: Option<WireUser>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    reply_to_message: Option<Box<WireMessage>>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    id: i64,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    id: i64,
    #[serde(default)]
    is_bot: bool,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireCallbackQuery {
    id: String,
    from: WireUser,
    #[serde(default)]
    message: Option<WireMessage>,
    #[serde(default)]
    data: Option<String>,
}

/// Normalize a webhook payload into an [`InboundUpdate`].
///
/// Returns `Ok(None)` for update kinds the framework does not route,
/// including callback queries whose source message the platform no
/// longer provides.
pub fn parse_update(payload: &serde_json::Value) -> Result<Option<InboundUpdate>, ChatformError> {
    let wire: WireUpdate =
        serde_json::from_value(payload.clone()).map_err(|e| ChatformError::Channel {
            message: format!("malformed update payload: {e}"),
            source: Some(Box::new(e)),
        })?;

    let event = if let Some(message) = wire.message {
        InboundEvent::Message(to_message(message))
    } else if let Some(message) = wire.edited_message {
        InboundEvent::EditedMessage(to_message(message))
    } else if let Some(query) = wire.callback_query {
        match query.message {
            Some(message) => InboundEvent::CallbackQuery(InboundCallbackQuery {
                id: query.id,
                from: to_user(query.from),
                message: to_message(message),
                data: query.data,
            }),
            None => {
                debug!(update_id = wire.update_id, "callback query without message");
                return Ok(None);
            }
        }
    } else {
        debug!(update_id = wire.update_id, "unsupported update kind");
        return Ok(None);
    };

    Ok(Some(InboundUpdate {
        update_id: wire.update_id,
        event,
        payload: payload.clone(),
    }))
}

fn to_message(message: WireMessage) -> InboundMessage {
    InboundMessage {
        message_id: message.message_id,
        chat: to_chat(message.chat),
        from: message.from.map(to_user),
        date: message.date,
        text: message.text,
        reply_to_message_id: message.reply_to_message.map(|m| m.message_id),
    }
}

fn to_chat(chat: WireChat) -> InboundChat {
    InboundChat {
        id: chat.id,
        kind: chat.kind,
        username: chat.username,
        first_name: chat.first_name,
        last_name: chat.last_name,
        title: chat.title,
    }
}

fn to_user(user: WireUser) -> InboundUser {
    InboundUser {
        id: user.id,
        is_bot: user.is_bot,
        first_name: user.first_name,
        last_name: user.last_name,
        username: user.username,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatform_core::types::UpdateKind;
    use serde_json::json;

    fn private_message(update_id: i64, message_id: i64, text: &str) -> serde_json::Value {
        json!({
            "update_id": update_id,
            "message": {
                "message_id": message_id,
                "date": 1700000000,
                "chat": {"id": 100, "type": "private", "first_name": "Test"},
                "from": {"id": 7, "is_bot": false, "first_name": "Test", "username": "tester"},
                "text": text,
            }
        })
    }

    #[test]
    fn message_update_is_normalized() {
        let update = parse_update(&private_message(1, 10, "hello"))
            .unwrap()
            .unwrap();
        assert_eq!(update.update_id, 1);
        assert_eq!(update.kind(), UpdateKind::Message);
        assert_eq!(update.input_text(), Some("hello"));
        assert_eq!(update.message().chat.id, 100);
        assert_eq!(
            update.message().from.as_ref().map(|u| u.id),
            Some(7)
        );
    }

    #[test]
    fn reply_chain_is_flattened_to_the_replied_id() {
        let payload = json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "date": 1700000100,
                "chat": {"id": 100, "type": "private"},
                "text": "42",
                "reply_to_message": {
                    "message_id": 10,
                    "date": 1700000000,
                    "chat": {"id": 100, "type": "private"},
                    "text": "Enter a number:"
                }
            }
        });
        let update = parse_update(&payload).unwrap().unwrap();
        assert_eq!(update.message().reply_to_message_id, Some(10));
    }

    #[test]
    fn callback_query_is_normalized() {
        let payload = json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 7, "is_bot": false, "first_name": "Test"},
                "data": "option_a",
                "message": {
                    "message_id": 20,
                    "date": 1700000000,
                    "chat": {"id": 100, "type": "private"},
                    "text": "Pick one:"
                }
            }
        });
        let update = parse_update(&payload).unwrap().unwrap();
        assert_eq!(update.kind(), UpdateKind::CallbackQuery);
        assert_eq!(update.input_text(), Some("option_a"));
        assert_eq!(update.message().message_id, 20);
    }

    #[test]
    fn callback_query_without_message_is_dropped() {
        let payload = json!({
            "update_id": 4,
            "callback_query": {
                "id": "cb-2",
                "from": {"id": 7, "is_bot": false, "first_name": "Test"},
                "data": "stale"
            }
        });
        assert!(parse_update(&payload).unwrap().is_none());
    }

    #[test]
    fn unsupported_update_kind_is_dropped() {
        let payload = json!({
            "update_id": 5,
            "my_chat_member": {"chat": {"id": 1, "type": "private"}}
        });
        assert!(parse_update(&payload).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_update(&json!({"no_update_id": true})).is_err());
    }

    #[test]
    fn edited_message_is_normalized() {
        let payload = json!({
            "update_id": 6,
            "edited_message": {
                "message_id": 12,
                "date": 1700000200,
                "chat": {"id": 100, "type": "private"},
                "text": "fixed typo"
            }
        });
        let update = parse_update(&payload).unwrap().unwrap();
        assert_eq!(update.kind(), UpdateKind::EditedMessage);
        assert_eq!(update.input_text(), Some("fixed typo"));
    }
}
