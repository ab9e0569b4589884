// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for the storage entities.

/// A configured bot, upserted from the deployment config at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotRow {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub token: String,
}

/// A platform user, deduplicated on the platform-assigned `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub user_id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

/// A chat thread, deduplicated on `(bot_id, chat_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRow {
    pub id: i64,
    pub bot_id: i64,
    /// Platform-assigned chat id.
    pub chat_id: i64,
    pub kind: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
}

/// One stored message, inbound or outbound.
///
/// `form_id` marks a root prompt message that owns a form row;
/// `form_root_id` is the indirection from a later prompt back to the
/// root message carrying the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: i64,
    /// References `chats.id`, not the platform chat id.
    pub chat_id: i64,
    /// Platform-assigned message id, unique within the chat.
    pub message_id: i64,
    pub direction: String,
    /// Platform timestamp (unix seconds) -- the chat-scoped ordering key.
    pub date: i64,
    pub text: Option<String>,
    pub reply_to_message_id: Option<i64>,
    pub form_id: Option<i64>,
    pub form_root_id: Option<i64>,
    pub extra: Option<String>,
}

/// One stored webhook delivery. `handler` is stamped after dispatch for
/// audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRow {
    pub id: i64,
    pub bot_id: i64,
    pub update_id: i64,
    pub kind: String,
    /// References `messages.id`.
    pub message_id: Option<i64>,
    pub handler: Option<String>,
    pub payload: String,
}

/// Durable state of one form conversation.
///
/// `kind` is the form registry key; `context` holds the versioned
/// snapshot JSON. One row per conversation; saves are last-writer-wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRow {
    pub id: i64,
    pub kind: String,
    pub current_field: Option<String>,
    pub context: String,
    pub is_finished: bool,
    pub handler: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Per-field decomposition of a form's bound state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRow {
    pub id: i64,
    pub form_id: i64,
    pub name: String,
    /// JSON-encoded value; `None` while the field is unbound.
    pub value: Option<String>,
    pub is_valid: bool,
}

/// One entry on the crash-safe work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// The rows produced by persisting one inbound update.
#[derive(Debug, Clone)]
pub struct SavedUpdate {
    pub update: UpdateRow,
    pub message: MessageRow,
    pub chat: ChatRow,
    pub user: Option<UserRow>,
}
