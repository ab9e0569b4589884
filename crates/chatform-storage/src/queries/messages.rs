// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message row operations.
//!
//! Messages carry the form pointers the resumption lookup walks:
//! `form_id` on a root prompt, `form_root_id` on later prompts. Upserts
//! never overwrite those pointers or the stored direction.

use chatform_core::types::{Direction, InboundMessage, SentMessage};
use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::MessageRow;

const MESSAGE_COLUMNS: &str = "id, chat_id, message_id, direction, date, text, \
                               reply_to_message_id, form_id, form_root_id, extra";

/// Update-or-create an inbound (or callback-attached) message keyed by
/// `(chat_id, message_id)`. Direction and form pointers of an existing
/// row are preserved.
pub async fn upsert_message(
    db: &Database,
    chat_id: i64,
    message: &InboundMessage,
    direction: Direction,
) -> Result<MessageRow, ChatformError> {
    let message = message.clone();
    let direction = direction.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (chat_id, message_id, direction, date, text, reply_to_message_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(chat_id, message_id) DO UPDATE SET
                     date = excluded.date,
                     text = excluded.text,
                     reply_to_message_id = excluded.reply_to_message_id",
                params![
                    chat_id,
                    message.message_id,
                    direction,
                    message.date,
                    message.text,
                    message.reply_to_message_id,
                ],
            )?;
            let row = conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ?1 AND message_id = ?2"
                ),
                params![chat_id, message.message_id],
                map_message_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a message the bot just sent or edited. Editing an existing
/// prompt hits the conflict arm and refreshes the stored text only.
pub async fn record_outbound(
    db: &Database,
    chat_id: i64,
    sent: &SentMessage,
) -> Result<MessageRow, ChatformError> {
    let sent = sent.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (chat_id, message_id, direction, date, text)
                 VALUES (?1, ?2, 'out', ?3, ?4)
                 ON CONFLICT(chat_id, message_id) DO UPDATE SET text = excluded.text",
                params![chat_id, sent.message_id, sent.date, sent.text],
            )?;
            let row = conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages WHERE chat_id = ?1 AND message_id = ?2"
                ),
                params![chat_id, sent.message_id],
                map_message_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a message by primary key.
pub async fn get_message(db: &Database, id: i64) -> Result<Option<MessageRow>, ChatformError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"),
                params![id],
                map_message_row,
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The chat's most recent outbound message preceding `(date, before_id)`
/// in platform order. This is the message a free-text reply continues.
pub async fn previous_outbound(
    db: &Database,
    chat_id: i64,
    date: i64,
    before_id: i64,
) -> Result<Option<MessageRow>, ChatformError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!(
                    "SELECT {MESSAGE_COLUMNS} FROM messages
                     WHERE chat_id = ?1 AND direction = 'out'
                       AND (date < ?2 OR (date = ?2 AND id < ?3))
                     ORDER BY date DESC, id DESC LIMIT 1"
                ),
                params![chat_id, date, before_id],
                map_message_row,
            );
            match result {
                Ok(row) => Ok(Some(row)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a message as the root prompt owning a form.
pub async fn set_form(db: &Database, message_pk: i64, form_id: i64) -> Result<(), ChatformError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET form_id = ?1 WHERE id = ?2",
                params![form_id, message_pk],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Point a message at the root prompt of the conversation it belongs to.
pub async fn set_form_root(
    db: &Database,
    message_pk: i64,
    root_pk: i64,
) -> Result<(), ChatformError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET form_root_id = ?1 WHERE id = ?2",
                params![root_pk, message_pk],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_message_row(row: &rusqlite::Row<'_>) -> Result<MessageRow, rusqlite::Error> {
    Ok(MessageRow {
        id: row.get(0)?,
        chat_id: row.get(1)?,
        message_id: row.get(2)?,
        direction: row.get(3)?,
        date: row.get(4)?,
        text: row.get(5)?,
        reply_to_message_id: row.get(6)?,
        form_id: row.get(7)?,
        form_root_id: row.get(8)?,
        extra: row.get(9)?,
    })
}
