// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update row operations and the save-update orchestration.

use chatform_core::types::{Direction, InboundEvent, InboundUpdate};
use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{BotRow, SavedUpdate, UpdateRow};
use crate::queries::{chats, messages, users};

/// Persist one inbound update: update-or-create the user, chat, message,
/// and update rows, all keyed by their platform-assigned ids.
///
/// For a callback query the persisted message is the bot message the
/// pressed keyboard was attached to (direction `out`); for plain and
/// edited messages it is the user's message (direction `in`).
pub async fn save_update(
    db: &Database,
    bot: &BotRow,
    inbound: &InboundUpdate,
) -> Result<SavedUpdate, ChatformError> {
    let (message, direction, user) = match &inbound.event {
        InboundEvent::Message(m) | InboundEvent::EditedMessage(m) => {
            (m, Direction::In, m.from.as_ref())
        }
        InboundEvent::CallbackQuery(q) => (&q.message, Direction::Out, Some(&q.from)),
    };

    let user_row = match user {
        Some(u) => Some(users::upsert_user(db, u).await?),
        None => None,
    };
    let chat_row = chats::upsert_chat(db, bot.id, &message.chat).await?;
    let message_row = messages::upsert_message(db, chat_row.id, message, direction).await?;
    let update_row = upsert_update(db, bot.id, inbound, message_row.id).await?;

    Ok(SavedUpdate {
        update: update_row,
        message: message_row,
        chat: chat_row,
        user: user_row,
    })
}

/// Update-or-create the update row keyed by `(bot_id, update_id)`.
pub async fn upsert_update(
    db: &Database,
    bot_id: i64,
    inbound: &InboundUpdate,
    message_pk: i64,
) -> Result<UpdateRow, ChatformError> {
    let update_id = inbound.update_id;
    let kind = inbound.kind().to_string();
    let payload = inbound.payload.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO updates (bot_id, update_id, kind, message_id, payload)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(bot_id, update_id) DO UPDATE SET
                     kind = excluded.kind,
                     message_id = excluded.message_id,
                     payload = excluded.payload",
                params![bot_id, update_id, kind, message_pk, payload],
            )?;
            let row = conn.query_row(
                "SELECT id, bot_id, update_id, kind, message_id, handler, payload
                 FROM updates WHERE bot_id = ?1 AND update_id = ?2",
                params![bot_id, update_id],
                map_update_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Stamp the name of the handler that claimed this update, for audit.
pub async fn set_handler(db: &Database, update_pk: i64, handler: &str) -> Result<(), ChatformError> {
    let handler = handler.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE updates SET handler = ?1 WHERE id = ?2",
                params![handler, update_pk],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an update by primary key.
pub async fn get_update(db: &Database, id: i64) -> Result<Option<UpdateRow>, ChatformError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, bot_id, update_id, kind, message_id, handler, payload
                 FROM updates WHERE id = ?1",
                params![id],
                map_update_row,
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

fn map_update_row(row: &rusqlite::Row<'_>) -> Result<UpdateRow, rusqlite::Error> {
    Ok(UpdateRow {
        id: row.get(0)?,
        bot_id: row.get(1)?,
        update_id: row.get(2)?,
        kind: row.get(3)?,
        message_id: row.get(4)?,
        handler: row.get(5)?,
        payload: row.get(6)?,
    })
}
