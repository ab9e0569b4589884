// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat row operations.

use chatform_core::types::InboundChat;
use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::ChatRow;

/// Update-or-create a chat keyed by `(bot_id, chat_id)`.
pub async fn upsert_chat(
    db: &Database,
    bot_id: i64,
    chat: &InboundChat,
) -> Result<ChatRow, ChatformError> {
    let chat = chat.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO chats (bot_id, chat_id, kind, username, first_name, last_name, title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(bot_id, chat_id) DO UPDATE SET
                     kind = excluded.kind,
                     username = excluded.username,
                     first_name = excluded.first_name,
                     last_name = excluded.last_name,
                     title = excluded.title",
                params![
                    bot_id,
                    chat.id,
                    chat.kind,
                    chat.username,
                    chat.first_name,
                    chat.last_name,
                    chat.title,
                ],
            )?;
            let row = conn.query_row(
                "SELECT id, bot_id, chat_id, kind, username, first_name, last_name, title
                 FROM chats WHERE bot_id = ?1 AND chat_id = ?2",
                params![bot_id, chat.id],
                map_chat_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_chat_row(row: &rusqlite::Row<'_>) -> Result<ChatRow, rusqlite::Error> {
    Ok(ChatRow {
        id: row.get(0)?,
        bot_id: row.get(1)?,
        chat_id: row.get(2)?,
        kind: row.get(3)?,
        username: row.get(4)?,
        first_name: row.get(5)?,
        last_name: row.get(6)?,
        title: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::bots::upsert_bot;
    use tempfile::tempdir;

    fn make_chat(id: i64) -> InboundChat {
        InboundChat {
            id,
            kind: "private".into(),
            username: Some("tester".into()),
            first_name: Some("Test".into()),
            last_name: None,
            title: None,
        }
    }

    #[tokio::test]
    async fn upsert_deduplicates_per_bot() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();
        let bot_a = upsert_bot(&db, "a", "A", "t1").await.unwrap();
        let bot_b = upsert_bot(&db, "b", "B", "t2").await.unwrap();

        let first = upsert_chat(&db, bot_a.id, &make_chat(100)).await.unwrap();
        let again = upsert_chat(&db, bot_a.id, &make_chat(100)).await.unwrap();
        let other_bot = upsert_chat(&db, bot_b.id, &make_chat(100)).await.unwrap();

        assert_eq!(first.id, again.id);
        assert_ne!(first.id, other_bot.id, "same platform chat, different bot");
        db.close().await.unwrap();
    }
}
