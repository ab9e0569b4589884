// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User row operations.

use chatform_core::types::InboundUser;
use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::UserRow;

/// Update-or-create a user keyed by the platform-assigned user id.
pub async fn upsert_user(db: &Database, user: &InboundUser) -> Result<UserRow, ChatformError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (user_id, is_bot, first_name, last_name, username)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id) DO UPDATE SET
                     is_bot = excluded.is_bot,
                     first_name = excluded.first_name,
                     last_name = excluded.last_name,
                     username = excluded.username",
                params![
                    user.id,
                    user.is_bot,
                    user.first_name,
                    user.last_name,
                    user.username,
                ],
            )?;
            let row = conn.query_row(
                "SELECT id, user_id, is_bot, first_name, last_name, username
                 FROM users WHERE user_id = ?1",
                params![user.id],
                map_user_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_user_row(row: &rusqlite::Row<'_>) -> Result<UserRow, rusqlite::Error> {
    Ok(UserRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        is_bot: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        username: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_user(id: i64, username: &str) -> InboundUser {
        InboundUser {
            id,
            is_bot: false,
            first_name: "Test".into(),
            last_name: None,
            username: Some(username.into()),
        }
    }

    #[tokio::test]
    async fn upsert_deduplicates_on_user_id() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("t.db").to_str().unwrap())
            .await
            .unwrap();

        let first = upsert_user(&db, &make_user(42, "old_name")).await.unwrap();
        let second = upsert_user(&db, &make_user(42, "new_name")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.username.as_deref(), Some("new_name"));
        db.close().await.unwrap();
    }
}
