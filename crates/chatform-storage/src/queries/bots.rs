// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot row operations.

use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::BotRow;

/// Insert or update a bot from the deployment config, keyed by slug.
pub async fn upsert_bot(
    db: &Database,
    slug: &str,
    name: &str,
    token: &str,
) -> Result<BotRow, ChatformError> {
    let slug = slug.to_string();
    let name = name.to_string();
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO bots (slug, name, token) VALUES (?1, ?2, ?3)
                 ON CONFLICT(slug) DO UPDATE SET name = excluded.name, token = excluded.token",
                params![slug, name, token],
            )?;
            let bot = conn.query_row(
                "SELECT id, slug, name, token FROM bots WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok(BotRow {
                        id: row.get(0)?,
                        slug: row.get(1)?,
                        name: row.get(2)?,
                        token: row.get(3)?,
                    })
                },
            )?;
            Ok(bot)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a bot by slug.
pub async fn get_bot_by_slug(db: &Database, slug: &str) -> Result<Option<BotRow>, ChatformError> {
    let slug = slug.to_string();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, slug, name, token FROM bots WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok(BotRow {
                        id: row.get(0)?,
                        slug: row.get(1)?,
                        name: row.get(2)?,
                        token: row.get(3)?,
                    })
                },
            );
            match result {
                Ok(bot) => Ok(Some(bot)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
