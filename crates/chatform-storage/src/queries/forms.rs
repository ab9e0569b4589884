// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form and form-field row operations.
//!
//! One `forms` row per conversation. Saves are last-writer-wins: there is
//! no version counter, so two workers processing updates for the same
//! chat concurrently can clobber each other's turn.

use chatform_core::ChatformError;
use rusqlite::params;

use crate::database::Database;
use crate::models::{FieldRow, FormRow};

const FORM_COLUMNS: &str =
    "id, kind, current_field, context, is_finished, handler, created_at, updated_at";

/// Create the durable row for a newly started conversation.
pub async fn create_form(
    db: &Database,
    kind: &str,
    current_field: Option<&str>,
    context: &str,
    is_finished: bool,
    handler: Option<&str>,
) -> Result<FormRow, ChatformError> {
    let kind = kind.to_string();
    let current_field = current_field.map(|s| s.to_string());
    let context = context.to_string();
    let handler = handler.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO forms (kind, current_field, context, is_finished, handler)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![kind, current_field, context, is_finished, handler],
            )?;
            let id = conn.last_insert_rowid();
            let row = conn.query_row(
                &format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?1"),
                params![id],
                map_form_row,
            )?;
            Ok(row)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the stored state of a conversation (last-writer-wins).
pub async fn update_form(
    db: &Database,
    id: i64,
    current_field: Option<&str>,
    context: &str,
    is_finished: bool,
) -> Result<(), ChatformError> {
    let current_field = current_field.map(|s| s.to_string());
    let context = context.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE forms SET current_field = ?1, context = ?2, is_finished = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![current_field, context, is_finished, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a form by primary key.
pub async fn get_form(db: &Database, id: i64) -> Result<Option<FormRow>, ChatformError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                &format!("SELECT {FORM_COLUMNS} FROM forms WHERE id = ?1"),
                params![id],
                map_form_row,
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

/// Update-or-create the stored state of one field, keyed by `(form, name)`.
pub async fn upsert_field(
    db: &Database,
    form_id: i64,
    name: &str,
    value: Option<&str>,
    is_valid: bool,
) -> Result<(), ChatformError> {
    let name = name.to_string();
    let value = value.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO form_fields (form_id, name, value, is_valid)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(form_id, name) DO UPDATE SET
                     value = excluded.value,
                     is_valid = excluded.is_valid",
                params![form_id, name, value, is_valid],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All stored field rows for a form.
pub async fn get_fields(db: &Database, form_id: i64) -> Result<Vec<FieldRow>, ChatformError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, form_id, name, value, is_valid
                 FROM form_fields WHERE form_id = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map(params![form_id], |row| {
                Ok(FieldRow {
                    id: row.get(0)?,
                    form_id: row.get(1)?,
                    name: row.get(2)?,
                    value: row.get(3)?,
                    is_valid: row.get(4)?,
                })
            })?;
            let mut fields = Vec::new();
            for row in rows {
                fields.push(row?);
            }
            Ok(fields)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn map_form_row(row: &rusqlite::Row<'_>) -> Result<FormRow, rusqlite::Error> {
    Ok(FormRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        current_field: row.get(2)?,
        context: row.get(3)?,
        is_finished: row.get(4)?,
        handler: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}
