// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the chatform framework.
//!
//! Bots, users, chats, messages, updates, and form snapshots are stored
//! in a single SQLite database. All writes are serialized through one
//! tokio-rusqlite connection; embedded refinery migrations run on open.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::{
    BotRow, ChatRow, FieldRow, FormRow, MessageRow, QueueEntry, SavedUpdate, UpdateRow, UserRow,
};
