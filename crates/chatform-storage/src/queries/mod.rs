// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per storage entity.

pub mod bots;
pub mod chats;
pub mod forms;
pub mod messages;
pub mod queue;
pub mod updates;
pub mod users;
