// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel integration for the chatform framework.
//!
//! Implements [`ChannelClient`] over the Telegram Bot API via teloxide
//! and normalizes inbound webhook payloads into the core update types.

pub mod client;
pub mod update;

pub use client::TelegramClient;
pub use update::parse_update;
