// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the chatform bot framework.
//!
//! This crate provides the central error type, the normalized platform
//! types exchanged between the webhook layer, the storage layer, and the
//! form engine, and the [`ChannelClient`] trait through which prompts are
//! delivered back to the messaging platform.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ChatformError;
pub use traits::ChannelClient;
pub use types::{
    Direction, InboundCallbackQuery, InboundChat, InboundEvent, InboundMessage, InboundUpdate,
    InboundUser, InlineKeyboard, InlineKeyboardButton, SentMessage, UpdateKind,
};
