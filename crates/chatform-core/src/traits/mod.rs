// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the chatform collaborator seams.

pub mod channel;

pub use channel::ChannelClient;
