// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the chatform framework.

use thiserror::Error;

/// The primary error type used across chatform crates.
#[derive(Debug, Error)]
pub enum ChatformError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel errors (platform API failure, message format, invalid identifiers).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An inbound request named a bot slug that is not configured.
    #[error("unknown bot: {slug}")]
    UnknownBot { slug: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
