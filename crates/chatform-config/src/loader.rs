// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./chatform.toml` > `~/.config/chatform/chatform.toml`
//! > `/etc/chatform/chatform.toml` with environment variable overrides via
//! the `CHATFORM_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ChatformConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/chatform/chatform.toml` (system-wide)
/// 3. `~/.config/chatform/chatform.toml` (user XDG config)
/// 4. `./chatform.toml` (local directory)
/// 5. `CHATFORM_*` environment variables
pub fn load_config() -> Result<ChatformConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatformConfig::default()))
        .merge(Toml::file("/etc/chatform/chatform.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("chatform/chatform.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("chatform.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ChatformConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatformConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ChatformConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ChatformConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CHATFORM_STORAGE_DATABASE_PATH` must
/// map to `storage.database_path`, not `storage.database.path`.
fn env_provider() -> Env {
    Env::prefixed("CHATFORM_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("storage_", "storage.", 1);
        mapped.into()
    })
}
