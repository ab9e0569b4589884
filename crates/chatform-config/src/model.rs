// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the chatform framework.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level chatform configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; `bots` is the only part a deployment must fill in.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatformConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Webhook gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// The bots this deployment serves.
    #[serde(default)]
    pub bots: Vec<BotConfig>,
}

impl Default for ChatformConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            gateway: GatewayConfig::default(),
            storage: StorageConfig::default(),
            bots: Vec::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Webhook gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the webhook server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the webhook server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL registered with the platform as the webhook target
    /// (e.g. `https://bots.example.com`). `None` disables `set-webhook`.
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8844
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("chatform").join("chatform.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("chatform.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// One bot served by this deployment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Stable identifier used in webhook URLs and handler registration.
    pub slug: String,

    /// Display name. Defaults to the slug.
    #[serde(default)]
    pub name: Option<String>,

    /// Platform bot API token.
    pub token: String,
}

impl BotConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_defaults() {
        let gateway = GatewayConfig::default();
        assert_eq!(gateway.host, "127.0.0.1");
        assert_eq!(gateway.port, 8844);
        assert!(gateway.public_url.is_none());
    }

    #[test]
    fn storage_defaults() {
        let storage = StorageConfig::default();
        assert!(storage.database_path.ends_with("chatform.db"));
        assert!(storage.wal_mode);
    }

    #[test]
    fn bot_display_name_falls_back_to_slug() {
        let bot = BotConfig {
            slug: "fatherbot".into(),
            name: None,
            token: "123:abc".into(),
        };
        assert_eq!(bot.display_name(), "fatherbot");
    }
}
