// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation of the configuration.
//!
//! Figment guarantees shape and types; this pass checks the semantic
//! constraints a deployment must satisfy before anything is wired up.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::ChatformConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate semantic constraints on a loaded configuration.
///
/// Collects every violation instead of stopping at the first, so a
/// deployment can fix its config in one pass.
pub fn validate_config(config: &ChatformConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log_level.as_str()) {
        errors.push(ConfigError::invalid(
            format!("log_level '{}' is not recognized", config.log_level),
            Some(format!("expected one of: {}", LOG_LEVELS.join(", "))),
        ));
    }

    if config.gateway.port == 0 {
        errors.push(ConfigError::invalid(
            "gateway.port must not be 0".to_string(),
            None,
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::invalid(
            "storage.database_path must not be empty".to_string(),
            None,
        ));
    }

    let mut seen_slugs = HashSet::new();
    for bot in &config.bots {
        if bot.slug.trim().is_empty() {
            errors.push(ConfigError::invalid(
                "bots[].slug must not be empty".to_string(),
                None,
            ));
        } else if !seen_slugs.insert(bot.slug.as_str()) {
            errors.push(ConfigError::invalid(
                format!("duplicate bot slug '{}'", bot.slug),
                Some("each bot needs a unique slug; it appears in the webhook URL".to_string()),
            ));
        }
        if bot.token.trim().is_empty() {
            errors.push(ConfigError::invalid(
                format!("bots[].token must not be empty (bot '{}')", bot.slug),
                None,
            ));
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
