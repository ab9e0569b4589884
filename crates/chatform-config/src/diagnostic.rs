// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic error types for configuration failures, rendered with miette.

use miette::Diagnostic;
use thiserror::Error;

/// A configuration problem surfaced at startup.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The configuration could not be loaded or deserialized at all.
    #[error("failed to load configuration")]
    #[diagnostic(code(chatform::config::load))]
    Load(#[source] Box<figment::Error>),

    /// The configuration loaded but violates a semantic constraint.
    #[error("invalid configuration: {message}")]
    #[diagnostic(code(chatform::config::invalid))]
    Invalid {
        message: String,
        #[help]
        help: Option<String>,
    },
}

impl ConfigError {
    pub fn invalid(message: String, help: Option<String>) -> Self {
        Self::Invalid { message, help }
    }
}

/// Render configuration errors to stderr with miette's fancy reporter.
pub fn render_errors(errors: Vec<ConfigError>) {
    for error in errors {
        eprintln!("{:?}", miette::Report::new(error));
    }
}
