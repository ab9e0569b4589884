// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the form engine.
//!
//! Validation failures are NOT errors: they stay inside the field and
//! surface as a re-prompt. The variants here are structural -- a broken
//! definition, a snapshot that no longer matches the code, or a failure
//! in a collaborator.

use chatform_core::ChatformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    /// The stored form kind is not present in the registry (stale
    /// deployment). Fatal to the load; there is no recovery path.
    #[error("unknown form kind: {0}")]
    UnknownKind(String),

    /// A stored field name is absent from the current form definition.
    #[error("form '{kind}' has no field named '{name}'")]
    UnknownField { kind: String, name: String },

    /// A definition declared two fields with the same name.
    #[error("duplicate field name: {0}")]
    DuplicateField(String),

    /// An edge references a field name the definition does not declare.
    #[error("edge references unknown field: {0}")]
    UnknownEdgeField(String),

    /// A definition with no fields has no root to start from.
    #[error("form definition has no fields")]
    NoFields,

    /// Input was fed to a form that already reached its terminal state.
    #[error("form is already finished")]
    Finished,

    /// Input was fed to a form whose cursor was never positioned.
    #[error("form has not been started")]
    NotStarted,

    /// The stored snapshot version is newer than this code understands.
    #[error("snapshot version {0} is not supported")]
    UnsupportedSnapshot(u32),

    /// The stored snapshot could not be decoded at all.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A storage or channel collaborator failed.
    #[error(transparent)]
    Chatform(#[from] ChatformError),
}

impl From<FormError> for ChatformError {
    fn from(error: FormError) -> Self {
        match error {
            FormError::Chatform(inner) => inner,
            other => ChatformError::Internal(other.to_string()),
        }
    }
}
