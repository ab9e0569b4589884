// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-turn conversational form engine.
//!
//! A form is a directed graph of fields. Each inbound event feeds the
//! current field, which validates the input and either advances the
//! cursor along the first matching edge or re-prompts with its errors.
//! Between events the whole conversation lives in storage; the
//! repository resolves which stored form an inbound event continues by
//! walking the chat's outbound messages and their root pointers.
//!
//! ```no_run
//! use std::sync::Arc;
//! use chatform_forms::fields::FieldSpec;
//! use chatform_forms::form::FormDefinition;
//!
//! let definition = FormDefinition::builder("age_survey")
//!     .field(FieldSpec::text("name").prompt("What is your name?"))
//!     .field(
//!         FieldSpec::integer("age")
//!             .prompt_with(|data| format!("Hi {}! How old are you?", data["name"].as_str().unwrap_or(""))),
//!     )
//!     .build()
//!     .unwrap();
//! # let _ = Arc::new(definition);
//! ```

pub mod error;
pub mod fields;
pub mod form;
pub mod graph;
pub mod registry;
pub mod repository;
pub mod resume;
pub mod snapshot;

pub use error::FormError;
pub use fields::{FieldKind, FieldSpec, FieldState};
pub use form::{Form, FormBuilder, FormDefinition, FormHooks, FormState, FormStatus};
pub use graph::{FieldGraph, FieldId, PromptKind};
pub use registry::FormRegistry;
pub use repository::FormRepository;
pub use resume::{find_active_form, ActiveForm};
pub use snapshot::{FieldRecord, FormSnapshot, SNAPSHOT_VERSION};

/// Accumulated validated answers, keyed by field name.
pub type CleanedData = serde_json::Map<String, serde_json::Value>;
