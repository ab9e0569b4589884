// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned snapshot schema for persisted form state.
//!
//! The persisted shape is decoupled from the in-memory layout: a
//! [`FormSnapshot`] names fields by their stable names, plus one
//! [`FieldRecord`] per field. Code changes to a form definition are
//! caught at restore time as explicit errors instead of corrupt state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FormError;
use crate::fields::FieldState;
use crate::form::{FormDefinition, FormState};
use crate::graph::PromptKind;
use crate::CleanedData;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The whole-conversation part of a persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub version: u32,
    pub kind: String,
    pub current_field: Option<String>,
    pub previous_field: Option<String>,
    pub prompt_kind: PromptKind,
    pub cleaned_data: CleanedData,
    pub is_finished: bool,
}

/// The per-field part of a persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRecord {
    pub name: String,
    pub value: Option<Value>,
    pub is_valid: bool,
}

/// Capture a form's state into its persisted shape.
pub fn capture(def: &FormDefinition, state: &FormState) -> (FormSnapshot, Vec<FieldRecord>) {
    let graph = def.graph();
    let field_name = |id| graph.field(id).name.clone();

    let snapshot = FormSnapshot {
        version: SNAPSHOT_VERSION,
        kind: def.kind().to_string(),
        current_field: state.current.map(field_name),
        previous_field: state.previous.map(field_name),
        prompt_kind: state.current_prompt_kind,
        cleaned_data: state.cleaned_data.clone(),
        is_finished: state.is_finished,
    };

    let records = graph
        .fields()
        .map(|(id, spec)| {
            let field_state = &state.fields[id.0];
            FieldRecord {
                name: spec.name.clone(),
                value: field_state.value.clone(),
                is_valid: field_state.is_valid,
            }
        })
        .collect();

    (snapshot, records)
}

/// Rebuild runtime state from a snapshot against the current definition.
///
/// A field name the definition no longer declares is a structural
/// failure (`UnknownField`) -- a data-migration concern, never patched
/// silently.
pub fn restore(
    def: &FormDefinition,
    snapshot: &FormSnapshot,
    records: &[FieldRecord],
) -> Result<FormState, FormError> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(FormError::UnsupportedSnapshot(snapshot.version));
    }

    let graph = def.graph();
    let resolve = |name: &str| {
        graph.field_id(name).ok_or_else(|| FormError::UnknownField {
            kind: def.kind().to_string(),
            name: name.to_string(),
        })
    };

    let mut state = def.new_state();
    state.current = snapshot.current_field.as_deref().map(resolve).transpose()?;
    state.previous = snapshot.previous_field.as_deref().map(resolve).transpose()?;
    state.current_prompt_kind = snapshot.prompt_kind;
    state.cleaned_data = snapshot.cleaned_data.clone();
    state.is_finished = snapshot.is_finished;

    for record in records {
        let id = resolve(&record.name)?;
        state.fields[id.0] = FieldState {
            value: record.value.clone(),
            is_valid: record.is_valid,
            errors: Vec::new(),
        };
    }

    Ok(state)
}
