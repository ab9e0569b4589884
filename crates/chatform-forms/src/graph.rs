// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The field graph: an arena of field specs plus an insertion-ordered
//! edge list.
//!
//! Edges are `(from, to, condition, prompt_kind)` tuples over arena
//! indices, never object references. Cycles and self-loops are legal;
//! traversal must not assume acyclicity or finite depth.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::fields::FieldSpec;
use crate::CleanedData;

/// Index of a field in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub usize);

/// How the next prompt is delivered: as a fresh message, or edited into
/// the previous prompt in place (on-the-fly keyboard updates).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    #[default]
    NewMessage,
    UpdateMessage,
}

/// Predicate over the just-validated value and the answers so far.
/// `None` always matches.
pub type Condition = Arc<dyn Fn(&Value, &CleanedData) -> bool + Send + Sync>;

/// One directed edge between fields.
#[derive(Clone)]
pub struct Edge {
    pub from: FieldId,
    pub to: FieldId,
    pub condition: Option<Condition>,
    pub prompt_kind: PromptKind,
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("conditional", &self.condition.is_some())
            .field("prompt_kind", &self.prompt_kind)
            .finish()
    }
}

/// The immutable field graph of one form definition.
#[derive(Debug)]
pub struct FieldGraph {
    fields: Vec<FieldSpec>,
    by_name: HashMap<String, FieldId>,
    edges: Vec<Edge>,
}

impl FieldGraph {
    pub(crate) fn new(
        fields: Vec<FieldSpec>,
        by_name: HashMap<String, FieldId>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            fields,
            by_name,
            edges,
        }
    }

    /// The default root: the first declared field.
    pub fn root(&self) -> FieldId {
        FieldId(0)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, id: FieldId) -> &FieldSpec {
        &self.fields[id.0]
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.by_name.get(name).copied()
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, spec)| (FieldId(i), spec))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Resolve the successor of `from` for the given value.
    ///
    /// Edges are scanned in insertion order; the first whose condition
    /// is absent or true wins. `None` means the form completes.
    pub fn next_field(
        &self,
        from: FieldId,
        value: &Value,
        cleaned: &CleanedData,
    ) -> Option<(FieldId, PromptKind)> {
        self.edges
            .iter()
            .filter(|edge| edge.from == from)
            .find(|edge| {
                edge.condition
                    .as_ref()
                    .map(|condition| condition(value, cleaned))
                    .unwrap_or(true)
            })
            .map(|edge| (edge.to, edge.prompt_kind))
    }
}
