// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The form state machine.
//!
//! A [`FormDefinition`] is built once per form kind and shared; a
//! [`Form`] pairs it with the per-conversation [`FormState`]. Exactly
//! one field is current while the form is active; once finished, no
//! further input is accepted and the dispatcher routes events back to
//! ordinary handlers.
//!
//! Turn protocol: validate input against the current field; on success
//! advance along the first matching edge (or finish when none matches);
//! on failure re-prompt the same field with its errors. State is
//! persisted before every outbound send, so a crashed send leaves a
//! resumable conversation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::FormError;
use crate::fields::{FieldSpec, FieldState};
use crate::graph::{Condition, Edge, FieldGraph, FieldId, PromptKind};
use crate::repository::FormRepository;
use crate::CleanedData;

/// In-form command that abandons the conversation.
pub const CANCEL_COMMAND: &str = "/cancel";

/// Domain logic injected into a form's terminal transitions.
///
/// `on_complete` is the one place handler authors act on the collected
/// answers (write a record, send a confirmation). Both hooks may send
/// messages through the repository.
#[async_trait]
pub trait FormHooks: Send + Sync {
    async fn on_complete(
        &self,
        _repo: &mut FormRepository<'_>,
        _cleaned: &CleanedData,
    ) -> Result<(), FormError> {
        Ok(())
    }

    async fn on_cancel(
        &self,
        _repo: &mut FormRepository<'_>,
        _cleaned: &CleanedData,
    ) -> Result<(), FormError> {
        Ok(())
    }
}

/// Hooks that do nothing.
pub struct NoHooks;

#[async_trait]
impl FormHooks for NoHooks {}

/// Immutable definition of a form kind: its field graph and hooks.
pub struct FormDefinition {
    kind: String,
    graph: FieldGraph,
    hooks: Arc<dyn FormHooks>,
}

impl FormDefinition {
    pub fn builder(kind: impl Into<String>) -> FormBuilder {
        FormBuilder {
            kind: kind.into(),
            fields: Vec::new(),
            edges: Vec::new(),
            hooks: Arc::new(NoHooks),
        }
    }

    /// The stable registry key this definition is stored under.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn graph(&self) -> &FieldGraph {
        &self.graph
    }

    pub fn hooks(&self) -> &Arc<dyn FormHooks> {
        &self.hooks
    }

    /// Fresh runtime state for a new conversation.
    pub fn new_state(&self) -> FormState {
        FormState {
            current: None,
            previous: None,
            current_prompt_kind: PromptKind::NewMessage,
            cleaned_data: CleanedData::new(),
            is_finished: false,
            fields: vec![FieldState::default(); self.graph.len()],
        }
    }
}

/// Declarative builder for a [`FormDefinition`].
///
/// Fields are declared in order; the first becomes the root. When no
/// explicit edge is declared, declaration order becomes a linear chain.
pub struct FormBuilder {
    kind: String,
    fields: Vec<FieldSpec>,
    edges: Vec<(String, String, Option<Condition>, PromptKind)>,
    hooks: Arc<dyn FormHooks>,
}

impl FormBuilder {
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Unconditional edge; always matches when scanned.
    pub fn edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edge_with(from, to, None, PromptKind::NewMessage)
    }

    /// Conditional edge. Edges are scanned in declaration order; the
    /// first whose condition holds is taken.
    pub fn edge_if(
        self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: impl Fn(&serde_json::Value, &CleanedData) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.edge_with(from, to, Some(Arc::new(condition)), PromptKind::NewMessage)
    }

    /// Edge with full control over condition and prompt delivery.
    pub fn edge_with(
        mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        condition: Option<Condition>,
        prompt_kind: PromptKind,
    ) -> Self {
        self.edges
            .push((from.into(), to.into(), condition, prompt_kind));
        self
    }

    pub fn hooks(mut self, hooks: Arc<dyn FormHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn build(self) -> Result<FormDefinition, FormError> {
        if self.fields.is_empty() {
            return Err(FormError::NoFields);
        }

        let mut by_name: HashMap<String, FieldId> = HashMap::new();
        for (index, field) in self.fields.iter().enumerate() {
            if by_name
                .insert(field.name.clone(), FieldId(index))
                .is_some()
            {
                return Err(FormError::DuplicateField(field.name.clone()));
            }
        }

        let edges = if self.edges.is_empty() {
            // No explicit edges: chain the declared fields linearly.
            (1..self.fields.len())
                .map(|index| Edge {
                    from: FieldId(index - 1),
                    to: FieldId(index),
                    condition: None,
                    prompt_kind: PromptKind::NewMessage,
                })
                .collect()
        } else {
            let mut edges = Vec::with_capacity(self.edges.len());
            for (from, to, condition, prompt_kind) in self.edges {
                let from = *by_name
                    .get(&from)
                    .ok_or(FormError::UnknownEdgeField(from))?;
                let to = *by_name.get(&to).ok_or(FormError::UnknownEdgeField(to))?;
                edges.push(Edge {
                    from,
                    to,
                    condition,
                    prompt_kind,
                });
            }
            edges
        };

        Ok(FormDefinition {
            kind: self.kind,
            graph: FieldGraph::new(self.fields, by_name, edges),
            hooks: self.hooks,
        })
    }
}

/// Lifecycle position of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    NotStarted,
    InProgress,
    Finished,
}

/// Mutable per-conversation state.
#[derive(Debug, Clone)]
pub struct FormState {
    /// The one field awaiting input while the form is active.
    pub current: Option<FieldId>,
    /// The field visited before the current one.
    pub previous: Option<FieldId>,
    /// How the current field's prompt is (re-)delivered.
    pub current_prompt_kind: PromptKind,
    /// Only gains entries for fields that validated; failed attempts are
    /// never merged. Re-visits overwrite.
    pub cleaned_data: CleanedData,
    pub is_finished: bool,
    /// Parallel to the graph arena.
    pub fields: Vec<FieldState>,
}

/// One running conversation: shared definition plus its state.
pub struct Form {
    def: Arc<FormDefinition>,
    state: FormState,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("kind", &self.def.kind)
            .field("state", &self.state)
            .finish()
    }
}

impl Form {
    pub fn new(def: Arc<FormDefinition>) -> Self {
        let state = def.new_state();
        Self { def, state }
    }

    /// Rebind a definition to state rehydrated from storage.
    pub fn from_state(def: Arc<FormDefinition>, state: FormState) -> Self {
        Self { def, state }
    }

    pub fn definition(&self) -> &Arc<FormDefinition> {
        &self.def
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn cleaned_data(&self) -> &CleanedData {
        &self.state.cleaned_data
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished
    }

    pub fn status(&self) -> FormStatus {
        if self.state.is_finished {
            FormStatus::Finished
        } else if self.state.current.is_some() {
            FormStatus::InProgress
        } else {
            FormStatus::NotStarted
        }
    }

    pub fn current_field_name(&self) -> Option<&str> {
        self.state
            .current
            .map(|id| self.def.graph().field(id).name.as_str())
    }

    /// Position the cursor on the root field, send its prompt, and
    /// persist. State is saved before the send.
    pub async fn start(&mut self, repo: &mut FormRepository<'_>) -> Result<(), FormError> {
        let def = Arc::clone(&self.def);
        let root = def.graph().root();
        self.state.current = Some(root);
        self.state.current_prompt_kind = PromptKind::NewMessage;
        repo.save(&def, &self.state).await?;

        debug!(kind = def.kind(), "form started");
        self.send_current_prompt(&def, repo).await
    }

    /// Feed one inbound input into the current field.
    ///
    /// Persistence is unconditional: valid, invalid, and cancelled turns
    /// all save, so an errored-out retry attempt is durably resumable.
    pub async fn input(
        &mut self,
        raw: &str,
        repo: &mut FormRepository<'_>,
    ) -> Result<(), FormError> {
        if self.state.is_finished {
            return Err(FormError::Finished);
        }
        let current = self.state.current.ok_or(FormError::NotStarted)?;
        let def = Arc::clone(&self.def);

        if raw.trim() == CANCEL_COMMAND {
            self.state.is_finished = true;
            repo.save(&def, &self.state).await?;
            debug!(kind = def.kind(), "form cancelled");
            return def
                .hooks()
                .on_cancel(repo, &self.state.cleaned_data)
                .await;
        }

        let spec = def.graph().field(current);
        let mut field_state = std::mem::take(&mut self.state.fields[current.0]);
        spec.input(raw, &self.state.cleaned_data, &mut field_state);

        if field_state.is_valid
            && let Some(value) = field_state.value.clone()
        {
            self.state.fields[current.0] = field_state;
            self.state
                .cleaned_data
                .insert(spec.name.clone(), value.clone());

            match def
                .graph()
                .next_field(current, &value, &self.state.cleaned_data)
            {
                Some((next, prompt_kind)) => {
                    self.state.previous = Some(current);
                    self.state.current = Some(next);
                    self.state.current_prompt_kind = prompt_kind;
                    repo.save(&def, &self.state).await?;
                    self.send_current_prompt(&def, repo).await
                }
                None => {
                    self.state.is_finished = true;
                    repo.save(&def, &self.state).await?;
                    debug!(kind = def.kind(), "form finished");
                    def.hooks()
                        .on_complete(repo, &self.state.cleaned_data)
                        .await
                }
            }
        } else {
            // Invalid input: cursor stays, the same field re-prompts with
            // its accumulated errors.
            self.state.fields[current.0] = field_state;
            repo.save(&def, &self.state).await?;
            self.send_current_prompt(&def, repo).await
        }
    }

    async fn send_current_prompt(
        &mut self,
        def: &FormDefinition,
        repo: &mut FormRepository<'_>,
    ) -> Result<(), FormError> {
        let Some(current) = self.state.current else {
            return Err(FormError::NotStarted);
        };
        let spec = def.graph().field(current);
        let text = spec.render_prompt(&self.state.cleaned_data, &self.state.fields[current.0]);
        let keyboard = spec.render_keyboard(&self.state.cleaned_data);
        repo.send_prompt(self.state.current_prompt_kind, &text, keyboard.as_ref())
            .await
    }
}
