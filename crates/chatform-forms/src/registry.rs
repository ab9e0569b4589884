// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The form registry.
//!
//! Each form kind self-registers under a stable string key at startup;
//! the persistence layer stores and looks up that key. A stored kind
//! missing from the registry (stale deployment) is an explicit error,
//! never an uncontrolled failure.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::FormError;
use crate::form::FormDefinition;

/// Registry mapping form kind keys to their definitions.
///
/// Built once at process start and passed by reference into the
/// dispatcher.
#[derive(Default)]
pub struct FormRegistry {
    forms: HashMap<String, Arc<FormDefinition>>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own kind key. The last
    /// registration for a key wins.
    pub fn register(&mut self, definition: FormDefinition) -> &mut Self {
        self.forms
            .insert(definition.kind().to_string(), Arc::new(definition));
        self
    }

    pub fn get(&self, kind: &str) -> Result<Arc<FormDefinition>, FormError> {
        self.forms
            .get(kind)
            .cloned()
            .ok_or_else(|| FormError::UnknownKind(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.forms.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.forms.keys().map(|k| k.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldSpec;

    fn definition(kind: &str) -> FormDefinition {
        FormDefinition::builder(kind)
            .field(FieldSpec::text("only").prompt("?"))
            .build()
            .unwrap()
    }

    #[test]
    fn registered_kind_resolves() {
        let mut registry = FormRegistry::new();
        registry.register(definition("todo_add"));
        assert!(registry.contains("todo_add"));
        assert_eq!(registry.get("todo_add").unwrap().kind(), "todo_add");
    }

    #[test]
    fn unknown_kind_is_a_typed_error() {
        let registry = FormRegistry::new();
        let error = registry.get("renamed_form").unwrap_err();
        assert!(matches!(error, FormError::UnknownKind(k) if k == "renamed_form"));
    }
}
