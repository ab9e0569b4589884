// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Field specifications and their runtime state.
//!
//! A [`FieldSpec`] is declarative and immutable: name, prompt, typing,
//! validators. The mutable per-conversation part (last value, validity,
//! accumulated errors) lives in [`FieldState`], built fresh for every
//! form instance, so nothing ever leaks between conversations.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use chatform_core::types::InlineKeyboard;

use crate::CleanedData;

/// A prompt text, either fixed or derived from the answers so far.
#[derive(Clone)]
pub enum PromptSource {
    Static(String),
    Computed(Arc<dyn Fn(&CleanedData) -> String + Send + Sync>),
}

impl PromptSource {
    pub fn render(&self, cleaned: &CleanedData) -> String {
        match self {
            PromptSource::Static(text) => text.clone(),
            PromptSource::Computed(f) => f(cleaned),
        }
    }
}

/// An inline keyboard, absent, fixed, or derived from the answers so far.
#[derive(Clone, Default)]
pub enum KeyboardSource {
    #[default]
    None,
    Static(InlineKeyboard),
    Computed(Arc<dyn Fn(&CleanedData) -> Option<InlineKeyboard> + Send + Sync>),
}

impl KeyboardSource {
    pub fn render(&self, cleaned: &CleanedData) -> Option<InlineKeyboard> {
        match self {
            KeyboardSource::None => None,
            KeyboardSource::Static(keyboard) => Some(keyboard.clone()),
            KeyboardSource::Computed(f) => f(cleaned),
        }
    }
}

/// A custom validation predicate over the converted value and the
/// answers so far. Returns the error text to show the user on failure.
pub type Validator = Arc<dyn Fn(&Value, &CleanedData) -> Result<(), String> + Send + Sync>;

/// The typing and built-in constraints of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Integer {
        min_value: Option<i64>,
        max_value: Option<i64>,
    },
}

impl FieldKind {
    /// Convert raw input into a typed value, or the error text to show.
    fn convert(&self, raw: &str) -> Result<Value, String> {
        match self {
            FieldKind::Text { .. } => Ok(Value::String(raw.to_string())),
            FieldKind::Integer { .. } => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| "Enter a whole number.".to_string()),
        }
    }

    /// Built-in range/length checks on the converted value.
    fn check(&self, value: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        match self {
            FieldKind::Text {
                min_length,
                max_length,
            } => {
                let len = value.as_str().map(|s| s.chars().count()).unwrap_or(0);
                if let Some(min) = min_length
                    && len < *min
                {
                    errors.push(format!(
                        "Ensure this value has at least {min} characters."
                    ));
                }
                if let Some(max) = max_length
                    && len > *max
                {
                    errors.push(format!("Ensure this value has at most {max} characters."));
                }
            }
            FieldKind::Integer {
                min_value,
                max_value,
            } => {
                let n = value.as_i64().unwrap_or_default();
                if let Some(min) = min_value
                    && n < *min
                {
                    errors.push(format!(
                        "Ensure this value is greater than or equal to {min}."
                    ));
                }
                if let Some(max) = max_value
                    && n > *max
                {
                    errors.push(format!(
                        "Ensure this value is less than or equal to {max}."
                    ));
                }
            }
        }
        errors
    }
}

/// Declarative specification of one prompt/validate/advance step.
#[derive(Clone)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub prompt: PromptSource,
    pub keyboard: KeyboardSource,
    /// Overrides the type-conversion error text when set.
    pub error_message: Option<String>,
    pub validators: Vec<Validator>,
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("validators", &self.validators.len())
            .finish()
    }
}

impl FieldSpec {
    /// A free-text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text {
                min_length: None,
                max_length: None,
            },
            prompt: PromptSource::Static(String::new()),
            keyboard: KeyboardSource::None,
            error_message: None,
            validators: Vec::new(),
        }
    }

    /// A whole-number field.
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Integer {
                min_value: None,
                max_value: None,
            },
            ..Self::text(name)
        }
    }

    pub fn prompt(mut self, text: impl Into<String>) -> Self {
        self.prompt = PromptSource::Static(text.into());
        self
    }

    /// Derive the prompt from the answers collected so far.
    pub fn prompt_with(
        mut self,
        f: impl Fn(&CleanedData) -> String + Send + Sync + 'static,
    ) -> Self {
        self.prompt = PromptSource::Computed(Arc::new(f));
        self
    }

    pub fn keyboard(mut self, keyboard: InlineKeyboard) -> Self {
        self.keyboard = KeyboardSource::Static(keyboard);
        self
    }

    /// Derive the keyboard from the answers collected so far.
    pub fn keyboard_with(
        mut self,
        f: impl Fn(&CleanedData) -> Option<InlineKeyboard> + Send + Sync + 'static,
    ) -> Self {
        self.keyboard = KeyboardSource::Computed(Arc::new(f));
        self
    }

    pub fn error_message(mut self, text: impl Into<String>) -> Self {
        self.error_message = Some(text.into());
        self
    }

    pub fn validator(
        mut self,
        f: impl Fn(&Value, &CleanedData) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validators.push(Arc::new(f));
        self
    }

    pub fn min_length(mut self, limit: usize) -> Self {
        if let FieldKind::Text { min_length, .. } = &mut self.kind {
            *min_length = Some(limit);
        }
        self
    }

    pub fn max_length(mut self, limit: usize) -> Self {
        if let FieldKind::Text { max_length, .. } = &mut self.kind {
            *max_length = Some(limit);
        }
        self
    }

    pub fn min_value(mut self, limit: i64) -> Self {
        if let FieldKind::Integer { min_value, .. } = &mut self.kind {
            *min_value = Some(limit);
        }
        self
    }

    pub fn max_value(mut self, limit: i64) -> Self {
        if let FieldKind::Integer { max_value, .. } = &mut self.kind {
            *max_value = Some(limit);
        }
        self
    }

    /// Feed raw user input into this field's state.
    ///
    /// Conversion and validation failures never escape the field: they
    /// clear `is_valid` and accumulate into `state.errors`, which the
    /// next prompt rendering carries. The raw input is kept as the value
    /// when conversion fails, the typed value otherwise.
    pub fn input(&self, raw: &str, cleaned: &CleanedData, state: &mut FieldState) {
        state.errors.clear();
        state.is_valid = false;

        match self.kind.convert(raw) {
            Err(conversion_error) => {
                state.value = Some(Value::String(raw.to_string()));
                state
                    .errors
                    .push(self.error_message.clone().unwrap_or(conversion_error));
            }
            Ok(value) => {
                let mut errors = self.kind.check(&value);
                for validator in &self.validators {
                    if let Err(message) = validator(&value, cleaned) {
                        errors.push(message);
                    }
                }
                state.value = Some(value);
                if errors.is_empty() {
                    state.is_valid = true;
                } else {
                    state.errors = errors;
                }
            }
        }
    }

    /// Render this field's prompt, error text first when a retry.
    pub fn render_prompt(&self, cleaned: &CleanedData, state: &FieldState) -> String {
        let prompt = self.prompt.render(cleaned);
        if state.errors.is_empty() {
            prompt
        } else {
            format!("{}\n\n{}", state.errors.join("\n"), prompt)
        }
    }

    pub fn render_keyboard(&self, cleaned: &CleanedData) -> Option<InlineKeyboard> {
        self.keyboard.render(cleaned)
    }
}

/// Mutable per-conversation state of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldState {
    /// Last input: raw string if conversion failed, typed value once
    /// validated.
    pub value: Option<Value>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl FieldState {
    pub fn is_bound(&self) -> bool {
        self.value.is_some()
    }
}
