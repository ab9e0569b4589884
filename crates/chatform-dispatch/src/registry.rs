// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The handler registry: bot slug to ordered handler list.
//!
//! Built once at process start and passed by reference into the
//! dispatcher -- registration order is match precedence, and there is no
//! global mutable state to invalidate between tests or reloads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::handlers::Handler;

#[derive(Default)]
pub struct HandlerRegistry {
    bots: HashMap<String, Vec<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler to a bot's scan list. Order of calls is match
    /// precedence.
    pub fn register(&mut self, slug: impl Into<String>, handler: Arc<dyn Handler>) -> &mut Self {
        self.bots.entry(slug.into()).or_default().push(handler);
        self
    }

    pub fn handlers_for(&self, slug: &str) -> &[Arc<dyn Handler>] {
        self.bots.get(slug).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.bots.keys().map(|k| k.as_str())
    }
}
