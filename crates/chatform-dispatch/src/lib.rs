// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Handler routing and update dispatch.
//!
//! An inbound event is first offered to the unfinished form owning its
//! chat, if any; handlers that declare `suppress_form` can intercept it
//! even then (global commands like `/help`). Otherwise handlers are
//! scanned in registration order and the first match wins.

pub mod dispatcher;
pub mod handlers;
pub mod registry;

pub use dispatcher::Dispatcher;
pub use handlers::{
    handler_fn, is_command, CommandHandler, DefaultHandler, DispatchContext, FormHandler, Handler,
    HandlerCallback,
};
pub use registry::HandlerRegistry;
