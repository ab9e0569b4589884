// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook gateway for the chatform framework.
//!
//! The HTTP side acknowledges every delivery immediately and parks the
//! payload on the durable queue; the worker side drains the queue and
//! hands normalized updates to the dispatcher. A crashed worker never
//! loses a delivery, only retries it.

pub mod server;
pub mod worker;

pub use server::{router, start_server, AppState, ServerConfig};
pub use worker::Worker;

/// Name of the queue webhook deliveries are parked on.
pub const UPDATE_QUEUE: &str = "updates";
