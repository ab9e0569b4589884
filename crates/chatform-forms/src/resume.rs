// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resumption lookup: which stored form, if any, does an inbound event
//! continue?
//!
//! For a free-text message the candidate is the chat's most recent
//! outbound message preceding it in platform date order; for a callback
//! query it is the message the pressed keyboard was attached to. The
//! candidate resolves to the conversation root either directly (it owns
//! the form) or through its `form_root_id` indirection. Finished forms
//! never claim events.

use tracing::{debug, warn};

use chatform_core::types::UpdateKind;
use chatform_storage::models::{FormRow, MessageRow, SavedUpdate};
use chatform_storage::queries::{forms, messages};
use chatform_storage::Database;

use crate::error::FormError;

/// A stored, unfinished form claiming an inbound event.
#[derive(Debug, Clone)]
pub struct ActiveForm {
    /// The root prompt message owning the form row.
    pub root: MessageRow,
    /// The outbound message the event answers -- the one an in-place
    /// prompt update edits.
    pub anchor: MessageRow,
    pub form: FormRow,
}

/// Resolve the unfinished form continuing `saved`, if any.
///
/// `None` means "treat as plain handler dispatch instead".
pub async fn find_active_form(
    db: &Database,
    saved: &SavedUpdate,
) -> Result<Option<ActiveForm>, FormError> {
    let is_callback = saved.update.kind == UpdateKind::CallbackQuery.to_string();

    let candidate = if is_callback {
        // The stored message IS the bot message the button lives on.
        Some(saved.message.clone())
    } else {
        messages::previous_outbound(db, saved.chat.id, saved.message.date, saved.message.id)
            .await?
    };

    let Some(candidate) = candidate else {
        return Ok(None);
    };
    resolve(db, candidate).await
}

/// Walk a candidate outbound message to its root and form row.
async fn resolve(db: &Database, candidate: MessageRow) -> Result<Option<ActiveForm>, FormError> {
    let root = if candidate.form_id.is_some() {
        candidate.clone()
    } else if let Some(root_id) = candidate.form_root_id {
        match messages::get_message(db, root_id).await? {
            Some(root) => root,
            None => {
                warn!(root_id, "form root message is gone");
                return Ok(None);
            }
        }
    } else {
        return Ok(None);
    };

    let Some(form_id) = root.form_id else {
        warn!(message_pk = root.id, "root message lost its form pointer");
        return Ok(None);
    };
    let Some(form) = forms::get_form(db, form_id).await? else {
        warn!(form_id, "form row is gone");
        return Ok(None);
    };
    if form.is_finished {
        debug!(form_id, "form is finished; falling through to handlers");
        return Ok(None);
    }

    Ok(Some(ActiveForm {
        root,
        anchor: candidate,
        form,
    }))
}
