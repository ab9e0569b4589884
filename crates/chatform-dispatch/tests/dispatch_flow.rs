// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dispatcher routing: form-claim precedence, suppress-form interception,
//! registration-order matching, and handler audit stamps.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use chatform_core::types::{
    InboundChat, InboundEvent, InboundMessage, InboundUpdate, InboundUser, InlineKeyboard,
    SentMessage,
};
use chatform_core::{ChannelClient, ChatformError};
use chatform_dispatch::{
    handler_fn, CommandHandler, DefaultHandler, Dispatcher, FormHandler, HandlerRegistry,
};
use chatform_forms::fields::FieldSpec;
use chatform_forms::form::FormDefinition;
use chatform_forms::FormRegistry;
use chatform_storage::queries::{bots, updates};
use chatform_storage::Database;

/// Minimal channel client: fabricates ids, records sent texts.
struct FakeClient {
    next_message_id: AtomicI64,
    next_date: AtomicI64,
    sent: Mutex<Vec<String>>,
}

impl FakeClient {
    fn new() -> Self {
        Self {
            next_message_id: AtomicI64::new(1000),
            next_date: AtomicI64::new(1_000_000),
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelClient for FakeClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        _keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(SentMessage {
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            chat_id,
            date: self.next_date.fetch_add(10, Ordering::SeqCst),
            text: text.to_string(),
        })
    }

    async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        _keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(SentMessage {
            message_id,
            chat_id,
            date: 0,
            text: text.to_string(),
        })
    }

    async fn edit_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        _keyboard: Option<&InlineKeyboard>,
    ) -> Result<SentMessage, ChatformError> {
        Ok(SentMessage {
            message_id,
            chat_id,
            date: 0,
            text: String::new(),
        })
    }
}

fn text_update(update_id: i64, message_id: i64, date: i64, text: &str) -> InboundUpdate {
    InboundUpdate {
        update_id,
        event: InboundEvent::Message(InboundMessage {
            message_id,
            chat: InboundChat {
                id: 100,
                kind: "private".into(),
                username: None,
                first_name: Some("Test".into()),
                last_name: None,
                title: None,
            },
            from: Some(InboundUser {
                id: 7,
                is_bot: false,
                first_name: "Test".into(),
                last_name: None,
                username: None,
            }),
            date,
            text: Some(text.into()),
            reply_to_message_id: None,
        }),
        payload: json!({"update_id": update_id}),
    }
}

fn note_form() -> FormDefinition {
    FormDefinition::builder("note")
        .field(FieldSpec::text("title").prompt("Enter title:"))
        .field(FieldSpec::text("body").prompt("Enter body:"))
        .build()
        .unwrap()
}

struct Setup {
    db: Database,
    dispatcher: Dispatcher,
    client: Arc<FakeClient>,
    _dir: tempfile::TempDir,
}

async fn setup(handlers: HandlerRegistry) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("dispatch.db").to_str().unwrap())
        .await
        .unwrap();
    bots::upsert_bot(&db, "testbot", "Test Bot", "token")
        .await
        .unwrap();

    let mut forms = FormRegistry::new();
    forms.register(note_form());

    let client = Arc::new(FakeClient::new());
    let mut dispatcher = Dispatcher::new(db.clone(), Arc::new(handlers), Arc::new(forms));
    dispatcher.register_client("testbot", client.clone());

    Setup {
        db,
        dispatcher,
        client,
        _dir: dir,
    }
}

fn standard_handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();
    handlers.register(
        "testbot",
        Arc::new(FormHandler::new("add_note", "/add", "note")),
    );
    handlers.register(
        "testbot",
        Arc::new(
            CommandHandler::new(
                "help",
                "/help",
                handler_fn(|ctx| {
                    Box::pin(async move {
                        ctx.client
                            .send_message(ctx.saved.chat.chat_id, "Commands: /add", None)
                            .await?;
                        Ok(())
                    })
                }),
            )
            .suppress_form(true),
        ),
    );
    handlers.register(
        "testbot",
        Arc::new(DefaultHandler::new("fallback").with_callback(handler_fn(|ctx| {
            Box::pin(async move {
                ctx.client
                    .send_message(ctx.saved.chat.chat_id, "I did not understand that.", None)
                    .await?;
                Ok(())
            })
        }))),
    );
    handlers
}

#[tokio::test]
async fn command_starts_form_and_form_claims_following_text() {
    let s = setup(standard_handlers()).await;

    s.dispatcher
        .dispatch("testbot", &text_update(1, 1, 2_000_000, "/add"))
        .await
        .unwrap();
    assert_eq!(s.client.sent(), vec!["Enter title:".to_string()]);

    // Plain text now goes into the form, NOT the fallback handler.
    s.dispatcher
        .dispatch("testbot", &text_update(2, 2, 2_000_100, "shopping"))
        .await
        .unwrap();
    assert_eq!(s.client.sent().last().unwrap(), "Enter body:");

    // Completing the form releases the chat back to ordinary dispatch.
    s.dispatcher
        .dispatch("testbot", &text_update(3, 3, 2_000_200, "milk and bread"))
        .await
        .unwrap();
    s.dispatcher
        .dispatch("testbot", &text_update(4, 4, 2_000_300, "random chatter"))
        .await
        .unwrap();
    assert_eq!(s.client.sent().last().unwrap(), "I did not understand that.");
}

#[tokio::test]
async fn suppress_form_handler_intercepts_mid_form() {
    let s = setup(standard_handlers()).await;

    s.dispatcher
        .dispatch("testbot", &text_update(1, 1, 2_000_000, "/add"))
        .await
        .unwrap();
    s.dispatcher
        .dispatch("testbot", &text_update(2, 2, 2_000_100, "/help"))
        .await
        .unwrap();

    assert_eq!(s.client.sent().last().unwrap(), "Commands: /add");

    // The form is still in progress: the next text feeds it.
    s.dispatcher
        .dispatch("testbot", &text_update(3, 3, 2_000_200, "shopping"))
        .await
        .unwrap();
    assert_eq!(s.client.sent().last().unwrap(), "Enter body:");
}

#[tokio::test]
async fn handler_names_are_stamped_for_audit() {
    let s = setup(standard_handlers()).await;

    s.dispatcher
        .dispatch("testbot", &text_update(1, 1, 2_000_000, "/add"))
        .await
        .unwrap();
    s.dispatcher
        .dispatch("testbot", &text_update(2, 2, 2_000_100, "hello"))
        .await
        .unwrap();

    let start = updates::get_update(&s.db, 1).await.unwrap().unwrap();
    assert_eq!(start.handler.as_deref(), Some("add_note"));
    // The follow-up was claimed by the form, which stamps its owning
    // handler's name.
    let follow_up = updates::get_update(&s.db, 2).await.unwrap().unwrap();
    assert_eq!(follow_up.handler.as_deref(), Some("add_note"));
}

#[tokio::test]
async fn registration_order_decides_between_overlapping_handlers() {
    let mut handlers = HandlerRegistry::new();
    for name in ["first", "second"] {
        handlers.register(
            "testbot",
            Arc::new(DefaultHandler::new(name).with_callback(handler_fn(|ctx| {
                Box::pin(async move {
                    ctx.client
                        .send_message(
                            ctx.saved.chat.chat_id,
                            ctx.update.input_text().unwrap_or(""),
                            None,
                        )
                        .await?;
                    Ok(())
                })
            }))),
        );
    }
    let s = setup(handlers).await;

    s.dispatcher
        .dispatch("testbot", &text_update(1, 1, 2_000_000, "ping"))
        .await
        .unwrap();

    let stamped = updates::get_update(&s.db, 1).await.unwrap().unwrap();
    assert_eq!(stamped.handler.as_deref(), Some("first"));
    assert_eq!(s.client.sent(), vec!["ping".to_string()]);
}

#[tokio::test]
async fn unknown_bot_slug_is_an_error() {
    let s = setup(standard_handlers()).await;
    let error = s
        .dispatcher
        .dispatch("ghostbot", &text_update(1, 1, 2_000_000, "hi"))
        .await
        .unwrap_err();
    assert!(matches!(error, ChatformError::UnknownBot { slug } if slug == "ghostbot"));
}

#[tokio::test]
async fn no_matching_handler_is_not_an_error() {
    let mut handlers = HandlerRegistry::new();
    handlers.register(
        "testbot",
        Arc::new(FormHandler::new("add_note", "/add", "note")),
    );
    let s = setup(handlers).await;

    // Plain text, no form in flight, no default handler: dropped quietly.
    s.dispatcher
        .dispatch("testbot", &text_update(1, 1, 2_000_000, "hello"))
        .await
        .unwrap();
    assert!(s.client.sent().is_empty());
}
