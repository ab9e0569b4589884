// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The queue worker: dequeue, normalize, dispatch, ack/fail.
//!
//! One entry is processed at a time per worker. Dispatch errors fail the
//! entry (attempt counting decides between retry and the failed state);
//! payloads the platform layer cannot route are acked and dropped.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, warn};

use chatform_core::ChatformError;
use chatform_dispatch::Dispatcher;
use chatform_storage::queries::queue;
use chatform_storage::Database;

use crate::UPDATE_QUEUE;

/// What the gateway parks on the queue for each delivery.
#[derive(Debug, Deserialize)]
struct QueuedDelivery {
    slug: String,
    update: serde_json::Value,
}

pub struct Worker {
    db: Database,
    dispatcher: Arc<Dispatcher>,
    /// How long to sleep when the queue is empty.
    idle_wait: Duration,
}

impl Worker {
    pub fn new(db: Database, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            db,
            dispatcher,
            idle_wait: Duration::from_millis(500),
        }
    }

    /// Drain the queue forever.
    pub async fn run(&self) {
        loop {
            match self.tick().await {
                Ok(true) => {}
                Ok(false) => tokio::time::sleep(self.idle_wait).await,
                Err(e) => {
                    error!(error = %e, "worker tick failed");
                    tokio::time::sleep(self.idle_wait).await;
                }
            }
        }
    }

    /// Process at most one queue entry. Returns whether one was taken.
    pub async fn tick(&self) -> Result<bool, ChatformError> {
        let Some(entry) = queue::dequeue(&self.db, UPDATE_QUEUE).await? else {
            return Ok(false);
        };

        match self.process(&entry.payload).await {
            Ok(()) => queue::ack(&self.db, entry.id).await?,
            Err(e) => {
                warn!(queue_id = entry.id, error = %e, "delivery failed");
                queue::fail(&self.db, entry.id).await?;
            }
        }
        Ok(true)
    }

    async fn process(&self, payload: &str) -> Result<(), ChatformError> {
        let delivery: QueuedDelivery =
            serde_json::from_str(payload).map_err(|e| ChatformError::Internal(format!(
                "malformed queue payload: {e}"
            )))?;

        let Some(update) = chatform_telegram::parse_update(&delivery.update)? else {
            debug!(slug = %delivery.slug, "dropping unsupported update");
            return Ok(());
        };

        self.dispatcher.dispatch(&delivery.slug, &update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatform_core::types::{InlineKeyboard, SentMessage};
    use chatform_core::ChannelClient;
    use chatform_dispatch::HandlerRegistry;
    use chatform_forms::FormRegistry;
    use chatform_storage::queries::bots;
    use serde_json::json;

    struct NullClient;

    #[async_trait]
    impl ChannelClient for NullClient {
        async fn send_message(
            &self,
            chat_id: i64,
            text: &str,
            _keyboard: Option<&InlineKeyboard>,
        ) -> Result<SentMessage, ChatformError> {
            Ok(SentMessage {
                message_id: 1,
                chat_id,
                date: 1,
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
            Ok(SentMessage {
                message_id,
                chat_id,
                date: 1,
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
                date: 1,
                text: String::new(),
            })
        }
    }

    async fn setup() -> (Database, Worker, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("worker.db").to_str().unwrap())
            .await
            .unwrap();
        bots::upsert_bot(&db, "testbot", "Test Bot", "token")
            .await
            .unwrap();

        let mut dispatcher = Dispatcher::new(
            db.clone(),
            Arc::new(HandlerRegistry::new()),
            Arc::new(FormRegistry::new()),
        );
        dispatcher.register_client("testbot", Arc::new(NullClient));
        let worker = Worker::new(db.clone(), Arc::new(dispatcher));
        (db, worker, dir)
    }

    fn delivery(slug: &str, update: serde_json::Value) -> String {
        json!({"slug": slug, "update": update}).to_string()
    }

    #[tokio::test]
    async fn empty_queue_is_an_idle_tick() {
        let (_db, worker, _dir) = setup().await;
        assert!(!worker.tick().await.unwrap());
    }

    #[tokio::test]
    async fn valid_delivery_is_processed_and_acked() {
        let (db, worker, _dir) = setup().await;

        let update = json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 1700000000,
                "chat": {"id": 100, "type": "private"},
                "text": "hello",
            }
        });
        let id = queue::enqueue(&db, UPDATE_QUEUE, &delivery("testbot", update))
            .await
            .unwrap();

        assert!(worker.tick().await.unwrap());

        let status: String = db
            .connection()
            .call(move |conn| {
                let s = conn.query_row(
                    "SELECT status FROM queue WHERE id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )?;
                Ok::<String, rusqlite::Error>(s)
            })
            .await
            .unwrap();
        assert_eq!(status, "completed");
    }

    #[tokio::test]
    async fn unsupported_update_is_acked_and_dropped() {
        let (db, worker, _dir) = setup().await;

        let update = json!({"update_id": 2, "my_chat_member": {}});
        let id = queue::enqueue(&db, UPDATE_QUEUE, &delivery("testbot", update))
            .await
            .unwrap();
        assert!(worker.tick().await.unwrap());

        let status: String = db
            .connection()
            .call(move |conn| {
                let s = conn.query_row(
                    "SELECT status FROM queue WHERE id = ?1",
                    rusqlite::params![id],
                    |row| row.get(0),
                )?;
                Ok::<String, rusqlite::Error>(s)
            })
            .await
            .unwrap();
        assert_eq!(status, "completed");
    }

    #[tokio::test]
    async fn delivery_for_unknown_bot_is_failed_for_retry() {
        let (db, worker, _dir) = setup().await;

        let update = json!({
            "update_id": 3,
            "message": {
                "message_id": 11,
                "date": 1700000000,
                "chat": {"id": 100, "type": "private"},
                "text": "hello",
            }
        });
        let id = queue::enqueue(&db, UPDATE_QUEUE, &delivery("ghostbot", update))
            .await
            .unwrap();
        assert!(worker.tick().await.unwrap());

        let (status, attempts): (String, i32) = db
            .connection()
            .call(move |conn| {
                let pair = conn.query_row(
                    "SELECT status, attempts FROM queue WHERE id = ?1",
                    rusqlite::params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )?;
                Ok::<(String, i32), rusqlite::Error>(pair)
            })
            .await
            .unwrap();
        assert_eq!(status, "pending");
        assert_eq!(attempts, 1);
    }
}
