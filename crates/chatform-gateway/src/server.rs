// SPDX-FileCopyrightText: 2026 Chatform Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! `POST /bots/{slug}/webhook` accepts a raw platform payload, parks it
//! on the queue, and always answers immediately -- processing happens in
//! the worker, never in the request path.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use chatform_core::ChatformError;
use chatform_storage::queries::{bots, queue};
use chatform_storage::Database;

use crate::UPDATE_QUEUE;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/bots/{slug}/webhook", post(post_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<(), ChatformError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ChatformError::Channel {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| ChatformError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn post_webhook(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    match bots::get_bot_by_slug(&state.db, &slug).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!(%slug, "webhook for unknown bot");
            return StatusCode::NOT_FOUND.into_response();
        }
        Err(e) => {
            error!(error = %e, "bot lookup failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    }

    let entry = serde_json::json!({ "slug": slug, "update": payload });
    match queue::enqueue(&state.db, UPDATE_QUEUE, &entry.to_string()).await {
        Ok(id) => {
            debug!(%slug, queue_id = id, "webhook enqueued");
            StatusCode::OK.into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to enqueue webhook");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use chatform_storage::models::QueueEntry;
    use tower::ServiceExt;

    async fn setup() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path().join("gw.db").to_str().unwrap())
            .await
            .unwrap();
        bots::upsert_bot(&db, "testbot", "Test Bot", "token")
            .await
            .unwrap();
        (AppState { db }, dir)
    }

    fn webhook_request(slug: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/bots/{slug}/webhook"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn webhook_enqueues_and_returns_ok() {
        let (state, _dir) = setup().await;
        let app = router(state.clone());

        let response = app
            .oneshot(webhook_request("testbot", r#"{"update_id": 1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let entry: Option<QueueEntry> =
            queue::dequeue(&state.db, UPDATE_QUEUE).await.unwrap();
        let entry = entry.expect("payload must be parked on the queue");
        let parsed: serde_json::Value = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(parsed["slug"], "testbot");
        assert_eq!(parsed["update"]["update_id"], 1);
    }

    #[tokio::test]
    async fn webhook_for_unknown_bot_is_404() {
        let (state, _dir) = setup().await;
        let app = router(state.clone());

        let response = app
            .oneshot(webhook_request("ghostbot", r#"{"update_id": 1}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(queue::dequeue(&state.db, UPDATE_QUEUE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn health_endpoint_answers() {
        let (state, _dir) = setup().await;
        let app = router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
