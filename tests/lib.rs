//! Shared setup for the tictactoe integration tests.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use lambda_http::tower::ServiceExt;
use serde_json::Value;
use shared::clock::TickingClock;
use shared::repositories::memory_game_repository::InMemoryGameRepository;
use shared::services::game_service::GameService;
use std::sync::Arc;

use api::middleware::auth::PLAYER_ID_HEADER;
use api::state::AppState;

/// A service over an empty in-memory table with a deterministic clock. The
/// repository handle is returned so tests can inspect or disable the table.
pub fn in_memory_service() -> (Arc<InMemoryGameRepository>, GameService) {
    let repository = Arc::new(InMemoryGameRepository::new());
    let service =
        GameService::new(repository.clone()).with_clock(Arc::new(TickingClock::from_epoch()));
    (repository, service)
}

pub fn test_app(service: GameService, list_limit: usize) -> Router {
    api::app(AppState {
        game_service: Arc::new(service),
        list_limit,
    })
}

/// Sends one request through the router and returns the status and the body
/// parsed as JSON (or `Value::Null` for non-JSON bodies).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    player: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(player) = player {
        builder = builder.header(PLAYER_ID_HEADER, player);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}
