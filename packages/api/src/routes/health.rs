use axum::{extract::State, http::StatusCode};
use lambda_http::tracing::warn;

use crate::state::AppState;

/// Reports healthy only once the games table can serve reads and writes.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, String) {
    match state.game_service.is_table_active().await {
        Ok(true) => (StatusCode::OK, "Healthy!".to_string()),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "Games table not active".to_string(),
        ),
        Err(e) => {
            warn!("Health check could not reach the games table: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "Games table unreachable".to_string(),
            )
        }
    }
}
