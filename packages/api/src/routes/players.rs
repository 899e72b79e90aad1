use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use lambda_http::tracing::error;
use shared::models::game::{GameRecord, Phase};
use shared::models::requests::ListGamesQuery;

use crate::{error::ApiError, middleware::auth::ActingPlayer, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/players/me/invites", get(list_invites))
        .route("/players/me/games", get(list_games))
}

fn limit_or_default(state: &AppState, query: &ListGamesQuery) -> usize {
    query.limit.unwrap_or(state.list_limit)
}

async fn list_invites(
    State(state): State<AppState>,
    player: ActingPlayer,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<Vec<GameRecord>>, ApiError> {
    state
        .game_service
        .get_invites(&player.player_id, limit_or_default(&state, &query))
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list invites for {}: {}", player.player_id, e);
            ApiError::from(e)
        })
}

async fn list_games(
    State(state): State<AppState>,
    player: ActingPlayer,
    Query(query): Query<ListGamesQuery>,
) -> Result<Json<Vec<GameRecord>>, ApiError> {
    let phase = match query.status.as_deref() {
        Some(raw) => raw
            .parse::<Phase>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Phase::InProgress,
    };

    state
        .game_service
        .get_games_by_status(&player.player_id, phase, limit_or_default(&state, &query))
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to list {} games for {}: {}", phase, player.player_id, e);
            ApiError::from(e)
        })
}
