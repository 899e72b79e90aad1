use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lambda_http::tracing::{debug, error};
use shared::models::board::GameOutcome;
use shared::models::game::GameRecord;
use shared::models::requests::{CreateGameRequest, MoveRequest};
use shared::models::responses::{BoardResponse, TransitionResponse, TurnResponse};
use shared::services::game_service::{GameService, TransitionOutcome, TurnReport};

use crate::{error::ApiError, middleware::auth::ActingPlayer, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/{game_id}", get(get_game))
        .route("/games/{game_id}/board", get(get_board))
        .route("/games/{game_id}/accept", post(accept_game))
        .route("/games/{game_id}/reject", post(reject_game))
        .route("/games/{game_id}/moves", post(make_move))
}

async fn create_game(
    State(state): State<AppState>,
    player: ActingPlayer,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameRecord>), ApiError> {
    let game_id = payload
        .game_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let game = state
        .game_service
        .create_invite(&game_id, &player.player_id, &payload.invitee_id)
        .await
        .map_err(|e| {
            error!("Failed to create game {}: {}", game_id, e);
            ApiError::from(e)
        })?;

    debug!("Player {} created game {}", player.player_id, game_id);
    Ok((StatusCode::CREATED, Json(game)))
}

async fn load_game(state: &AppState, game_id: &str) -> Result<GameRecord, ApiError> {
    state
        .game_service
        .get_game(game_id)
        .await
        .map_err(|e| {
            error!("Failed to load game {}: {}", game_id, e);
            ApiError::from(e)
        })?
        .ok_or_else(|| ApiError::NotFound(format!("Game {} not found", game_id)))
}

async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<GameRecord>, ApiError> {
    load_game(&state, &game_id).await.map(Json)
}

async fn get_board(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<BoardResponse>, ApiError> {
    let game = load_game(&state, &game_id).await?;
    let board = GameService::project_board(&game);
    Ok(Json(BoardResponse::new(&game, &board)))
}

/// Only the invitee may answer an invite.
async fn invite_for(
    state: &AppState,
    game_id: &str,
    player: &ActingPlayer,
) -> Result<GameRecord, ApiError> {
    let game = load_game(state, game_id).await?;
    if game.opponent_id != player.player_id {
        return Err(ApiError::Forbidden(format!(
            "Player {} was not invited to game {}",
            player.player_id, game_id
        )));
    }
    Ok(game)
}

fn transition_response(
    game_id: String,
    outcome: TransitionOutcome,
    action: &str,
) -> Result<Json<TransitionResponse>, ApiError> {
    match outcome {
        TransitionOutcome::Applied => Ok(Json(TransitionResponse { game_id, outcome })),
        TransitionOutcome::Rejected => Err(ApiError::Conflict(format!(
            "Game {} can no longer be {}",
            game_id, action
        ))),
    }
}

async fn accept_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    player: ActingPlayer,
) -> Result<Json<TransitionResponse>, ApiError> {
    invite_for(&state, &game_id, &player).await?;

    let outcome = state
        .game_service
        .accept_invite(&game_id)
        .await
        .map_err(|e| {
            error!("Failed to accept game {}: {}", game_id, e);
            ApiError::from(e)
        })?;

    debug!("Player {} accept of {}: {:?}", player.player_id, game_id, outcome);
    transition_response(game_id, outcome, "accepted")
}

async fn reject_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    player: ActingPlayer,
) -> Result<Json<TransitionResponse>, ApiError> {
    invite_for(&state, &game_id, &player).await?;

    let outcome = state
        .game_service
        .reject_invite(&game_id)
        .await
        .map_err(|e| {
            error!("Failed to reject game {}: {}", game_id, e);
            ApiError::from(e)
        })?;

    debug!("Player {} reject of {}: {:?}", player.player_id, game_id, outcome);
    transition_response(game_id, outcome, "rejected")
}

async fn make_move(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    player: ActingPlayer,
    Json(payload): Json<MoveRequest>,
) -> Result<Json<TurnResponse>, ApiError> {
    let report = state
        .game_service
        .play_turn(&game_id, payload.cell, &player.player_id)
        .await
        .map_err(|e| {
            error!("Failed to play move in game {}: {}", game_id, e);
            ApiError::from(e)
        })?;

    match report {
        TurnReport::NotFound => Err(ApiError::NotFound(format!("Game {} not found", game_id))),
        TurnReport::Rejected => Err(ApiError::Conflict(format!(
            "Move at {} is not allowed for {}",
            payload.cell, player.player_id
        ))),
        TurnReport::Continued(game) => Ok(Json(TurnResponse {
            game,
            outcome: GameOutcome::InProgress,
        })),
        TurnReport::Finished(game) => {
            let board = GameService::project_board(&game);
            let outcome = state
                .game_service
                .evaluate_outcome(&board, &game, &player.player_id);
            Ok(Json(TurnResponse { game, outcome }))
        }
    }
}
