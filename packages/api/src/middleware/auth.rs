use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::ApiError, state::AppState};

pub const PLAYER_ID_HEADER: &str = "X-Player-Id";

/// The player making the request, taken from the `X-Player-Id` header.
#[derive(Debug, Clone)]
pub struct ActingPlayer {
    pub player_id: String,
}

impl FromRequestParts<AppState> for ActingPlayer {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let player_id = parts
            .headers
            .get(PLAYER_ID_HEADER)
            .ok_or(ApiError::MissingPlayer)?
            .to_str()
            .map_err(|_| ApiError::BadRequest("Invalid player header format".to_string()))?
            .trim();

        if player_id.is_empty() {
            return Err(ApiError::MissingPlayer);
        }

        Ok(ActingPlayer {
            player_id: player_id.to_string(),
        })
    }
}
