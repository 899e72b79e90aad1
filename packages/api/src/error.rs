use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shared::repositories::errors::game_repository_errors::GameRepositoryError;
use shared::services::errors::game_service_errors::GameServiceError;

#[derive(Debug)]
pub enum ApiError {
    GameService(GameServiceError),
    MissingPlayer,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    BadRequest(String),
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::GameService(GameServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::GameService(GameServiceError::GameAlreadyExists(_)) => StatusCode::CONFLICT,
            ApiError::GameService(GameServiceError::RepositoryError(
                GameRepositoryError::ResourceNotReady(_),
            )) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GameService(GameServiceError::RepositoryError(
                GameRepositoryError::Transport(_) | GameRepositoryError::Serialization(_),
            )) => StatusCode::INTERNAL_SERVER_ERROR,

            ApiError::MissingPlayer => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> String {
        match self {
            // Backend details stay in the logs.
            ApiError::GameService(GameServiceError::RepositoryError(
                GameRepositoryError::Transport(_) | GameRepositoryError::Serialization(_),
            )) => "Internal server error".to_string(),
            ApiError::GameService(err) => err.to_string(),
            ApiError::MissingPlayer => "Missing X-Player-Id header".to_string(),
            ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}
