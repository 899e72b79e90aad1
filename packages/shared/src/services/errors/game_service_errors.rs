use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    RepositoryError(GameRepositoryError),
    ValidationError(String),
    /// A create hit a `GameId` that is already stored.
    GameAlreadyExists(String),
}

impl GameServiceError {
    /// True when the games table is not yet usable and the caller should back off.
    pub fn is_resource_not_ready(&self) -> bool {
        matches!(
            self,
            GameServiceError::RepositoryError(GameRepositoryError::ResourceNotReady(_))
        )
    }
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::RepositoryError(err) => {
                write!(f, "Repository error: {}", err)
            }
            GameServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            GameServiceError::GameAlreadyExists(game_id) => {
                write!(f, "Game {} already exists", game_id)
            }
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        GameServiceError::RepositoryError(err)
    }
}
