#[derive(Debug)]
pub enum GameRepositoryError {
    Serialization(String),
    Transport(String),
    ResourceNotReady(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::Transport(msg) => write!(f, "DynamoDB error: {}", msg),
            GameRepositoryError::ResourceNotReady(msg) => {
                write!(f, "Games table not ready: {}", msg)
            }
        }
    }
}

impl std::error::Error for GameRepositoryError {}
