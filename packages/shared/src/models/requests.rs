use serde::{Deserialize, Serialize};

use crate::models::game::Cell;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGameRequest {
    /// Generated when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub invitee_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub cell: Cell,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListGamesQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}
