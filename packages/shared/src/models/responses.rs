use serde::{Deserialize, Serialize};

use crate::models::board::{Board, GameOutcome};
use crate::models::game::GameRecord;
use crate::services::game_service::TransitionOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub game_id: String,
    pub squares: Vec<String>,
    pub turn: String,
    pub result: Option<String>,
}

impl BoardResponse {
    pub fn new(game: &GameRecord, board: &Board) -> Self {
        BoardResponse {
            game_id: game.game_id.clone(),
            squares: board.squares().iter().map(|s| s.to_string()).collect(),
            turn: game.turn.clone(),
            result: game.result.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionResponse {
    pub game_id: String,
    pub outcome: TransitionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnResponse {
    pub game: GameRecord,
    pub outcome: GameOutcome,
}
