use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    clock::{Clock, SystemClock},
    models::{
        board::{Board, GameOutcome},
        game::{Cell, GameRecord, Phase, StatusDate, TERMINAL_TURN, TIE_RESULT},
    },
    repositories::game_repository::{
        Condition, FieldUpdate, GameIndex, GameRepository, Guard, WriteOutcome,
    },
    services::{
        board_evaluator::{BoardEvaluator, LineEvaluator},
        errors::game_service_errors::GameServiceError,
        recency_merge::{merge_recent, take_recent},
    },
};

/// Non-error result of a guarded transition. `Rejected` means the record was
/// not in the expected prior state when the write landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionOutcome {
    Applied,
    Rejected,
}

impl From<WriteOutcome> for TransitionOutcome {
    fn from(outcome: WriteOutcome) -> Self {
        match outcome {
            WriteOutcome::Applied => TransitionOutcome::Applied,
            WriteOutcome::GuardFailed => TransitionOutcome::Rejected,
        }
    }
}

/// What happened to a move played through [`GameService::play_turn`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnReport {
    NotFound,
    Rejected,
    Continued(GameRecord),
    Finished(GameRecord),
}

#[derive(Clone)]
pub struct GameService {
    repository: Arc<dyn GameRepository + Send + Sync>,
    clock: Arc<dyn Clock>,
    evaluator: Arc<dyn BoardEvaluator>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        GameService {
            repository,
            clock: Arc::new(SystemClock::new()),
            evaluator: Arc::new(LineEvaluator),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn BoardEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub async fn create_invite(
        &self,
        game_id: &str,
        host_id: &str,
        invitee_id: &str,
    ) -> Result<GameRecord, GameServiceError> {
        if game_id.is_empty() || host_id.is_empty() || invitee_id.is_empty() {
            return Err(GameServiceError::ValidationError(
                "Game ID, host ID, or invitee ID cannot be empty".to_string(),
            ));
        }
        if host_id == invitee_id {
            return Err(GameServiceError::ValidationError(
                "A player cannot invite themselves".to_string(),
            ));
        }

        let game = GameRecord::new_invite(game_id, host_id, invitee_id, &self.clock.now());
        match self.repository.put_new_game(&game).await? {
            WriteOutcome::Applied => {
                info!("Game {} created: {} invited {}", game_id, host_id, invitee_id);
                Ok(game)
            }
            WriteOutcome::GuardFailed => {
                warn!("Game {} not created: the id is already taken", game_id);
                Err(GameServiceError::GameAlreadyExists(game_id.to_string()))
            }
        }
    }

    pub async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameServiceError> {
        if game_id.is_empty() {
            return Ok(None);
        }
        self.repository
            .get_game(game_id)
            .await
            .map_err(GameServiceError::from)
    }

    pub async fn accept_invite(
        &self,
        game_id: &str,
    ) -> Result<TransitionOutcome, GameServiceError> {
        let updates = [FieldUpdate::StatusDate(StatusDate::new(
            Phase::InProgress,
            &self.clock.now(),
        ))];
        let outcome = self
            .repository
            .conditional_update(game_id, &updates, &Guard::in_phase(Phase::Pending))
            .await?;

        match outcome {
            WriteOutcome::Applied => info!("Game {} accepted", game_id),
            WriteOutcome::GuardFailed => {
                debug!("Accept of game {} rejected: invite no longer pending", game_id)
            }
        }
        Ok(outcome.into())
    }

    pub async fn reject_invite(
        &self,
        game_id: &str,
    ) -> Result<TransitionOutcome, GameServiceError> {
        let outcome = self
            .repository
            .conditional_delete(game_id, &Guard::in_phase(Phase::Pending))
            .await?;

        match outcome {
            WriteOutcome::Applied => info!("Game {} rejected and removed", game_id),
            WriteOutcome::GuardFailed => {
                debug!("Reject of game {} ignored: invite already resolved", game_id)
            }
        }
        Ok(outcome.into())
    }

    /// Writes `player_id`'s marker into `cell` and passes the turn, provided the
    /// game is in progress, it is `player_id`'s turn and the cell is empty.
    /// `game` is only used to derive the marker and the next player; the store
    /// decides whether the move lands.
    pub async fn apply_move(
        &self,
        game: &GameRecord,
        cell: Cell,
        player_id: &str,
    ) -> Result<TransitionOutcome, GameServiceError> {
        let marker = game.marker_for(player_id);
        let next_player = game.other_player(player_id).to_string();

        let updates = [
            FieldUpdate::Cell(cell, marker),
            FieldUpdate::Turn(next_player.clone()),
        ];
        let guard = Guard::in_phase(Phase::InProgress)
            .and(Condition::TurnIs(player_id.to_string()))
            .and(Condition::CellEmpty(cell));

        let outcome = self
            .repository
            .conditional_update(&game.game_id, &updates, &guard)
            .await?;

        match outcome {
            WriteOutcome::Applied => info!(
                "Game {}: {} played {} at {}, {} to move",
                game.game_id, player_id, marker, cell, next_player
            ),
            WriteOutcome::GuardFailed => debug!(
                "Game {}: move by {} at {} rejected",
                game.game_id, player_id, cell
            ),
        }
        Ok(outcome.into())
    }

    /// Records the result and closes the game. A game that already has a
    /// result is returned untouched.
    pub async fn finish_game(
        &self,
        game: &GameRecord,
        outcome: GameOutcome,
        player_id: &str,
    ) -> Result<GameRecord, GameServiceError> {
        if game.result.is_some() {
            debug!("Game {} already has a result", game.game_id);
            return Ok(game.clone());
        }

        let result = match outcome {
            GameOutcome::Tie => TIE_RESULT.to_string(),
            GameOutcome::Win => player_id.to_string(),
            GameOutcome::Lose => game.other_player(player_id).to_string(),
            GameOutcome::InProgress => {
                return Err(GameServiceError::ValidationError(
                    "Cannot finish a game that is still in progress".to_string(),
                ))
            }
        };

        let mut finished = game.clone();
        finished.status_date = StatusDate::new(Phase::Finished, &self.clock.now());
        finished.turn = TERMINAL_TURN.to_string();
        finished.result = Some(result);

        // The deciding move already won its own guard, so this is the only writer.
        self.repository.put_game(&finished).await?;

        info!(
            "Game {} finished with result {}",
            finished.game_id,
            finished.result.as_deref().unwrap_or_default()
        );
        Ok(finished)
    }

    pub fn project_board(game: &GameRecord) -> Board {
        Board::from_record(game)
    }

    pub fn evaluate_outcome(
        &self,
        board: &Board,
        game: &GameRecord,
        player_id: &str,
    ) -> GameOutcome {
        self.evaluator.evaluate(board, game, player_id)
    }

    /// Full move flow: apply the move, re-read the game and finish it if the
    /// move decided it.
    pub async fn play_turn(
        &self,
        game_id: &str,
        cell: Cell,
        player_id: &str,
    ) -> Result<TurnReport, GameServiceError> {
        let Some(game) = self.get_game(game_id).await? else {
            return Ok(TurnReport::NotFound);
        };

        if self.apply_move(&game, cell, player_id).await? == TransitionOutcome::Rejected {
            return Ok(TurnReport::Rejected);
        }

        let Some(updated) = self.repository.get_game(game_id).await? else {
            warn!("Game {} disappeared after a move was applied", game_id);
            return Ok(TurnReport::NotFound);
        };

        let board = Self::project_board(&updated);
        let outcome = self.evaluate_outcome(&board, &updated, player_id);
        if outcome.is_decided() {
            let finished = self.finish_game(&updated, outcome, player_id).await?;
            Ok(TurnReport::Finished(finished))
        } else {
            Ok(TurnReport::Continued(updated))
        }
    }

    /// The user's most recent games in `phase`, whether they host or were invited.
    pub async fn get_games_by_status(
        &self,
        user_id: &str,
        phase: Phase,
        limit: usize,
    ) -> Result<Vec<GameRecord>, GameServiceError> {
        if user_id.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut hosted = self
            .repository
            .query(GameIndex::Host, user_id, phase.prefix(), limit)
            .await?;
        let mut invited = self
            .repository
            .query(GameIndex::Opponent, user_id, phase.prefix(), limit)
            .await?;

        let games = merge_recent(hosted.as_mut(), invited.as_mut(), limit).await?;
        debug!("Found {} {} games for {}", games.len(), phase, user_id);
        Ok(games)
    }

    /// Pending invites addressed to the user, newest first. Hosts never hold a
    /// pending invite to themselves, so only the opponent index is read.
    pub async fn get_invites(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<GameRecord>, GameServiceError> {
        if user_id.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mut invites = self
            .repository
            .query(
                GameIndex::Opponent,
                user_id,
                Phase::Pending.prefix(),
                limit,
            )
            .await?;
        Ok(take_recent(invites.as_mut(), limit).await?)
    }

    pub async fn is_table_active(&self) -> Result<bool, GameServiceError> {
        self.repository
            .is_table_active()
            .await
            .map_err(GameServiceError::from)
    }
}
