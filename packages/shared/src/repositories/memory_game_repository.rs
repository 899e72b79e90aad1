use crate::models::game::GameRecord;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::game_repository::{
    FieldUpdate, GameCursor, GameIndex, GameRepository, Guard, WriteOutcome,
};
use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Games table held in process. Each conditional write checks its guard and
/// applies its updates under one lock, so it is atomic per record.
#[derive(Debug)]
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<String, GameRecord>>,
    active: AtomicBool,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        InMemoryGameRepository {
            games: Mutex::new(HashMap::new()),
            active: AtomicBool::new(true),
        }
    }
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        InMemoryGameRepository::default()
    }

    /// While inactive every call fails with `ResourceNotReady`.
    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.games
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> Result<MutexGuard<'_, HashMap<String, GameRecord>>, GameRepositoryError> {
        if !self.active.load(Ordering::SeqCst) {
            return Err(GameRepositoryError::ResourceNotReady(
                "in-memory games table is not active".to_string(),
            ));
        }
        self.games.lock().map_err(|e| {
            GameRepositoryError::Transport(format!("games table lock poisoned: {}", e))
        })
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn put_game(&self, game: &GameRecord) -> Result<(), GameRepositoryError> {
        self.table()?.insert(game.game_id.clone(), game.clone());
        Ok(())
    }

    async fn put_new_game(&self, game: &GameRecord) -> Result<WriteOutcome, GameRepositoryError> {
        match self.table()?.entry(game.game_id.clone()) {
            Entry::Occupied(_) => Ok(WriteOutcome::GuardFailed),
            Entry::Vacant(slot) => {
                slot.insert(game.clone());
                Ok(WriteOutcome::Applied)
            }
        }
    }

    async fn get_game(&self, game_id: &str) -> Result<Option<GameRecord>, GameRepositoryError> {
        Ok(self.table()?.get(game_id).cloned())
    }

    async fn conditional_update(
        &self,
        game_id: &str,
        updates: &[FieldUpdate],
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError> {
        let mut games = self.table()?;
        if !guard.holds(games.get(game_id)) {
            return Ok(WriteOutcome::GuardFailed);
        }
        // An unguarded update on a missing key has nothing to build from.
        let Some(game) = games.get_mut(game_id) else {
            return Ok(WriteOutcome::GuardFailed);
        };
        for update in updates {
            update.apply_to(game);
        }
        Ok(WriteOutcome::Applied)
    }

    async fn conditional_delete(
        &self,
        game_id: &str,
        guard: &Guard,
    ) -> Result<WriteOutcome, GameRepositoryError> {
        let mut games = self.table()?;
        if !guard.holds(games.get(game_id)) {
            return Ok(WriteOutcome::GuardFailed);
        }
        games.remove(game_id);
        Ok(WriteOutcome::Applied)
    }

    async fn query(
        &self,
        index: GameIndex,
        user_id: &str,
        status_prefix: &str,
        limit: usize,
    ) -> Result<Box<dyn GameCursor>, GameRepositoryError> {
        let games = self.table()?;
        let mut matching: Vec<GameRecord> = games
            .values()
            .filter(|game| index.matches(game, user_id))
            .filter(|game| game.status_date.has_prefix(status_prefix))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.status_date.cmp(&a.status_date));
        matching.truncate(limit);
        Ok(Box::new(BufferedGameCursor::from(matching)))
    }

    async fn is_table_active(&self) -> Result<bool, GameRepositoryError> {
        Ok(self.active.load(Ordering::SeqCst))
    }
}

/// Cursor over games that are already in memory.
#[derive(Debug, Default)]
pub struct BufferedGameCursor {
    games: VecDeque<GameRecord>,
}

impl From<Vec<GameRecord>> for BufferedGameCursor {
    fn from(games: Vec<GameRecord>) -> Self {
        BufferedGameCursor {
            games: games.into(),
        }
    }
}

#[async_trait]
impl GameCursor for BufferedGameCursor {
    async fn next_game(&mut self) -> Result<Option<GameRecord>, GameRepositoryError> {
        Ok(self.games.pop_front())
    }
}
