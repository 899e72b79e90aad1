use crate::models::game::GameRecord;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;
use crate::repositories::game_repository::GameCursor;

/// Interleaves two cursors that are each sorted newest-first into one list of
/// at most `limit` games, newest-first.
///
/// One pending head is kept per side and only the side that was just emitted
/// is refilled, so neither cursor is pulled more than `limit + 1` times. On
/// equal `StatusDate` the game from `first` goes out first. A cursor error
/// aborts the merge.
pub async fn merge_recent(
    first: &mut (dyn GameCursor + 'static),
    second: &mut (dyn GameCursor + 'static),
    limit: usize,
) -> Result<Vec<GameRecord>, GameRepositoryError> {
    let mut games = Vec::new();
    if limit == 0 {
        return Ok(games);
    }

    let mut first_head = first.next_game().await?;
    let mut second_head = second.next_game().await?;

    while games.len() < limit {
        let take_first = match (&first_head, &second_head) {
            (None, None) => break,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (Some(a), Some(b)) => a.status_date >= b.status_date,
        };

        let (head, cursor) = if take_first {
            (&mut first_head, &mut *first)
        } else {
            (&mut second_head, &mut *second)
        };

        if let Some(game) = head.take() {
            games.push(game);
        }
        if games.len() < limit {
            *head = cursor.next_game().await?;
        }
    }

    Ok(games)
}

/// Drains at most `limit` games from a single cursor.
pub async fn take_recent(
    cursor: &mut dyn GameCursor,
    limit: usize,
) -> Result<Vec<GameRecord>, GameRepositoryError> {
    let mut games = Vec::new();
    while games.len() < limit {
        match cursor.next_game().await? {
            Some(game) => games.push(game),
            None => break,
        }
    }
    Ok(games)
}
