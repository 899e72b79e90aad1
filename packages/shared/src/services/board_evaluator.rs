use crate::models::board::{Board, GameOutcome};
use crate::models::game::GameRecord;

/// Decides whether a board is won, lost, tied or still open, as seen by
/// `player_id`.
pub trait BoardEvaluator: Send + Sync {
    fn evaluate(&self, board: &Board, game: &GameRecord, player_id: &str) -> GameOutcome;
}

/// Standard tic-tac-toe rule: three in a row on any of the eight lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineEvaluator;

impl BoardEvaluator for LineEvaluator {
    fn evaluate(&self, board: &Board, game: &GameRecord, player_id: &str) -> GameOutcome {
        let your_marker = game.marker_for(player_id);
        let their_marker = your_marker.opposite();

        if board.has_line(your_marker) {
            GameOutcome::Win
        } else if board.has_line(their_marker) {
            GameOutcome::Lose
        } else if board.is_full() {
            GameOutcome::Tie
        } else {
            GameOutcome::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::game::Marker;
    use proptest::prelude::*;
    use rstest::rstest;

    const X: Option<Marker> = Some(Marker::X);
    const O: Option<Marker> = Some(Marker::O);
    const E: Option<Marker> = None;

    fn game() -> GameRecord {
        // alice hosts and plays O, bob plays X
        GameRecord::new_invite("g", "alice", "bob", "t")
    }

    #[rstest]
    #[case::o_top_row([O, O, O, X, X, E, E, E, E], GameOutcome::Win, GameOutcome::Lose)]
    #[case::x_column([X, O, E, X, O, E, X, E, E], GameOutcome::Lose, GameOutcome::Win)]
    #[case::x_anti_diagonal([O, O, X, E, X, E, X, E, E], GameOutcome::Lose, GameOutcome::Win)]
    #[case::full_no_line([X, O, X, X, O, O, O, X, X], GameOutcome::Tie, GameOutcome::Tie)]
    #[case::open([X, E, E, E, O, E, E, E, E], GameOutcome::InProgress, GameOutcome::InProgress)]
    #[case::empty([E, E, E, E, E, E, E, E, E], GameOutcome::InProgress, GameOutcome::InProgress)]
    #[case::another_draw([X, O, X, O, O, X, X, X, O], GameOutcome::Tie, GameOutcome::Tie)]
    #[case::full_with_line([X, X, X, O, O, X, O, X, O], GameOutcome::Lose, GameOutcome::Win)]
    fn test_line_evaluator(
        #[case] cells: [Option<Marker>; 9],
        #[case] for_host: GameOutcome,
        #[case] for_opponent: GameOutcome,
    ) {
        let board = Board::new(cells);
        let game = game();

        assert_eq!(LineEvaluator.evaluate(&board, &game, "alice"), for_host);
        assert_eq!(LineEvaluator.evaluate(&board, &game, "bob"), for_opponent);
    }

    fn any_board() -> impl Strategy<Value = [Option<Marker>; 9]> {
        let square = prop_oneof![Just(None), Just(Some(Marker::X)), Just(Some(Marker::O))];
        prop::array::uniform9(square)
    }

    proptest! {
        /// Both players see complementary outcomes whenever at most one
        /// marker owns a line, which is every board reachable in play.
        #[test]
        fn prop_evaluation_is_call_symmetric(cells in any_board()) {
            let board = Board::new(cells);
            prop_assume!(!(board.has_line(Marker::X) && board.has_line(Marker::O)));
            let game = game();

            let host_view = LineEvaluator.evaluate(&board, &game, "alice");
            let opponent_view = LineEvaluator.evaluate(&board, &game, "bob");

            prop_assert_eq!(host_view.mirrored(), opponent_view);
        }
    }
}
