use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::game::{Cell, GameRecord, Marker};

/// Placeholder used for unset squares when the board is projected.
pub const BLANK_SQUARE: &str = " ";

/// The eight winning lines as row-major indexes.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Result of evaluating a board from one player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Lose,
    Tie,
    InProgress,
}

impl GameOutcome {
    pub fn is_decided(&self) -> bool {
        !matches!(self, GameOutcome::InProgress)
    }

    /// The same board seen by the other player.
    pub fn mirrored(&self) -> GameOutcome {
        match self {
            GameOutcome::Win => GameOutcome::Lose,
            GameOutcome::Lose => GameOutcome::Win,
            other => *other,
        }
    }
}

/// Snapshot of the nine squares of a game record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Board {
    cells: [Option<Marker>; 9],
}

impl Board {
    pub fn new(cells: [Option<Marker>; 9]) -> Self {
        Board { cells }
    }

    pub fn from_record(record: &GameRecord) -> Self {
        let mut cells = [None; 9];
        for cell in Cell::ALL {
            cells[cell.index()] = record.cell(cell);
        }
        Board { cells }
    }

    pub fn get(&self, cell: Cell) -> Option<Marker> {
        self.cells[cell.index()]
    }

    pub fn cells(&self) -> &[Option<Marker>; 9] {
        &self.cells
    }

    /// Row-major squares with `" "` for empty ones.
    pub fn squares(&self) -> [&'static str; 9] {
        self.cells
            .map(|cell| cell.map_or(BLANK_SQUARE, |marker| marker.as_str()))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    pub fn has_line(&self, marker: Marker) -> bool {
        WIN_LINES
            .iter()
            .any(|line| line.iter().all(|&index| self.cells[index] == Some(marker)))
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let squares = self.squares();
        for row in squares.chunks(3) {
            writeln!(f, "|{}|{}|{}|", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
