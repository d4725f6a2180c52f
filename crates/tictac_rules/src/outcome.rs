//! Win and draw detection.

use super::types::{Board, Mark, Square};
use tracing::instrument;

/// The eight index triples that complete a line: rows, columns, diagonals.
pub const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// No line and at least one empty square; play continues.
    InProgress,
    /// `Mark` completed a line.
    Winner(Mark),
    /// Every square is filled and nobody completed a line.
    Draw,
}

impl Outcome {
    /// True for [`Outcome::Winner`] and [`Outcome::Draw`].
    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

/// Classifies `board`.
///
/// Lines are checked in [`LINES`] order and the first complete one wins.
/// Strictly alternating single-square moves can complete at most one mark's
/// lines at a time, so the order never changes the answer. Anything that lets
/// several squares change in one step (batch moves, replays from untrusted
/// input) has to re-check that.
#[instrument(skip(board), fields(board = %board.display()))]
pub fn detect_outcome(board: &Board) -> Outcome {
    let squares = board.squares();

    for [a, b, c] in LINES {
        if let Square::Occupied(mark) = squares[a]
            && squares[b] == squares[a]
            && squares[c] == squares[a]
        {
            return Outcome::Winner(mark);
        }
    }

    if board.is_full() {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
