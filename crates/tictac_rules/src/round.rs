//! A single round: board plus whose turn it is.

use super::outcome::{Outcome, detect_outcome};
use super::types::{Board, Mark};
use super::validate::{MoveRejection, validate_move};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Board and turn state for one round of play.
///
/// A round is replaced in place by [`Round::reset`] after a terminal outcome;
/// anything tracked across rounds (players, tallies) lives with the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Round {
    board: Board,
    to_move: Mark,
}

impl Round {
    /// Empty board, X to move.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mark whose move is accepted next.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Current classification of the board.
    pub fn outcome(&self) -> Outcome {
        detect_outcome(&self.board)
    }

    /// Validates and applies a move, then classifies the resulting board.
    ///
    /// On rejection the round is left untouched.
    #[instrument(skip(self), fields(board = %self.board.display()))]
    pub fn play(
        &mut self,
        seat: Option<Mark>,
        claimed: Mark,
        index: i64,
    ) -> Result<Outcome, MoveRejection> {
        let square = validate_move(self, seat, claimed, index)?;
        if !self.board.claim(square, claimed) {
            return Err(MoveRejection::CellOccupied(square));
        }
        self.to_move = claimed.opponent();
        Ok(self.outcome())
    }

    /// Clears the board and hands the move back to X.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!(board = %self.board.display(), "Resetting round");
        *self = Self::new();
    }
}
