//! Move validation.

use super::round::Round;
use super::types::{BOARD_SIZE, Mark};
use tracing::{debug, instrument};

/// Why a proposed move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MoveRejection {
    /// The sender holds no seat in the session.
    #[display("sender is not seated in this session")]
    NotSeated,
    /// The claimed mark is not the sender's own.
    #[display("claimed {claimed} but seated as {seat}")]
    WrongSymbol {
        /// Mark named in the request.
        claimed: Mark,
        /// Mark the sender actually holds.
        seat: Mark,
    },
    /// The claimed mark is not the one to move.
    #[display("it is {_0}'s turn")]
    NotYourTurn(#[error(not(source))] Mark),
    /// Index outside 0..9.
    #[display("square {_0} is off the board")]
    OutOfBounds(#[error(not(source))] i64),
    /// Square already taken this round.
    #[display("square {_0} is already occupied")]
    CellOccupied(#[error(not(source))] usize),
}

/// Decides whether `seat` may place `claimed` at `index` in `round`.
///
/// Accepts only when the sender is seated, the claimed mark is theirs, it is
/// that mark's turn, the index is on the board and the square is empty.
/// Returns the square index on success. Never mutates anything.
#[instrument(skip(round), fields(to_move = %round.to_move()))]
pub fn validate_move(
    round: &Round,
    seat: Option<Mark>,
    claimed: Mark,
    index: i64,
) -> Result<usize, MoveRejection> {
    let seat = seat.ok_or(MoveRejection::NotSeated)?;

    if seat != claimed {
        return Err(MoveRejection::WrongSymbol { claimed, seat });
    }

    if claimed != round.to_move() {
        return Err(MoveRejection::NotYourTurn(round.to_move()));
    }

    let square = usize::try_from(index)
        .ok()
        .filter(|i| *i < BOARD_SIZE)
        .ok_or(MoveRejection::OutOfBounds(index))?;

    if !round.board().is_empty(square) {
        return Err(MoveRejection::CellOccupied(square));
    }

    debug!(square, mark = %claimed, "Move accepted");
    Ok(square)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_move_by_x_accepted() {
        let round = Round::new();
        assert_eq!(validate_move(&round, Some(Mark::X), Mark::X, 4), Ok(4));
    }

    #[test]
    fn test_unseated_rejected() {
        let round = Round::new();
        assert_eq!(
            validate_move(&round, None, Mark::X, 0),
            Err(MoveRejection::NotSeated)
        );
    }

    #[test]
    fn test_impersonation_rejected() {
        let round = Round::new();
        assert_eq!(
            validate_move(&round, Some(Mark::O), Mark::X, 0),
            Err(MoveRejection::WrongSymbol {
                claimed: Mark::X,
                seat: Mark::O
            })
        );
    }

    #[test]
    fn test_out_of_turn_rejected() {
        let round = Round::new();
        assert_eq!(
            validate_move(&round, Some(Mark::O), Mark::O, 0),
            Err(MoveRejection::NotYourTurn(Mark::X))
        );
    }

    #[test]
    fn test_bounds() {
        let round = Round::new();
        for index in [-1, 9, 100, i64::MIN, i64::MAX] {
            assert_eq!(
                validate_move(&round, Some(Mark::X), Mark::X, index),
                Err(MoveRejection::OutOfBounds(index))
            );
        }
        assert_eq!(validate_move(&round, Some(Mark::X), Mark::X, 8), Ok(8));
    }

    #[test]
    fn test_occupied_rejected() {
        let mut round = Round::new();
        round.play(Some(Mark::X), Mark::X, 0).unwrap();
        round.play(Some(Mark::O), Mark::O, 1).unwrap();
        assert_eq!(
            validate_move(&round, Some(Mark::X), Mark::X, 1),
            Err(MoveRejection::CellOccupied(1))
        );
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            MoveRejection::NotYourTurn(Mark::O).to_string(),
            "it is O's turn"
        );
        assert_eq!(
            MoveRejection::CellOccupied(3).to_string(),
            "square 3 is already occupied"
        );
    }
}
