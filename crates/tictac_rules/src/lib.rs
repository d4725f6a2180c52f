//! Pure tic-tac-toe rules for a wagered two-player room.
//!
//! Nothing here performs I/O. The server crate owns sessions, players and
//! wagers; this crate answers three questions about a [`Round`]:
//!
//! - is a proposed move legal ([`validate_move`])
//! - what does the board look like after it ([`Round::play`])
//! - has the round ended ([`detect_outcome`])

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod outcome;
mod round;
mod types;
mod validate;

pub use outcome::{LINES, Outcome, detect_outcome};
pub use round::Round;
pub use types::{BOARD_SIZE, Board, Mark, Square};
pub use validate::{MoveRejection, validate_move};
