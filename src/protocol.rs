//! JSON messages exchanged over a player's WebSocket.
//!
//! Every frame is an object tagged by `type`. Field names are camelCase to
//! match the browser client.

use crate::error::RoomError;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use tictac_rules::{Board, Mark};

/// Smallest ledger unit.
pub type Lamports = u64;

/// Smallest units per whole unit of the ledger currency.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Join the room, creating it when nobody is playing.
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        /// Payout wallet address.
        pubkey: String,
        /// Stake in whole units.
        bet: BetAmount,
    },
    /// Place a mark.
    #[serde(rename_all = "camelCase")]
    MakeMove {
        /// Square 0-8, row-major.
        index: i64,
        /// Mark the sender claims to be playing.
        player: Mark,
    },
}

/// A stake as the client sent it: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum BetAmount {
    /// `"bet": 0.25`
    Number(f64),
    /// `"bet": "0.25"`
    Text(String),
}

impl BetAmount {
    /// Converts whole units to lamports, rounding to the nearest lamport.
    pub fn to_lamports(&self) -> Result<Lamports, RoomError> {
        let units = match self {
            BetAmount::Number(n) => *n,
            BetAmount::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RoomError::InvalidWager(s.clone()))?,
        };

        let lamports = (units * LAMPORTS_PER_SOL as f64).round();
        if !lamports.is_finite() || lamports < 0.0 || lamports >= u64::MAX as f64 {
            return Err(RoomError::InvalidWager(units.to_string()));
        }
        Ok(lamports as Lamports)
    }
}

/// Games won by each mark since the session was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WinTally {
    /// Wins for X.
    #[serde(rename = "X")]
    pub x: u32,
    /// Wins for O.
    #[serde(rename = "O")]
    pub o: u32,
}

impl WinTally {
    /// Wins recorded for `mark`.
    pub fn get(&self, mark: Mark) -> u32 {
        match mark {
            Mark::X => self.x,
            Mark::O => self.o,
        }
    }

    /// Adds one win for `mark`.
    pub fn record(&mut self, mark: Mark) {
        match mark {
            Mark::X => self.x = self.x.saturating_add(1),
            Mark::O => self.o = self.o.saturating_add(1),
        }
    }
}

/// Terminal result of a round as shown to clients: `"X"`, `"O"` or `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(into = "String", try_from = "String")]
pub enum Verdict {
    /// A mark completed a line.
    #[display("{_0}")]
    Winner(Mark),
    /// Full board, no line.
    #[display("draw")]
    Draw,
}

impl From<Verdict> for String {
    fn from(value: Verdict) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Verdict {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "X" => Ok(Verdict::Winner(Mark::X)),
            "O" => Ok(Verdict::Winner(Mark::O)),
            "draw" => Ok(Verdict::Draw),
            other => Err(format!("unknown verdict {other:?}")),
        }
    }
}

/// Machine-readable reason attached to an `error` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    /// Both seats are taken.
    RoomFull,
    /// The stake could not be understood.
    InvalidWager,
    /// The frame did not parse.
    BadRequest,
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Sent to a connection once it holds a seat.
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        /// Room joined.
        room_id: SessionId,
        /// Mark assigned to the joiner.
        player: Mark,
    },
    /// Full room state.
    #[serde(rename_all = "camelCase")]
    UpdateBoard {
        /// All nine squares.
        board: Board,
        /// Mark to move next.
        current_player: Mark,
        /// Running tally.
        wins: WinTally,
    },
    /// End of a round.
    #[serde(rename_all = "camelCase")]
    GameOver {
        /// Winning mark or draw.
        winner: Verdict,
        /// Tally including this round.
        wins: WinTally,
    },
    /// A request from this connection was refused.
    #[serde(rename_all = "camelCase")]
    Error {
        /// Reason class.
        code: ErrorCode,
        /// Human-readable detail.
        message: String,
    },
}
