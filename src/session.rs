//! The wagered room: seats, board, turn and win tally.

use crate::error::{RoomError, SettlementError};
use crate::protocol::{Lamports, ServerMessage, Verdict, WinTally};
use crate::registry::ConnectionId;
use derive_getters::Getters;
use std::collections::HashMap;
use strum::IntoEnumIterator;
use tictac_rules::{Mark, MoveRejection, Outcome, Round};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Room id used when the configuration does not name one.
pub const DEFAULT_ROOM_ID: &str = "TIC-TAC-ROOM";

/// A seated player.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Seat {
    /// Mark this player places.
    mark: Mark,
    /// Payout address as the player sent it. Validated only at settlement.
    wallet: String,
    /// Stake committed at join time.
    wager: Lamports,
}

/// What a won round owes, captured while the session is locked.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct PayoutPlan {
    /// Session the round belonged to.
    session_id: SessionId,
    /// Winning mark.
    winner: Mark,
    /// Winner's wallet string.
    wallet: String,
    /// Winner's stake plus loser's stake.
    pot: Lamports,
}

/// One live two-player room.
///
/// Board and turn are reset between rounds; seats and the tally survive until
/// the last player leaves and the session is dropped.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    players: HashMap<ConnectionId, Seat>,
    round: Round,
    wins: WinTally,
}

impl GameSession {
    /// Creates an empty session.
    #[instrument]
    pub fn new(id: SessionId) -> Self {
        info!(session_id = %id, "Creating new game session");
        Self {
            id,
            players: HashMap::new(),
            round: Round::new(),
            wins: WinTally::default(),
        }
    }

    /// Session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Current board and turn.
    pub fn round(&self) -> &Round {
        &self.round
    }

    /// Running win tally.
    pub fn wins(&self) -> WinTally {
        self.wins
    }

    /// Number of seated players (0, 1 or 2).
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is seated.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Seat held by `connection`, if any.
    pub fn seat(&self, connection: ConnectionId) -> Option<&Seat> {
        self.players.get(&connection)
    }

    /// Connections holding seats.
    pub fn connections(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.players.keys().copied()
    }

    /// Seats `connection` and records its wager. Returns the assigned mark.
    ///
    /// X goes to the first free seat, then O. A connection that is already
    /// seated keeps its mark and has its wallet and wager replaced.
    #[instrument(skip(self, wallet), fields(session_id = %self.id))]
    pub fn join(
        &mut self,
        connection: ConnectionId,
        wallet: String,
        wager: Lamports,
    ) -> Result<Mark, RoomError> {
        if let Some(seat) = self.players.get_mut(&connection) {
            info!(mark = %seat.mark, wager, "Player rejoined, updating wager");
            seat.wallet = wallet;
            seat.wager = wager;
            return Ok(seat.mark);
        }

        let taken: Vec<Mark> = self.players.values().map(|s| s.mark).collect();
        let Some(mark) = Mark::iter().find(|m| !taken.contains(m)) else {
            warn!("Session already has 2 players");
            return Err(RoomError::RoomFull {
                room_id: self.id.clone(),
            });
        };

        info!(mark = %mark, wager, "Registering player");
        self.players.insert(
            connection,
            Seat {
                mark,
                wallet,
                wager,
            },
        );
        Ok(mark)
    }

    /// Unseats `connection`, retiring its wager.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn leave(&mut self, connection: ConnectionId) -> Option<Seat> {
        let seat = self.players.remove(&connection);
        match &seat {
            Some(seat) => info!(mark = %seat.mark, remaining = self.players.len(), "Player left"),
            None => debug!("Connection held no seat"),
        }
        seat
    }

    /// Validates and applies a move from `connection`.
    ///
    /// Rejections leave the session untouched.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn make_move(
        &mut self,
        connection: ConnectionId,
        claimed: Mark,
        index: i64,
    ) -> Result<Outcome, MoveRejection> {
        let seat = self.players.get(&connection).map(|s| s.mark);
        let outcome = self.round.play(seat, claimed, index)?;
        info!(
            mark = %claimed,
            index,
            board = %self.round.board().display(),
            ?outcome,
            "Move applied"
        );
        Ok(outcome)
    }

    /// Adds a win for `mark`. The tally only ever grows.
    pub fn record_win(&mut self, mark: Mark) {
        self.wins.record(mark);
        info!(
            session_id = %self.id,
            winner = %mark,
            x = self.wins.x,
            o = self.wins.o,
            "Win recorded"
        );
    }

    /// Works out who is owed what after `winner` completed a line.
    pub fn payout_plan(&self, winner: Mark) -> Result<PayoutPlan, SettlementError> {
        let winning = self.players.values().find(|s| s.mark == winner);
        let losing = self.players.values().find(|s| s.mark != winner);

        let (Some(winning), Some(losing)) = (winning, losing) else {
            return Err(SettlementError::MissingParticipant { winner });
        };

        Ok(PayoutPlan {
            session_id: self.id.clone(),
            winner,
            wallet: winning.wallet.clone(),
            pot: winning.wager.saturating_add(losing.wager),
        })
    }

    /// Starts the next round. Seats and tally are kept.
    pub fn reset_round(&mut self) {
        self.round.reset();
    }

    /// `updateBoard` frame for the current state.
    pub fn board_update(&self) -> ServerMessage {
        ServerMessage::UpdateBoard {
            board: self.round.board().clone(),
            current_player: self.round.to_move(),
            wins: self.wins,
        }
    }

    /// `gameOver` frame for `verdict` with the current tally.
    pub fn game_over(&self, verdict: Verdict) -> ServerMessage {
        ServerMessage::GameOver {
            winner: verdict,
            wins: self.wins,
        }
    }
}

/// Sessions by id.
///
/// Only one room is ever populated, but nothing here is global: each hub owns
/// its own registry.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<SessionId, GameSession>,
}

impl SessionManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session, creating it when absent.
    pub fn get_or_create(&mut self, id: &str) -> &mut GameSession {
        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| GameSession::new(id.to_string()))
    }

    /// Gets a session by id.
    pub fn get(&self, id: &str) -> Option<&GameSession> {
        self.sessions.get(id)
    }

    /// Gets a session by id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut GameSession> {
        self.sessions.get_mut(id)
    }

    /// Drops a session.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: &str) -> Option<GameSession> {
        let removed = self.sessions.remove(id);
        if removed.is_some() {
            info!(session_id = id, "Session destroyed");
        }
        removed
    }

    /// Lists active session ids.
    pub fn list_sessions(&self) -> Vec<SessionId> {
        self.sessions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> GameSession {
        GameSession::new(DEFAULT_ROOM_ID.to_string())
    }

    #[test]
    fn test_marks_assigned_in_order() {
        let mut s = session();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        assert_eq!(s.join(a, "wa".into(), 1), Ok(Mark::X));
        assert_eq!(s.join(b, "wb".into(), 2), Ok(Mark::O));
        assert_eq!(s.player_count(), 2);
    }

    #[test]
    fn test_third_join_rejected_without_change() {
        let mut s = session();
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());
        s.join(a, "wa".into(), 1).unwrap();
        s.join(b, "wb".into(), 2).unwrap();

        let err = s.join(c, "wc".into(), 3).unwrap_err();
        assert!(matches!(err, RoomError::RoomFull { .. }));
        assert_eq!(s.seat(a).map(|s| *s.mark()), Some(Mark::X));
        assert_eq!(s.seat(b).map(|s| *s.mark()), Some(Mark::O));
        assert!(s.seat(c).is_none());
    }

    #[test]
    fn test_vacated_x_seat_is_reused() {
        let mut s = session();
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());
        s.join(a, "wa".into(), 1).unwrap();
        s.join(b, "wb".into(), 2).unwrap();
        s.leave(a);
        assert_eq!(s.join(c, "wc".into(), 3), Ok(Mark::X));
    }

    #[test]
    fn test_rejoin_updates_wager() {
        let mut s = session();
        let a = ConnectionId::new();
        s.join(a, "wa".into(), 1).unwrap();
        assert_eq!(s.join(a, "wa2".into(), 5), Ok(Mark::X));
        assert_eq!(s.player_count(), 1);
        assert_eq!(*s.seat(a).unwrap().wager(), 5);
    }

    #[test]
    fn test_payout_plan_sums_wagers() {
        let mut s = session();
        let (a, b) = (ConnectionId::new(), ConnectionId::new());
        s.join(a, "wa".into(), 100).unwrap();
        s.join(b, "wb".into(), 200).unwrap();

        let plan = s.payout_plan(Mark::O).unwrap();
        assert_eq!(plan.wallet(), "wb");
        assert_eq!(*plan.pot(), 300);
    }

    #[test]
    fn test_payout_plan_needs_opponent() {
        let mut s = session();
        s.join(ConnectionId::new(), "wa".into(), 100).unwrap();
        assert_eq!(
            s.payout_plan(Mark::X),
            Err(SettlementError::MissingParticipant { winner: Mark::X })
        );
    }

    #[test]
    fn test_reset_keeps_tally_and_seats() {
        let mut s = session();
        let a = ConnectionId::new();
        s.join(a, "wa".into(), 1).unwrap();
        s.make_move(a, Mark::X, 0).unwrap();
        s.record_win(Mark::X);
        s.reset_round();

        assert_eq!(s.wins().x, 1);
        assert_eq!(s.player_count(), 1);
        assert_eq!(s.round(), &Round::new());
    }

    #[test]
    fn test_manager_lifecycle() {
        let mut manager = SessionManager::new();
        manager.get_or_create(DEFAULT_ROOM_ID).record_win(Mark::O);
        assert_eq!(manager.get(DEFAULT_ROOM_ID).unwrap().wins().o, 1);
        assert_eq!(manager.list_sessions(), vec![DEFAULT_ROOM_ID.to_string()]);

        assert!(manager.remove(DEFAULT_ROOM_ID).is_some());
        assert_eq!(manager.get_or_create(DEFAULT_ROOM_ID).wins(), WinTally::default());
    }
}
