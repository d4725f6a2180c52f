//! Sequencing of joins, moves and departures for the room.
//!
//! Every connection handler calls into one [`GameHub`]. All session and
//! connection state sits behind a single async mutex, so moves are applied in
//! the order their handlers acquire it and a broadcast never sees a half
//! applied move. Broadcasts only enqueue onto unbounded outboxes and never
//! wait on a socket. Settlement and the delayed post-round broadcast run as
//! separate tasks after the lock is released.

use crate::broadcast::{broadcast_outcome, broadcast_state};
use crate::error::RoomError;
use crate::protocol::{BetAmount, ClientMessage, ErrorCode, ServerMessage, Verdict};
use crate::registry::{ConnectionId, ConnectionRegistry};
use crate::session::{SessionId, SessionManager};
use crate::settlement::{SettlementCoordinator, SettlementTask};
use std::sync::Arc;
use std::time::Duration;
use tictac_rules::{Mark, MoveRejection, Outcome};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

/// Default pause between `gameOver` and the fresh board.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
struct HubState {
    connections: ConnectionRegistry,
    sessions: SessionManager,
}

/// What an accepted move led to.
#[derive(Debug)]
pub struct MoveReport {
    /// Classification of the board right after the move.
    pub outcome: Outcome,
    /// Payout task, when the move won a round with both seats filled.
    pub settlement: Option<SettlementTask>,
}

/// Shared entry point for every connection handler.
#[derive(Debug, Clone)]
pub struct GameHub {
    state: Arc<Mutex<HubState>>,
    settlement: SettlementCoordinator,
    room_id: SessionId,
    reset_delay: Duration,
}

impl GameHub {
    /// Creates a hub for the room `room_id`.
    #[instrument(skip(settlement))]
    pub fn new(
        room_id: SessionId,
        reset_delay: Duration,
        settlement: SettlementCoordinator,
    ) -> Self {
        info!(escrow = %settlement.escrow(), fee = settlement.fee(), "Creating game hub");
        Self {
            state: Arc::new(Mutex::new(HubState::default())),
            settlement,
            room_id,
            reset_delay,
        }
    }

    /// Room every join lands in.
    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Settlement coordinator used for won rounds.
    pub fn settlement(&self) -> &SettlementCoordinator {
        &self.settlement
    }

    /// Registers a new connection and returns its id and frame queue.
    #[instrument(skip(self))]
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().await.connections.register(id, tx);
        info!(connection = %id, "User connected");
        (id, rx)
    }

    /// Routes one parsed client frame.
    pub async fn handle(&self, connection: ConnectionId, message: ClientMessage) {
        match message {
            ClientMessage::CreateRoom { pubkey, bet } => {
                if let Err(e) = self.join(connection, pubkey, bet).await {
                    self.reject(connection, e.code(), e.to_string()).await;
                }
            }
            ClientMessage::MakeMove { index, player } => {
                if let Err(rejection) = self.make_move(connection, player, index).await {
                    debug!(%connection, %rejection, "Move dropped");
                }
            }
        }
    }

    /// Seats `connection` in the room, creating the room when none exists.
    ///
    /// Replies `roomCreated` to the joiner and broadcasts the board.
    #[instrument(skip(self, wallet, bet))]
    pub async fn join(
        &self,
        connection: ConnectionId,
        wallet: String,
        bet: BetAmount,
    ) -> Result<Mark, RoomError> {
        let wager = bet.to_lamports()?;

        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.connections.outbox(connection).is_none() {
            warn!(%connection, "Join from unknown connection ignored");
            return Err(RoomError::NotConnected(connection));
        }

        let session = state.sessions.get_or_create(&self.room_id);
        let joined = session.join(connection, wallet, wager);
        let mark = match joined {
            Ok(mark) => mark,
            Err(e) => {
                if session.is_empty() {
                    state.sessions.remove(&self.room_id);
                }
                return Err(e);
            }
        };

        state.connections.bind(connection, &self.room_id);
        if let Some(outbox) = state.connections.outbox(connection) {
            let reply = ServerMessage::RoomCreated {
                room_id: self.room_id.clone(),
                player: mark,
            };
            if outbox.send(reply).is_err() {
                warn!(%connection, "Outbox closed before roomCreated");
            }
        }
        broadcast_state(&state.connections, session);

        info!(%connection, %mark, wager, "Player joined");
        Ok(mark)
    }

    /// Applies a move and, on a terminal board, closes the round.
    ///
    /// A rejected move changes nothing and broadcasts nothing. A win bumps
    /// the tally, broadcasts `gameOver`, resets the board, schedules the
    /// fresh-board broadcast and hands the payout to settlement. A draw does
    /// the same minus tally and payout.
    #[instrument(skip(self))]
    pub async fn make_move(
        &self,
        connection: ConnectionId,
        claimed: Mark,
        index: i64,
    ) -> Result<MoveReport, MoveRejection> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(session_id) = state.connections.session_of(connection).cloned() else {
            return Err(MoveRejection::NotSeated);
        };
        let Some(session) = state.sessions.get_mut(&session_id) else {
            return Err(MoveRejection::NotSeated);
        };

        let outcome = session.make_move(connection, claimed, index)?;
        broadcast_state(&state.connections, session);

        let verdict = match outcome {
            Outcome::InProgress => {
                return Ok(MoveReport {
                    outcome,
                    settlement: None,
                });
            }
            Outcome::Winner(mark) => Verdict::Winner(mark),
            Outcome::Draw => Verdict::Draw,
        };

        let plan = match outcome {
            Outcome::Winner(mark) => {
                session.record_win(mark);
                match session.payout_plan(mark) {
                    Ok(plan) => Some(plan),
                    Err(e) => {
                        warn!(error = %e, "No payout for this round");
                        None
                    }
                }
            }
            _ => None,
        };

        info!(session_id = %session.id(), %verdict, "Round over");
        broadcast_outcome(&state.connections, session, verdict);
        session.reset_round();
        drop(guard);

        self.schedule_board_refresh(session_id);
        let settlement = plan.map(|plan| self.settlement.dispatch(plan));

        Ok(MoveReport {
            outcome,
            settlement,
        })
    }

    /// Unseats and forgets `connection`. Destroys the room when it empties.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, connection: ConnectionId) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;

        let Some(session_id) = state.connections.remove(connection) else {
            info!(%connection, "User disconnected");
            return;
        };

        if let Some(session) = state.sessions.get_mut(&session_id) {
            session.leave(connection);
            if session.is_empty() {
                state.sessions.remove(&session_id);
            } else {
                broadcast_state(&state.connections, session);
            }
        }
        info!(%connection, "User disconnected");
    }

    /// Sends an `error` frame to one connection.
    pub async fn reject(&self, connection: ConnectionId, code: ErrorCode, message: String) {
        let state = self.state.lock().await;
        if let Some(outbox) = state.connections.outbox(connection) {
            debug!(%connection, ?code, %message, "Rejecting request");
            let _ = outbox.send(ServerMessage::Error { code, message });
        }
    }

    /// Snapshot of the room as an `updateBoard` frame, if the room exists.
    pub async fn room_state(&self) -> Option<ServerMessage> {
        let state = self.state.lock().await;
        state.sessions.get(&self.room_id).map(|s| s.board_update())
    }

    /// Number of seated players in the room.
    pub async fn player_count(&self) -> usize {
        let state = self.state.lock().await;
        state
            .sessions
            .get(&self.room_id)
            .map_or(0, |s| s.player_count())
    }

    fn schedule_board_refresh(&self, session_id: SessionId) {
        let state = Arc::clone(&self.state);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let state = state.lock().await;
            match state.sessions.get(&session_id) {
                Some(session) => {
                    broadcast_state(&state.connections, session);
                }
                None => debug!(%session_id, "Session gone before board refresh"),
            }
        });
    }
}
