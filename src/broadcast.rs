//! Fan-out of frames to every connection in a session.

use crate::protocol::{ServerMessage, Verdict};
use crate::registry::ConnectionRegistry;
use crate::session::GameSession;
use tracing::{debug, instrument, warn};

/// Queues `message` for every connection bound to `session_id`.
///
/// Sends are independent: a closed outbox is logged and skipped. Returns how
/// many connections accepted the frame.
#[instrument(skip(registry, message))]
pub fn broadcast(
    registry: &ConnectionRegistry,
    session_id: &str,
    message: &ServerMessage,
) -> usize {
    let mut delivered = 0;
    for (connection, outbox) in registry.members(session_id) {
        match outbox.send(message.clone()) {
            Ok(()) => delivered += 1,
            Err(_) => warn!(%connection, "Outbox closed, skipping connection"),
        }
    }
    debug!(delivered, "Broadcast queued");
    delivered
}

/// Sends the full board, turn and tally.
pub fn broadcast_state(registry: &ConnectionRegistry, session: &GameSession) -> usize {
    broadcast(registry, session.id(), &session.board_update())
}

/// Sends the terminal result with the tally as it stands.
pub fn broadcast_outcome(
    registry: &ConnectionRegistry,
    session: &GameSession,
    verdict: Verdict,
) -> usize {
    broadcast(registry, session.id(), &session.game_over(verdict))
}
