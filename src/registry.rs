//! Live connections and the session each one is bound to.

use crate::protocol::ServerMessage;
use crate::session::SessionId;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Opaque identity of one WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// Fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue of frames waiting to be written to a socket.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug)]
struct Connection {
    outbox: Outbox,
    session: Option<SessionId>,
}

/// Every open connection, keyed by id.
///
/// A connection only points at its session by id; the session itself lives in
/// the [`SessionManager`](crate::SessionManager).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Connection>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a new connection that is not yet in any session.
    #[instrument(skip(self, outbox))]
    pub fn register(&mut self, id: ConnectionId, outbox: Outbox) {
        self.connections.insert(
            id,
            Connection {
                outbox,
                session: None,
            },
        );
        info!(open = self.connections.len(), "Connection registered");
    }

    /// Forgets a connection. Returns the session it was bound to.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: ConnectionId) -> Option<SessionId> {
        let removed = self.connections.remove(&id)?;
        info!(open = self.connections.len(), "Connection removed");
        removed.session
    }

    /// Points `id` at `session`.
    pub fn bind(&mut self, id: ConnectionId, session: &str) {
        if let Some(conn) = self.connections.get_mut(&id) {
            debug!(connection = %id, session_id = session, "Connection bound to session");
            conn.session = Some(session.to_string());
        }
    }

    /// Session `id` is bound to, if any.
    pub fn session_of(&self, id: ConnectionId) -> Option<&SessionId> {
        self.connections.get(&id)?.session.as_ref()
    }

    /// Number of open connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// True when no connection is open.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Outbox of a single connection.
    pub fn outbox(&self, id: ConnectionId) -> Option<&Outbox> {
        self.connections.get(&id).map(|c| &c.outbox)
    }

    /// Outboxes of every connection bound to `session`.
    pub fn members<'a>(
        &'a self,
        session: &'a str,
    ) -> impl Iterator<Item = (ConnectionId, &'a Outbox)> + 'a {
        self.connections
            .iter()
            .filter(move |(_, c)| c.session.as_deref() == Some(session))
            .map(|(id, c)| (*id, &c.outbox))
    }
}
