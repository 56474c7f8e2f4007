//! The session registry: who is connected to a room right now.
//!
//! Keyed by connection identity, each entry carries the participant's
//! name, their outbound channel, and a liveness flag. Delivery failures
//! never surface as errors; a session whose channel is gone is marked
//! dead and pruned in a separate pass, so the registry is never mutated
//! while it is being iterated.

use std::collections::HashMap;

use cardroom_protocol::{PlayerName, ServerMessage};
use cardroom_transport::ConnectionId;
use tokio::sync::mpsc;

/// What a room pushes to a connection handler.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// Deliver a message to the participant.
    Deliver(ServerMessage),
    /// The session is dead; close the underlying connection.
    Close,
}

/// Channel sender for delivering outbound traffic to one session.
pub type SessionSender = mpsc::UnboundedSender<Outbound>;

/// One connected participant.
pub(crate) struct SessionEntry {
    pub(crate) player: PlayerName,
    sender: SessionSender,
    live: bool,
}

/// All sessions currently attached to a room.
#[derive(Default)]
pub(crate) struct SessionRegistry {
    sessions: HashMap<ConnectionId, SessionEntry>,
}

impl SessionRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        session: ConnectionId,
        player: PlayerName,
        sender: SessionSender,
    ) {
        self.sessions.insert(
            session,
            SessionEntry {
                player,
                sender,
                live: true,
            },
        );
    }

    pub(crate) fn get(&self, session: &ConnectionId) -> Option<&SessionEntry> {
        self.sessions.get(session)
    }

    pub(crate) fn remove(&mut self, session: &ConnectionId) -> Option<SessionEntry> {
        self.sessions.remove(session)
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the session is present and not marked dead.
    pub(crate) fn is_live(&self, session: &ConnectionId) -> bool {
        self.sessions.get(session).is_some_and(|e| e.live)
    }

    /// Delivers one message to one session. A failed send marks the
    /// session dead; it is pruned on the next broadcast.
    pub(crate) fn send_to(&mut self, session: &ConnectionId, msg: ServerMessage) {
        if let Some(entry) = self.sessions.get_mut(session) {
            if entry.sender.send(Outbound::Deliver(msg)).is_err() {
                entry.live = false;
            }
        }
    }

    /// Orders one session's connection closed.
    pub(crate) fn order_close(&self, session: &ConnectionId) {
        if let Some(entry) = self.sessions.get(session) {
            let _ = entry.sender.send(Outbound::Close);
        }
    }

    /// Delivers a message to every session. Delivery is attempted even
    /// for dead-marked entries (their handler discards everything past
    /// the close order); sessions whose channel is gone are marked in
    /// the send pass and removed afterwards, never mid-iteration.
    pub(crate) fn broadcast(&mut self, msg: &ServerMessage) {
        let mut failed = Vec::new();
        for (session, entry) in &mut self.sessions {
            if entry.sender.send(Outbound::Deliver(msg.clone())).is_err() {
                entry.live = false;
                failed.push(*session);
            }
        }
        for session in failed {
            tracing::debug!(%session, "pruning session with closed channel");
            self.sessions.remove(&session);
        }
    }

    /// Marks every session dead and orders every connection closed.
    /// Entries stay registered so late frames hit the dead-session
    /// check instead of resurrecting the session.
    pub(crate) fn kill_all(&mut self) {
        for entry in self.sessions.values_mut() {
            entry.live = false;
            let _ = entry.sender.send(Outbound::Close);
        }
    }
}
