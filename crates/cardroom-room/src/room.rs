//! Room actor: an isolated Tokio task that owns one table.
//!
//! Each room runs in its own task, communicating with connection
//! handlers through an mpsc channel. The channel is the serialization
//! point: many participants submit commands concurrently, but the actor
//! applies exactly one at a time, sends the resulting views, and awaits
//! the snapshot write before taking the next.

use cardroom_engine::Game;
use cardroom_protocol::{
    Card, ClientMessage, PlayerName, RoomName, ServerMessage,
};
use cardroom_store::SnapshotStore;
use cardroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::registry::{SessionRegistry, SessionSender};
use crate::RoomError;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Attach a session and seat its player.
    Connect {
        session: ConnectionId,
        name: PlayerName,
        sender: SessionSender,
    },

    /// Deliver a decoded client message from a session.
    Message {
        session: ConnectionId,
        msg: ClientMessage,
    },

    /// Detach a session (socket closed or errored).
    Disconnect { session: ConnectionId },

    /// Request room metadata.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Shut down the room actor.
    Shutdown,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's name.
    pub room: RoomName,
    /// Players seated at the table (connected or not).
    pub players: usize,
    /// Sessions currently registered, dead ones included.
    pub sessions: usize,
}

/// Handle to a running room actor. Cheap to clone.
#[derive(Clone)]
pub struct RoomHandle {
    name: RoomName,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room this handle talks to.
    pub fn name(&self) -> &RoomName {
        &self.name
    }

    /// Attaches a session to the room.
    pub async fn connect(
        &self,
        session: ConnectionId,
        name: PlayerName,
        sender: SessionSender,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Connect {
            session,
            name,
            sender,
        })
        .await
    }

    /// Forwards a decoded client message to the room.
    pub async fn message(
        &self,
        session: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Message { session, msg }).await
    }

    /// Detaches a session from the room.
    pub async fn disconnect(&self, session: ConnectionId) -> Result<(), RoomError> {
        self.send(RoomCommand::Disconnect { session }).await
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S: SnapshotStore> {
    name: RoomName,
    game: Game,
    registry: SessionRegistry,
    store: S,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<S: SnapshotStore> RoomActor<S> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.name, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Connect {
                    session,
                    name,
                    sender,
                } => self.handle_connect(session, name, sender),
                RoomCommand::Message { session, msg } => {
                    self.handle_message(session, msg).await;
                }
                RoomCommand::Disconnect { session } => {
                    self.handle_disconnect(session);
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(RoomInfo {
                        room: self.name.clone(),
                        players: self.game.players().len(),
                        sessions: self.registry.len(),
                    });
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.name, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.name, "room actor stopped");
    }

    /// Registers a session, seats its player (idempotent), and brings
    /// everyone up to date.
    fn handle_connect(
        &mut self,
        session: ConnectionId,
        name: PlayerName,
        sender: SessionSender,
    ) {
        self.registry.insert(session, name.clone(), sender);
        tracing::info!(
            room = %self.name,
            player = %name,
            %session,
            sessions = self.registry.len(),
            "session connected"
        );

        match self.game.add_player(&name) {
            Ok(()) => {
                if let Some(hand) = self.game.hand(&name) {
                    self.registry
                        .send_to(&session, ServerMessage::hand(hand.to_vec()));
                }
            }
            Err(e) => {
                // The session stays registered so the participant still
                // observes the table, but nobody dealt them a hand.
                tracing::warn!(room = %self.name, player = %name, error = %e, "could not seat player");
                self.registry
                    .send_to(&session, ServerMessage::error(e.to_string()));
            }
        }

        self.registry
            .broadcast(&ServerMessage::shared(self.game.shared_view()));
    }

    /// Applies one client message: resolve the sender, point the turn
    /// marker at them, dispatch, then views and persistence.
    async fn handle_message(&mut self, session: ConnectionId, msg: ClientMessage) {
        let Some(entry) = self.registry.get(&session) else {
            tracing::warn!(room = %self.name, %session, "message from unregistered session, ignoring");
            return;
        };
        if !self.registry.is_live(&session) {
            self.registry.order_close(&session);
            return;
        }
        let player = entry.player.clone();

        self.game.set_current_player(&player);

        let result = match msg {
            ClientMessage::Discard(card) => self.apply_discard(&player, card),
            ClientMessage::Pass => {
                self.game.pass();
                Ok(())
            }
            ClientMessage::Pickup => {
                self.game.pickup(&player).map(|card| {
                    self.registry
                        .send_to(&session, ServerMessage::latest_card(card));
                })
            }
            ClientMessage::Undiscard => {
                self.game.undiscard(&player).map(|card| {
                    self.registry
                        .send_to(&session, ServerMessage::latest_card(card));
                })
            }
            ClientMessage::Reset => {
                self.handle_reset().await;
                return;
            }
            ClientMessage::Join(_) => {
                // Joining happens at connection time; a join frame on an
                // established session is a client bug, not a game move.
                tracing::debug!(room = %self.name, player = %player, "ignoring join on established session");
                return;
            }
        };

        if let Err(e) = result {
            // Report to the originating session only; the engine left
            // state untouched, so nobody else needs to hear about it.
            tracing::debug!(room = %self.name, player = %player, error = %e, "command rejected");
            self.registry
                .send_to(&session, ServerMessage::error(e.to_string()));
            return;
        }

        if let Some(hand) = self.game.hand(&player) {
            self.registry
                .send_to(&session, ServerMessage::hand(hand.to_vec()));
        }
        self.registry
            .broadcast(&ServerMessage::shared(self.game.shared_view()));
        self.persist().await;
    }

    /// Discard plus the winner side effect.
    fn apply_discard(
        &mut self,
        player: &str,
        card: Card,
    ) -> Result<(), cardroom_engine::GameError> {
        self.game.discard(player, card)?;
        if self.game.hand(player).is_some_and(<[Card]>::is_empty) {
            tracing::info!(room = %self.name, %player, "player won");
            self.registry.broadcast(&ServerMessage::winner(player));
        }
        Ok(())
    }

    /// Replaces the engine outright and disconnects the whole table.
    async fn handle_reset(&mut self) {
        self.game = Game::new();
        // Persist before the sessions go away: a crash right after a
        // reset must not resurrect the old table.
        self.persist().await;
        self.registry.kill_all();
        tracing::info!(room = %self.name, "table reset, all sessions closed");
    }

    /// Removes a session and tells the table who left.
    fn handle_disconnect(&mut self, session: ConnectionId) {
        if let Some(entry) = self.registry.remove(&session) {
            tracing::info!(
                room = %self.name,
                player = %entry.player,
                %session,
                sessions = self.registry.len(),
                "session disconnected"
            );
            self.registry
                .broadcast(&ServerMessage::quit(entry.player));
        }
    }

    /// Writes the current snapshot to the store. Broadcast has already
    /// happened by the time this runs; a failure here means the store
    /// is one command behind what clients saw, which is logged and
    /// survived rather than unwound.
    async fn persist(&mut self) {
        let snapshot = self.game.snapshot();
        let bytes = match serde_json::to_vec(&snapshot) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(room = %self.name, error = %e, "snapshot did not serialize");
                return;
            }
        };
        if let Err(e) = self.store.put(self.name.as_str(), &bytes).await {
            tracing::error!(room = %self.name, error = %e, "snapshot write failed, store is behind live state");
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate
/// with it. `game` comes from the manager's cold-start load.
pub(crate) fn spawn_room<S: SnapshotStore>(
    name: RoomName,
    game: Game,
    store: S,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        name: name.clone(),
        game,
        registry: SessionRegistry::new(),
        store,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { name, sender: tx }
}
