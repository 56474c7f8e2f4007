//! Room manager: resolves room names to running actors.

use std::collections::HashMap;

use cardroom_engine::{Game, Snapshot};
use cardroom_protocol::RoomName;
use cardroom_store::SnapshotStore;

use crate::room::spawn_room;
use crate::{RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Creates room actors on demand and tracks the live ones.
///
/// Cold start is a blocking barrier: the snapshot load completes before
/// the actor exists, so no command can race the restore. A store read
/// error is fatal for the room (it does not come up); an unreadable or
/// invalid snapshot falls back to a fresh table (fail closed).
pub struct RoomManager<S: SnapshotStore + Clone> {
    rooms: HashMap<RoomName, RoomHandle>,
    store: S,
}

impl<S: SnapshotStore + Clone> RoomManager<S> {
    /// Creates a manager with no live rooms.
    pub fn new(store: S) -> Self {
        Self {
            rooms: HashMap::new(),
            store,
        }
    }

    /// Returns the handle for `name`, spawning the room on first use.
    ///
    /// # Errors
    /// [`RoomError::Storage`] if the cold-start read fails; the room is
    /// not created and the caller should surface a connection failure.
    pub async fn room(&mut self, name: &RoomName) -> Result<RoomHandle, RoomError> {
        if let Some(handle) = self.rooms.get(name) {
            return Ok(handle.clone());
        }

        let game = self.load(name).await?;
        let handle = spawn_room(
            name.clone(),
            game,
            self.store.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(name.clone(), handle.clone());
        tracing::info!(room = %name, "room created");
        Ok(handle)
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Shuts down a room actor and forgets it.
    pub async fn destroy_room(&mut self, name: &RoomName) {
        if let Some(handle) = self.rooms.remove(name) {
            let _ = handle.shutdown().await;
            tracing::info!(room = %name, "room destroyed");
        }
    }

    /// The cold-start load: store bytes → validated snapshot → game.
    async fn load(&self, name: &RoomName) -> Result<Game, RoomError> {
        let Some(bytes) = self.store.get(name.as_str()).await? else {
            tracing::info!(room = %name, "no snapshot, starting fresh table");
            return Ok(Game::new());
        };

        let snapshot: Snapshot = match serde_json::from_slice(&bytes) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(room = %name, error = %e, "stored snapshot unreadable, starting fresh table");
                return Ok(Game::new());
            }
        };
        match Game::from_snapshot(snapshot) {
            Ok(game) => {
                tracing::info!(
                    room = %name,
                    players = game.players().len(),
                    "restored table from snapshot"
                );
                Ok(game)
            }
            Err(e) => {
                tracing::warn!(room = %name, error = %e, "stored snapshot rejected, starting fresh table");
                Ok(Game::new())
            }
        }
    }
}
