//! Error types for the room layer.

use cardroom_protocol::RoomName;
use cardroom_store::StoreError;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room's command channel is closed; the actor is gone.
    #[error("room {0} is unavailable")]
    Unavailable(RoomName),

    /// The store failed during cold start. Fatal for the room: it does
    /// not come up, and the connecting client sees the failure.
    #[error(transparent)]
    Storage(#[from] StoreError),
}
