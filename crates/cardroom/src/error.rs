//! Unified error type for the Cardroom server.

use cardroom_protocol::ProtocolError;
use cardroom_room::RoomError;
use cardroom_transport::TransportError;

/// Top-level error that wraps the layer-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, handshake violation).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (cold-start storage failure, actor gone).
    #[error(transparent)]
    Room(#[from] RoomError),
}
