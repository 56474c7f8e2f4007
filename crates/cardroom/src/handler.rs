//! Per-connection handler: the join handshake and the two pumps.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The flow is:
//!   1. Receive the join frame → validate room and player name
//!   2. Resolve the room (cold-starting it from the store if needed)
//!   3. Attach to the room, spawn the outbound pump
//!   4. Loop: decode inbound frames → forward to the room
//!
//! Malformed frames after the handshake are logged and dropped; the
//! connection stays open. The handshake itself is strict: anything but
//! a valid join gets an error frame and a closed connection.

use std::sync::Arc;
use std::time::Duration;

use cardroom_protocol::{
    ClientMessage, Codec, JoinRequest, JsonCodec, ProtocolError, ServerMessage,
};
use cardroom_room::Outbound;
use cardroom_store::SnapshotStore;
use cardroom_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::ServerError;
use crate::server::ServerState;

/// How long a fresh connection gets to present its join frame.
const JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S: SnapshotStore + Clone>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S>>,
) -> Result<(), ServerError> {
    let session = conn.id();
    tracing::debug!(%session, "handling new connection");

    // --- Step 1: join handshake ---
    let join = perform_join(&conn, &state).await?;
    tracing::info!(
        %session,
        room = %join.room,
        player = %join.name,
        "participant joining"
    );

    // --- Step 2: resolve the room (cold start happens in here) ---
    // A storage failure at cold start is fatal for the room and
    // surfaces to this client as a failed connection attempt.
    let room = {
        let mut rooms = state.rooms.lock().await;
        match rooms.room(&join.room).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(room = %join.room, error = %e, "room failed to come up");
                send_error(&conn, &state.codec, "room unavailable").await?;
                let _ = conn.close().await;
                return Err(e.into());
            }
        }
    };

    // --- Step 3: attach and start pumping outbound traffic ---
    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::unbounded_channel();
    room.connect(session, join.name.clone(), tx).await?;

    let pump = tokio::spawn(pump_outbound(Arc::clone(&conn), state.codec, rx));

    // --- Step 4: inbound loop ---
    loop {
        match conn.recv().await {
            Ok(Some(data)) => {
                match state.codec.decode::<ClientMessage>(&data) {
                    Ok(msg) => {
                        if room.message(session, msg).await.is_err() {
                            // Room actor is gone; nothing left to do here.
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::debug!(
                            %session, error = %e,
                            "malformed command ignored"
                        );
                    }
                }
            }
            Ok(None) => {
                tracing::debug!(%session, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(%session, error = %e, "recv error");
                break;
            }
        }
    }

    let _ = room.disconnect(session).await;
    // Disconnect drops the registry's sender, which ends the pump.
    let _ = pump.await;
    Ok(())
}

/// Drains room traffic to the socket until the room lets go of the
/// session (channel closed) or orders the connection shut.
async fn pump_outbound(
    conn: Arc<WebSocketConnection>,
    codec: JsonCodec,
    mut rx: mpsc::UnboundedReceiver<Outbound>,
) {
    while let Some(out) = rx.recv().await {
        match out {
            Outbound::Deliver(msg) => {
                let bytes = match codec.encode(&msg) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(error = %e, "outbound message did not encode");
                        continue;
                    }
                };
                if conn.send(&bytes).await.is_err() {
                    // The room notices on its next broadcast and prunes us.
                    break;
                }
            }
            Outbound::Close => break,
        }
    }
    let _ = conn.close().await;
}

/// Performs the handshake: the first frame must be a valid join.
async fn perform_join<S: SnapshotStore + Clone>(
    conn: &WebSocketConnection,
    state: &ServerState<S>,
) -> Result<JoinRequest, ServerError> {
    let data = match tokio::time::timeout(JOIN_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage(
                "connection closed before join".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            return Err(
                ProtocolError::InvalidMessage("join timed out".into()).into()
            );
        }
    };

    match state.codec.decode::<ClientMessage>(&data) {
        Ok(ClientMessage::Join(join)) if !join.name.is_empty() => Ok(join),
        Ok(ClientMessage::Join(_)) => {
            send_error(conn, &state.codec, "player name must not be empty")
                .await?;
            let _ = conn.close().await;
            Err(ProtocolError::InvalidMessage("empty player name".into()).into())
        }
        Ok(_) => {
            send_error(conn, &state.codec, "expected join").await?;
            let _ = conn.close().await;
            Err(ProtocolError::InvalidMessage(
                "first frame must be join".into(),
            )
            .into())
        }
        Err(e) => {
            send_error(conn, &state.codec, "expected join").await?;
            let _ = conn.close().await;
            Err(e.into())
        }
    }
}

/// Sends an `{"error": ...}` frame to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &JsonCodec,
    message: &str,
) -> Result<(), ServerError> {
    let bytes = codec.encode(&ServerMessage::error(message))?;
    conn.send(&bytes).await?;
    Ok(())
}
