//! `Server` builder and accept loop.
//!
//! This is the entry point for running a Cardroom server. It ties the
//! layers together: transport → protocol → room → store.

use std::sync::Arc;

use cardroom_protocol::JsonCodec;
use cardroom_room::RoomManager;
use cardroom_store::SnapshotStore;
use cardroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::ServerError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: SnapshotStore + Clone> {
    pub(crate) rooms: Mutex<RoomManager<S>>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Cardroom server.
pub struct ServerBuilder {
    bind_addr: String,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the transport and assembles the server around `store`.
    pub async fn build<S: SnapshotStore + Clone>(
        self,
        store: S,
    ) -> Result<Server<S>, ServerError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(store)),
            codec: JsonCodec,
        });

        Ok(Server { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Cardroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server<S: SnapshotStore + Clone> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S>>,
}

impl<S: SnapshotStore + Clone> Server<S> {
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// participant. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("Cardroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
