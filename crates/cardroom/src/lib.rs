//! # Cardroom
//!
//! An authoritative server for an Uno-like shared card table. Each room
//! keeps one copy of the game state, applies participant commands one
//! at a time, broadcasts redacted views to everyone, and persists a
//! snapshot after every command so a restart picks the table back up.
//!
//! The layers underneath are their own crates: `cardroom-transport`
//! (WebSocket), `cardroom-protocol` (wire types and codec),
//! `cardroom-engine` (the pure game state machine), `cardroom-room`
//! (the per-room actor), and `cardroom-store` (snapshot persistence).
//! This crate ties them together into a runnable server.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use cardroom::Server;
//! use cardroom_store::MemoryStore;
//!
//! # async fn run() -> Result<(), cardroom::ServerError> {
//! let server = Server::<MemoryStore>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::{Server, ServerBuilder};
