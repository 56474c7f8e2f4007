//! Room coordination for Cardroom.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`Game`](cardroom_engine::Game), a registry of connected sessions,
//! and a store handle. Commands arrive on an mpsc channel and are
//! applied strictly one at a time: mutate the engine, send views,
//! persist the snapshot, then take the next command.
//!
//! # Key types
//!
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomManager`] — resolves room names to actors, cold-starts them
//!   from the store
//! - [`Outbound`] / [`SessionSender`] — the channel surface a
//!   connection handler drains toward its socket

mod error;
mod manager;
mod registry;
mod room;

pub use error::RoomError;
pub use manager::RoomManager;
pub use registry::{Outbound, SessionSender};
pub use room::{RoomHandle, RoomInfo};
