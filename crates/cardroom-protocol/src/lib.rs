//! Wire protocol for Cardroom.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Cards** ([`Card`]) — the integer card codes and their display names.
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`SharedView`], etc.)
//!   — the message structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! layer (player context). It doesn't know about connections or rooms;
//! it only knows how to describe and serialize messages.

mod card;
mod codec;
mod error;
mod types;

pub use card::Card;
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, HandView, JoinRequest, PlayerName, RoomName, ServerEvent,
    ServerMessage, SharedView, StateView,
};
