//! The Cardroom game engine.
//!
//! A pure, synchronous state machine for one table of an Uno-like card
//! game: deck, per-player hands, discard pile, turn marker and
//! direction, and a bounded event history. No I/O, no clocks, no
//! channels; the room layer owns a [`Game`] and is the only thing that
//! mutates it.
//!
//! Every fallible operation either fully succeeds or returns a
//! [`GameError`] leaving state exactly as it was, so the engine's
//! invariants (card conservation, sorted hands, valid turn index)
//! cannot be broken from the outside.

mod deck;
mod error;
mod game;
mod snapshot;

pub use deck::DECK_SIZE;
pub use error::GameError;
pub use game::{Game, HAND_SIZE, HISTORY_LEN};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotError};
