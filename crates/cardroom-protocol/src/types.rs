//! Core protocol types for Cardroom's wire format.
//!
//! Every structure here travels on the wire. Client commands and server
//! events share one envelope convention: a `cmd` tag naming the command
//! and a `data` field carrying its payload, so `{"cmd":"discard","data":44}`
//! and `{"cmd":"state","data":{...}}` are both ordinary tagged variants.
//! Two server messages predate that convention and keep their flat
//! shapes: the quit notice `{"quit":<name>}` and the error payload
//! `{"error":<message>}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Card, ProtocolError};

/// A participant's display name. Names double as hand keys in the
/// engine, so they must be unique within a room.
pub type PlayerName = String;

// ---------------------------------------------------------------------------
// RoomName
// ---------------------------------------------------------------------------

/// A validated room identifier.
///
/// The name is the unit of sharding: it picks the room actor and the
/// persistence key. Accepted names are 1 to 32 characters from
/// `[A-Za-z0-9_-]`, which keeps them safe to embed in store keys and
/// file names. Validation runs on construction and on deserialization
/// (`try_from`), so a `RoomName` in hand is always well-formed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomName(String);

impl RoomName {
    /// Maximum accepted length.
    pub const MAX_LEN: usize = 32;

    /// Validates and wraps a room name.
    pub fn new(name: impl Into<String>) -> Result<Self, ProtocolError> {
        let name = name.into();
        if name.is_empty() || name.len() > Self::MAX_LEN {
            return Err(ProtocolError::InvalidRoomName(name));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ProtocolError::InvalidRoomName(name));
        }
        Ok(Self(name))
    }

    /// The validated name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RoomName {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomName> for String {
    fn from(name: RoomName) -> Self {
        name.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// Payload of the join handshake: which room, and who is joining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    /// The room to join or create.
    pub room: RoomName,
    /// The joining player's name.
    pub name: PlayerName,
}

/// Everything a client can send, as a closed set of tagged variants.
///
/// `#[serde(tag = "cmd", content = "data")]` produces the adjacently
/// tagged wire form: `{"cmd":"discard","data":44}`. Unit variants omit
/// `data` entirely (`{"cmd":"pass"}`). A frame whose `cmd` is not one
/// of these variants fails deserialization, which the connection
/// handler treats as a malformed command: logged and ignored, never a
/// reason to drop the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First frame on every connection: identify the room and player.
    Join(JoinRequest),
    /// Play a card from the sender's hand onto the discard pile.
    Discard(Card),
    /// Advance the turn marker without playing.
    Pass,
    /// Draw the top card of the deck.
    Pickup,
    /// Take the top discard back into the sender's hand.
    Undiscard,
    /// Throw the game away and start a fresh one.
    Reset,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// The personalized state payload: the recipient's own hand, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandView {
    /// The recipient's cards, sorted ascending by code.
    pub hand: Vec<Card>,
}

/// The redacted projection broadcast to every participant.
///
/// Other players' hands appear only as sizes; the full discard pile is
/// cut down to its last five entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedView {
    /// Last five discards as `(player, card)` pairs, oldest first.
    pub discards: Vec<(PlayerName, Card)>,
    /// The bounded event history.
    pub history: Vec<String>,
    /// Name of the player whose turn it (nominally) is.
    pub current: Option<PlayerName>,
    /// Turn direction: `true` = forward through the player list.
    pub direction: bool,
    /// Every seated player with their hand size.
    pub players: Vec<(PlayerName, usize)>,
}

/// Payload of a `state` event: personalized or shared.
///
/// Both shapes travel under the same `"state"` tag, so the variant is
/// untagged and recognized by its fields: the personalized form is an
/// object with a single `hand` key, the shared form carries the
/// redacted projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateView {
    /// `{"hand":[...]}` — sent to one participant.
    Hand(HandView),
    /// The shared projection — broadcast to everyone.
    Shared(SharedView),
}

/// Tagged server events, same `cmd`/`data` envelope as client commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A state refresh, personalized or shared.
    State(StateView),
    /// Private reply carrying the card a pickup/undiscard produced.
    LatestCard(Card),
    /// Somebody emptied their hand.
    Winner(PlayerName),
}

/// Everything the server can send.
///
/// Untagged: the three shapes (`{"cmd":...}`, `{"quit":...}`,
/// `{"error":...}`) have disjoint keys, so serde picks the right
/// variant from the fields present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// A tagged event (`state`, `latest_card`, `winner`).
    Event(ServerEvent),
    /// A participant left: `{"quit":<name>}`.
    Quit {
        /// The departing player's name.
        quit: PlayerName,
    },
    /// A command failed for the recipient: `{"error":<message>}`.
    Error {
        /// Human-readable failure description.
        error: String,
    },
}

impl ServerMessage {
    /// Personalized state for one participant.
    pub fn hand(hand: Vec<Card>) -> Self {
        Self::Event(ServerEvent::State(StateView::Hand(HandView { hand })))
    }

    /// Shared state for everyone.
    pub fn shared(view: SharedView) -> Self {
        Self::Event(ServerEvent::State(StateView::Shared(view)))
    }

    /// Private `latest_card` reply.
    pub fn latest_card(card: Card) -> Self {
        Self::Event(ServerEvent::LatestCard(card))
    }

    /// Winner broadcast.
    pub fn winner(name: impl Into<PlayerName>) -> Self {
        Self::Event(ServerEvent::Winner(name.into()))
    }

    /// Quit notice broadcast.
    pub fn quit(name: impl Into<PlayerName>) -> Self {
        Self::Quit { quit: name.into() }
    }

    /// Error payload for the originating session.
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
