//! Error types for engine operations.

use cardroom_protocol::Card;

/// Why a game operation was rejected. State is untouched in every case.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The named player holds no hand at this table.
    #[error("{player} is not seated at this table")]
    UnknownPlayer {
        /// The unseated player's name.
        player: String,
    },

    /// A discard named a card the player does not hold.
    #[error("{player} does not hold a {card}")]
    InvalidMove {
        /// The discarding player.
        player: String,
        /// The card they tried to play.
        card: Card,
    },

    /// A pickup found the deck empty. There is no reshuffle policy:
    /// the table halts draws until someone resets.
    #[error("the deck is empty")]
    EmptyDeck,

    /// A join could not be seated: fewer than a full hand's worth of
    /// cards remain in the deck.
    #[error("not enough cards left in the deck to deal a hand")]
    DeckExhausted,

    /// An undiscard found only the seed entry on the pile. The seed is
    /// irremovable so the table always shows a top card.
    #[error("the discard pile has nothing to take back")]
    EmptyDiscardPile,
}
