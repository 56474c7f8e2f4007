//! Fresh-deck construction.
//!
//! The deck is not a full four-of-everything Uno set; the counts follow
//! the table this game has always played with:
//!
//! ```text
//!  0–3    one of each color zero
//!  4–39   two of each numbered card
//! 40–51   three of each colored action card
//! 52      four Wilds
//! 56      four Draw 4s
//! ```
//!
//! 120 cards total. Codes 53–55 and 57–59 are displayable but never
//! dealt.

use cardroom_protocol::Card;
use rand::seq::SliceRandom;

/// Total cards in a fresh deck; the conservation-law baseline.
pub const DECK_SIZE: usize = 120;

/// Builds the full card multiset in code order.
pub(crate) fn full_multiset() -> Vec<Card> {
    let mut cards: Vec<u8> = (0..=3).collect();
    for code in 4..=39 {
        cards.extend([code, code]);
    }
    for code in 40..=51 {
        cards.extend([code, code, code]);
    }
    cards.extend([52; 4]);
    cards.extend([56; 4]);
    cards.into_iter().map(Card).collect()
}

/// A freshly shuffled deck (uniform random permutation).
pub(crate) fn shuffled() -> Vec<Card> {
    let mut deck = full_multiset();
    deck.shuffle(&mut rand::rng());
    deck
}

/// Per-code counts of the full multiset, indexed by card code.
/// Restore-time conservation checks compare against this.
pub(crate) fn full_counts() -> [u32; 60] {
    let mut counts = [0u32; 60];
    for card in full_multiset() {
        counts[card.0 as usize] += 1;
    }
    counts
}
