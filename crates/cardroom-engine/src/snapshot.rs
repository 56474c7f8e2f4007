//! Snapshot: the persisted projection of a table.
//!
//! A snapshot carries everything observable about a [`Game`](crate::Game)
//! plus an explicit schema version. Restoring validates the structure
//! and the card conservation law and fails closed: a snapshot that
//! doesn't hold up is rejected, and the room falls back to a fresh
//! table instead of trusting a half-plausible blob.

use std::collections::{BTreeMap, HashSet};

use cardroom_protocol::{Card, PlayerName};
use serde::{Deserialize, Serialize};

use crate::deck;

/// Current snapshot schema version. Bump on any shape change.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The serializable projection of a full table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Schema version tag; restore rejects mismatches.
    pub version: u32,
    /// Remaining draw pile, bottom first.
    pub deck: Vec<Card>,
    /// Every seated player's hand, sorted ascending.
    pub hands: BTreeMap<PlayerName, Vec<Card>>,
    /// Seated players in turn order.
    pub players: Vec<PlayerName>,
    /// Discard pile as `(player, card)` pairs, seed entry first.
    pub discards: Vec<(PlayerName, Card)>,
    /// Bounded event history, oldest first.
    pub history: Vec<String>,
    /// Index of the nominal current player.
    pub current: usize,
    /// Turn direction: `true` = forward.
    pub direction: bool,
}

/// Why a snapshot was rejected on restore.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The version tag doesn't match this build's schema.
    #[error("snapshot version {found} does not match {SNAPSHOT_VERSION}")]
    VersionMismatch {
        /// The version found in the blob.
        found: u32,
    },

    /// A player name appears twice in the turn order.
    #[error("duplicate player {player:?} in turn order")]
    DuplicatePlayer {
        /// The repeated name.
        player: String,
    },

    /// The turn order and the hand map disagree about who is seated.
    #[error("players and hands disagree about who is seated")]
    HandsMismatch,

    /// The current index points outside the player list.
    #[error("current index {current} out of range for {players} players")]
    CurrentOutOfRange {
        /// The out-of-range index.
        current: usize,
        /// How many players are seated.
        players: usize,
    },

    /// The discard pile lost its seed entry.
    #[error("discard pile is missing its seed entry")]
    MissingSeedDiscard,

    /// The cards across deck, hands, and discards no longer form the
    /// fresh-deck multiset.
    #[error("card conservation violated")]
    ConservationViolated,
}

impl Snapshot {
    /// Checks the structural invariants a restorable table must hold.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                found: self.version,
            });
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if !seen.insert(player.as_str()) {
                return Err(SnapshotError::DuplicatePlayer {
                    player: player.clone(),
                });
            }
        }
        if self.players.len() != self.hands.len()
            || !self.players.iter().all(|p| self.hands.contains_key(p))
        {
            return Err(SnapshotError::HandsMismatch);
        }

        if !self.players.is_empty() && self.current >= self.players.len() {
            return Err(SnapshotError::CurrentOutOfRange {
                current: self.current,
                players: self.players.len(),
            });
        }
        if self.players.is_empty() && self.current != 0 {
            return Err(SnapshotError::CurrentOutOfRange {
                current: self.current,
                players: 0,
            });
        }

        if self.discards.is_empty() {
            return Err(SnapshotError::MissingSeedDiscard);
        }

        let mut counts = [0u32; 60];
        let all_cards = self
            .deck
            .iter()
            .chain(self.hands.values().flatten())
            .chain(self.discards.iter().map(|(_, card)| card));
        for card in all_cards {
            let Some(slot) = counts.get_mut(card.0 as usize) else {
                return Err(SnapshotError::ConservationViolated);
            };
            *slot += 1;
        }
        if counts != deck::full_counts() {
            return Err(SnapshotError::ConservationViolated);
        }

        Ok(())
    }
}
