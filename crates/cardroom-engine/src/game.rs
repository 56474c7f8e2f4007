//! The game state machine.

use std::collections::BTreeMap;

use cardroom_protocol::{Card, PlayerName, SharedView};

use crate::{GameError, Snapshot, SnapshotError, deck, snapshot::SNAPSHOT_VERSION};

/// Cards dealt to a joining player.
pub const HAND_SIZE: usize = 7;

/// Retained history entries.
pub const HISTORY_LEN: usize = 5;

/// Discard-pile entries exposed in the shared view.
const SHARED_DISCARDS: usize = 5;

/// One table's complete authoritative state.
///
/// Mutated one operation at a time by its room actor. The turn marker
/// (`current`, `direction`) is advisory display state: the room sets
/// `current` to whoever sent the last command, and no operation checks
/// whose turn it is.
#[derive(Debug)]
pub struct Game {
    deck: Vec<Card>,
    hands: BTreeMap<PlayerName, Vec<Card>>,
    players: Vec<PlayerName>,
    discards: Vec<(PlayerName, Card)>,
    history: Vec<String>,
    current: usize,
    direction: bool,
    /// Run-length tracker for consecutive pickups: `(player, count)`.
    /// Transient; deliberately absent from snapshots.
    last_pickup: Option<(PlayerName, u32)>,
}

impl Game {
    /// A fresh table: shuffled deck, one seed discard, nobody seated.
    pub fn new() -> Self {
        let mut deck = deck::shuffled();
        let seed = deck.pop().expect("a fresh deck is never empty");
        Self {
            deck,
            hands: BTreeMap::new(),
            players: Vec::new(),
            discards: vec![(PlayerName::new(), seed)],
            history: vec!["welcome".to_string()],
            current: 0,
            direction: true,
            last_pickup: None,
        }
    }

    /// Restores a table from a validated snapshot.
    ///
    /// # Errors
    /// Returns the first structural problem found; callers are expected
    /// to fall back to [`Game::new`] (fail closed).
    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self, SnapshotError> {
        snapshot.validate()?;
        Ok(Self {
            deck: snapshot.deck,
            hands: snapshot.hands,
            players: snapshot.players,
            discards: snapshot.discards,
            history: snapshot.history,
            current: snapshot.current,
            direction: snapshot.direction,
            last_pickup: None,
        })
    }

    /// The serializable projection of the full state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            deck: self.deck.clone(),
            hands: self.hands.clone(),
            players: self.players.clone(),
            discards: self.discards.clone(),
            history: self.history.clone(),
            current: self.current,
            direction: self.direction,
        }
    }

    /// Seats a player and deals them a hand. Idempotent: a name that
    /// already holds a hand is left untouched.
    ///
    /// # Errors
    /// [`GameError::DeckExhausted`] if fewer than [`HAND_SIZE`] cards
    /// remain; the player is not seated.
    pub fn add_player(&mut self, name: &str) -> Result<(), GameError> {
        if self.hands.contains_key(name) {
            return Ok(());
        }
        if self.deck.len() < HAND_SIZE {
            return Err(GameError::DeckExhausted);
        }
        let mut hand = self.deck.split_off(self.deck.len() - HAND_SIZE);
        hand.sort_unstable();
        self.players.push(name.to_string());
        self.hands.insert(name.to_string(), hand);
        self.push_history(format!("{name} picked up 7"));
        Ok(())
    }

    /// Points the turn marker at `name`, if seated. Silent no-op
    /// otherwise. The room calls this with the sender of every command,
    /// which is what makes "current player" advisory rather than a
    /// turn-order gate.
    pub fn set_current_player(&mut self, name: &str) {
        if let Some(idx) = self.players.iter().position(|p| p == name) {
            self.current = idx;
        }
    }

    /// Plays `card` from `name`'s hand onto the discard pile.
    ///
    /// A Reverse flips direction before the turn advances; a Skip
    /// advances the turn a second step.
    ///
    /// # Errors
    /// [`GameError::UnknownPlayer`] if `name` holds no hand;
    /// [`GameError::InvalidMove`] if the card is not in it.
    pub fn discard(&mut self, name: &str, card: Card) -> Result<(), GameError> {
        let hand = self.hands.get_mut(name).ok_or_else(|| {
            GameError::UnknownPlayer {
                player: name.to_string(),
            }
        })?;
        let idx = hand.iter().position(|&c| c == card).ok_or_else(|| {
            GameError::InvalidMove {
                player: name.to_string(),
                card,
            }
        })?;
        hand.remove(idx);
        self.discards.push((name.to_string(), card));
        if card.is_reverse() {
            self.direction = !self.direction;
        }
        self.pass();
        if card.is_skip() {
            self.pass();
        }
        self.push_history(format!("{name} played a {}", card.name()));
        Ok(())
    }

    /// Advances the turn marker one step in the current direction.
    /// No-op at an empty table.
    pub fn pass(&mut self) {
        let len = self.players.len();
        if len == 0 {
            return;
        }
        let step = if self.direction { 1 } else { len - 1 };
        self.current = (self.current + step) % len;
    }

    /// Draws the top card of the deck into `name`'s hand and returns it.
    ///
    /// Consecutive pickups by the same player collapse into one running
    /// history entry ("`name` picked up N") instead of appending.
    ///
    /// # Errors
    /// [`GameError::UnknownPlayer`] if `name` holds no hand;
    /// [`GameError::EmptyDeck`] if nothing is left to draw.
    pub fn pickup(&mut self, name: &str) -> Result<Card, GameError> {
        let hand = self.hands.get_mut(name).ok_or_else(|| {
            GameError::UnknownPlayer {
                player: name.to_string(),
            }
        })?;
        let card = self.deck.pop().ok_or(GameError::EmptyDeck)?;
        hand.push(card);
        hand.sort_unstable();

        match &mut self.last_pickup {
            Some((player, count)) if player == name => {
                *count += 1;
                let line = format!("{name} picked up {count}");
                if let Some(last) = self.history.last_mut() {
                    *last = line;
                }
            }
            _ => {
                self.push_history(format!("{name} picked up"));
                self.last_pickup = Some((name.to_string(), 1));
            }
        }
        Ok(card)
    }

    /// Takes the most recent discard back into `name`'s hand and
    /// returns it, regardless of who originally played it.
    ///
    /// # Errors
    /// [`GameError::UnknownPlayer`] if `name` holds no hand;
    /// [`GameError::EmptyDiscardPile`] if only the seed entry remains.
    pub fn undiscard(&mut self, name: &str) -> Result<Card, GameError> {
        let hand = self.hands.get_mut(name).ok_or_else(|| {
            GameError::UnknownPlayer {
                player: name.to_string(),
            }
        })?;
        if self.discards.len() < 2 {
            return Err(GameError::EmptyDiscardPile);
        }
        let (_, card) = self
            .discards
            .pop()
            .expect("pile length was checked above");
        hand.push(card);
        hand.sort_unstable();
        self.push_history(format!("{name} undid playing {}", card.name()));
        Ok(card)
    }

    /// The redacted projection broadcast to every participant.
    pub fn shared_view(&self) -> SharedView {
        let discards_from = self.discards.len().saturating_sub(SHARED_DISCARDS);
        SharedView {
            discards: self.discards[discards_from..].to_vec(),
            history: self.history.clone(),
            current: self.players.get(self.current).cloned(),
            direction: self.direction,
            players: self
                .players
                .iter()
                .map(|name| {
                    (name.clone(), self.hands.get(name).map_or(0, Vec::len))
                })
                .collect(),
        }
    }

    /// The named player's hand, sorted ascending. `None` if unseated.
    pub fn hand(&self, name: &str) -> Option<&[Card]> {
        self.hands.get(name).map(Vec::as_slice)
    }

    /// Seated players in turn order.
    pub fn players(&self) -> &[PlayerName] {
        &self.players
    }

    /// The bounded event history, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Index of the nominal current player.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Turn direction: `true` = forward through the player list.
    pub fn direction(&self) -> bool {
        self.direction
    }

    /// Cards left to draw.
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Entries on the discard pile, seed included.
    pub fn discard_len(&self) -> usize {
        self.discards.len()
    }

    /// Appends a history line, trimming to the retention bound and
    /// breaking any pickup run.
    fn push_history(&mut self, entry: String) {
        self.last_pickup = None;
        if self.history.len() >= HISTORY_LEN {
            let excess = self.history.len() + 1 - HISTORY_LEN;
            self.history.drain(..excess);
        }
        self.history.push(entry);
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DECK_SIZE;

    #[test]
    fn test_new_game_seeds_one_discard() {
        let game = Game::new();
        assert_eq!(game.deck_len(), DECK_SIZE - 1);
        assert_eq!(game.discard_len(), 1);
        assert_eq!(game.history(), ["welcome"]);
        assert!(game.players().is_empty());
        assert_eq!(game.current(), 0);
        assert!(game.direction());
    }

    #[test]
    fn test_add_player_deals_seven_sorted() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        let hand = game.hand("Ann").unwrap();
        assert_eq!(hand.len(), HAND_SIZE);
        assert!(hand.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(game.deck_len(), DECK_SIZE - 1 - HAND_SIZE);
        assert_eq!(game.history().last().unwrap(), "Ann picked up 7");
    }

    #[test]
    fn test_add_player_is_idempotent() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        let hand_before = game.hand("Ann").unwrap().to_vec();
        let history_before = game.history().to_vec();

        game.add_player("Ann").unwrap();

        assert_eq!(game.hand("Ann").unwrap(), hand_before);
        assert_eq!(game.history(), history_before);
        assert_eq!(game.players(), ["Ann"]);
    }

    #[test]
    fn test_add_player_fails_when_deck_cannot_cover_a_hand() {
        let mut game = Game::new();
        // 119 drawable cards: 17 hands fit exactly, leaving 0.
        for i in 0..17 {
            game.add_player(&format!("p{i}")).unwrap();
        }
        assert_eq!(game.deck_len(), 0);
        let err = game.add_player("late").unwrap_err();
        assert!(matches!(err, GameError::DeckExhausted));
        assert!(game.hand("late").is_none());
        assert_eq!(game.players().len(), 17);
    }

    #[test]
    fn test_set_current_player_by_name() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();
        game.set_current_player("Bo");
        assert_eq!(game.current(), 1);
        game.set_current_player("nobody");
        assert_eq!(game.current(), 1, "unknown name must be a no-op");
    }

    #[test]
    fn test_pass_respects_direction() {
        let mut game = Game::new();
        for name in ["Ann", "Bo", "Cy"] {
            game.add_player(name).unwrap();
        }
        game.pass();
        assert_eq!(game.current(), 1);
        game.pass();
        assert_eq!(game.current(), 2);
        game.pass();
        assert_eq!(game.current(), 0, "forward wraps");
    }

    #[test]
    fn test_pass_on_empty_table_is_noop() {
        let mut game = Game::new();
        game.pass();
        assert_eq!(game.current(), 0);
    }

    #[test]
    fn test_discard_unknown_player_is_rejected() {
        let mut game = Game::new();
        let err = game.discard("ghost", Card(0)).unwrap_err();
        assert!(matches!(err, GameError::UnknownPlayer { .. }));
    }

    #[test]
    fn test_discard_card_not_in_hand_is_rejected_without_mutation() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        let hand_before = game.hand("Ann").unwrap().to_vec();
        let absent = (0u8..60)
            .map(Card)
            .find(|c| !hand_before.contains(c))
            .expect("seven cards cannot cover sixty codes");

        let err = game.discard("Ann", absent).unwrap_err();

        assert!(matches!(err, GameError::InvalidMove { .. }));
        assert_eq!(game.hand("Ann").unwrap(), hand_before);
        assert_eq!(game.discard_len(), 1);
        assert_eq!(game.history().last().unwrap(), "Ann picked up 7");
    }

    #[test]
    fn test_discard_removes_one_copy_and_records_history() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();
        let card = game.hand("Ann").unwrap()[0];

        game.discard("Ann", card).unwrap();

        assert_eq!(game.hand("Ann").unwrap().len(), HAND_SIZE - 1);
        assert_eq!(game.discard_len(), 2);
        assert_eq!(
            game.history().last().unwrap(),
            &format!("Ann played a {}", card.name())
        );
    }

    #[test]
    fn test_pickup_draws_and_sorts() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        let deck_before = game.deck_len();

        let card = game.pickup("Ann").unwrap();

        let hand = game.hand("Ann").unwrap();
        assert_eq!(hand.len(), HAND_SIZE + 1);
        assert!(hand.contains(&card));
        assert!(hand.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(game.deck_len(), deck_before - 1);
        assert_eq!(game.history().last().unwrap(), "Ann picked up");
    }

    #[test]
    fn test_consecutive_pickups_collapse_into_running_count() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        let history_len = game.history().len();

        game.pickup("Ann").unwrap();
        game.pickup("Ann").unwrap();

        assert_eq!(game.history().len(), history_len + 1);
        assert_eq!(game.history().last().unwrap(), "Ann picked up 2");

        game.pickup("Ann").unwrap();
        assert_eq!(game.history().last().unwrap(), "Ann picked up 3");
    }

    #[test]
    fn test_pickup_run_breaks_on_other_action() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();

        game.pickup("Ann").unwrap();
        game.pickup("Bo").unwrap();
        assert_eq!(game.history().last().unwrap(), "Bo picked up");

        game.pickup("Ann").unwrap();
        game.pickup("Ann").unwrap();
        let history = game.history();
        assert_eq!(history.last().unwrap(), "Ann picked up 2");
        assert_eq!(&history[history.len() - 2], "Bo picked up");
    }

    #[test]
    fn test_pickup_on_empty_deck_fails_cleanly() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        while game.deck_len() > 0 {
            game.pickup("Ann").unwrap();
        }
        let hand_before = game.hand("Ann").unwrap().to_vec();

        let err = game.pickup("Ann").unwrap_err();

        assert!(matches!(err, GameError::EmptyDeck));
        assert_eq!(game.hand("Ann").unwrap(), hand_before);
    }

    #[test]
    fn test_undiscard_returns_top_card_to_any_player() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();
        let card = game.hand("Ann").unwrap()[0];
        game.discard("Ann", card).unwrap();

        // Bo takes back Ann's discard.
        let taken = game.undiscard("Bo").unwrap();

        assert_eq!(taken, card);
        assert!(game.hand("Bo").unwrap().contains(&card));
        assert_eq!(game.discard_len(), 1);
        assert_eq!(
            game.history().last().unwrap(),
            &format!("Bo undid playing {}", card.name())
        );
    }

    #[test]
    fn test_undiscard_never_removes_the_seed() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();

        let err = game.undiscard("Ann").unwrap_err();

        assert!(matches!(err, GameError::EmptyDiscardPile));
        assert_eq!(game.discard_len(), 1);
        assert_eq!(game.hand("Ann").unwrap().len(), HAND_SIZE);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();
        // Alternating pickups never collapse, so each appends.
        for _ in 0..6 {
            game.pickup("Ann").unwrap();
            game.pickup("Bo").unwrap();
        }
        assert_eq!(game.history().len(), HISTORY_LEN);
    }

    #[test]
    fn test_shared_view_redacts_hands() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        game.add_player("Bo").unwrap();

        let view = game.shared_view();

        assert_eq!(
            view.players,
            vec![("Ann".to_string(), 7), ("Bo".to_string(), 7)]
        );
        assert_eq!(view.current.as_deref(), Some("Ann"));
        assert!(view.direction);
        assert_eq!(view.discards.len(), 1);
    }

    #[test]
    fn test_shared_view_caps_discards_at_five() {
        let mut game = Game::new();
        game.add_player("Ann").unwrap();
        for _ in 0..6 {
            let card = game.hand("Ann").unwrap()[0];
            game.discard("Ann", card).unwrap();
            game.pickup("Ann").unwrap();
        }
        assert_eq!(game.discard_len(), 7);

        let view = game.shared_view();

        assert_eq!(view.discards.len(), 5);
        // The cap keeps the most recent entries.
        let last_played = game.snapshot().discards.last().unwrap().clone();
        assert_eq!(view.discards.last().unwrap(), &last_played);
    }

    #[test]
    fn test_shared_view_of_empty_table_has_no_current() {
        let game = Game::new();
        let view = game.shared_view();
        assert_eq!(view.current, None);
        assert!(view.players.is_empty());
    }
}
