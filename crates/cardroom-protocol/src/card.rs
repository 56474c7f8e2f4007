//! Card codes and their display names.
//!
//! A card is a single integer in `[0, 59]` that encodes both color and
//! rank. The color is `code % 4`; the rank comes from the range the code
//! falls in:
//!
//! ```text
//!  0–39   numbered cards, value = code / 4 (0..=9)
//! 40–43   Skip
//! 44–47   Reverse
//! 48–51   Draw 2
//! 52–55   Wild        (colorless on display)
//! 56–59   Draw 4      (colorless on display)
//! ```
//!
//! Codes outside every range map to a `CARD-<n>` fallback label rather
//! than failing: the display table never rejects a code, so a corrupt
//! history line stays printable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The four card colors, in code order (`code % 4`).
const COLORS: [&str; 4] = ["Red", "Yellow", "Green", "Blue"];

/// A single card, identified by its integer code.
///
/// `#[serde(transparent)]` keeps the wire form a plain number: a
/// `Card(44)` serializes as `44`, exactly what clients send in
/// `{"cmd":"discard","data":44}`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Card(pub u8);

impl Card {
    /// Color name derived from `code % 4`.
    pub fn color(self) -> &'static str {
        COLORS[(self.0 % 4) as usize]
    }

    /// Returns `true` for the Skip range (40–43).
    pub fn is_skip(self) -> bool {
        (40..=43).contains(&self.0)
    }

    /// Returns `true` for the Reverse range (44–47).
    pub fn is_reverse(self) -> bool {
        (44..=47).contains(&self.0)
    }

    /// Human-readable display name, e.g. `"Red 7"`, `"Blue Skip"`,
    /// `"Wild"`. Unknown codes become `"CARD-<n>"`.
    pub fn name(self) -> String {
        match self.0 {
            0..=39 => format!("{} {}", self.color(), self.0 / 4),
            40..=43 => format!("{} Skip", self.color()),
            44..=47 => format!("{} Reverse", self.color()),
            48..=51 => format!("{} Draw 2", self.color()),
            52..=55 => "Wild".to_string(),
            56..=59 => "Draw 4".to_string(),
            n => format!("CARD-{n}"),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
