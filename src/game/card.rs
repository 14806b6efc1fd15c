//! Card Values and Legality
//!
//! Immutable card value types and the standard 108-card composition.
//! Playing a wild-class card never mutates the card value held elsewhere;
//! the table places a *new* card with the chosen color on the discard pile.

use std::fmt;
use serde::{Serialize, Deserialize};

// =============================================================================
// COLOR
// =============================================================================

/// Card color. `Wild` is the sentinel for cards with no intrinsic color;
/// it never appears on the discard pile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Color {
    /// Red.
    Red = 0,
    /// Green.
    Green = 1,
    /// Blue.
    Blue = 2,
    /// Yellow.
    Yellow = 3,
    /// No intrinsic color (Wild / Wild Draw Four before resolution).
    Wild = 4,
}

/// The four real colors, in deck-building order.
pub const REAL_COLORS: [Color; 4] = [Color::Red, Color::Green, Color::Blue, Color::Yellow];

impl Color {
    /// True for the four playable colors, false for the sentinel.
    #[inline]
    pub fn is_real(self) -> bool {
        self != Color::Wild
    }

    /// Parse a client-supplied color name ("red", "Green", ...).
    ///
    /// The sentinel is not accepted; clients may only choose real colors.
    pub fn from_name(name: &str) -> Option<Color> {
        match name.to_ascii_lowercase().as_str() {
            "red" => Some(Color::Red),
            "green" => Some(Color::Green),
            "blue" => Some(Color::Blue),
            "yellow" => Some(Color::Yellow),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
            Color::Yellow => "yellow",
            Color::Wild => "wild",
        };
        write!(f, "{}", name)
    }
}

// =============================================================================
// RANK
// =============================================================================

/// Card rank: ten numbers, three colored actions, two wild-class ranks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Rank {
    /// Number 0 (one per color).
    Zero = 0,
    /// Number 1.
    One = 1,
    /// Number 2.
    Two = 2,
    /// Number 3.
    Three = 3,
    /// Number 4.
    Four = 4,
    /// Number 5.
    Five = 5,
    /// Number 6.
    Six = 6,
    /// Number 7.
    Seven = 7,
    /// Number 8.
    Eight = 8,
    /// Number 9.
    Nine = 9,
    /// Skip the next player.
    Skip = 10,
    /// Flip the direction of play.
    Reverse = 11,
    /// Next player draws two and is skipped.
    DrawTwo = 12,
    /// Change the active color.
    Wild = 13,
    /// Change the active color, next player draws four and is skipped.
    WildDrawFour = 14,
}

/// Number ranks, used when building the deck.
pub const NUMBER_RANKS: [Rank; 10] = [
    Rank::Zero, Rank::One, Rank::Two, Rank::Three, Rank::Four,
    Rank::Five, Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine,
];

/// Colored action ranks, used when building the deck.
pub const ACTION_RANKS: [Rank; 3] = [Rank::Skip, Rank::Reverse, Rank::DrawTwo];

impl Rank {
    /// True for 0-9.
    #[inline]
    pub fn is_number(self) -> bool {
        (self as u8) <= (Rank::Nine as u8)
    }

    /// True for Wild and Wild Draw Four.
    #[inline]
    pub fn is_wild_class(self) -> bool {
        matches!(self, Rank::Wild | Rank::WildDrawFour)
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Skip => write!(f, "skip"),
            Rank::Reverse => write!(f, "reverse"),
            Rank::DrawTwo => write!(f, "draw-two"),
            Rank::Wild => write!(f, "wild"),
            Rank::WildDrawFour => write!(f, "wild-draw-four"),
            number => write!(f, "{}", *number as u8),
        }
    }
}

// =============================================================================
// CARD
// =============================================================================

/// A single card value.
///
/// Wild-class cards carry `Color::Wild` while in the deck or a hand. The
/// discard pile only ever holds cards with a real color; see
/// [`Card::with_color`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    /// Printed color, or the sentinel for wild-class cards.
    pub color: Color,
    /// Printed rank.
    pub rank: Rank,
}

impl Card {
    /// Create a card value.
    pub const fn new(color: Color, rank: Rank) -> Self {
        Self { color, rank }
    }

    /// True for Wild and Wild Draw Four regardless of resolved color.
    #[inline]
    pub fn is_wild_class(self) -> bool {
        self.rank.is_wild_class()
    }

    /// Legality check: can this card be played on `top`?
    ///
    /// Wild-class cards always match; otherwise color or rank must agree.
    pub fn matches(self, top: Card) -> bool {
        self.is_wild_class() || self.color == top.color || self.rank == top.rank
    }

    /// A copy of this card with its color resolved to `color`.
    ///
    /// Used when a wild-class card is placed on the discard pile; the
    /// original card value is left untouched.
    pub fn with_color(self, color: Color) -> Card {
        Card { color, rank: self.rank }
    }

    /// A copy of this card with wild-class color reverted to the sentinel.
    ///
    /// Used when the discard pile is recycled into the draw pile, so the
    /// recycled pile matches the original composition.
    pub fn unresolved(self) -> Card {
        if self.is_wild_class() {
            Card { color: Color::Wild, rank: self.rank }
        } else {
            self
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rank.is_wild_class() && !self.color.is_real() {
            // Unresolved wilds print bare: "wild", "wild-draw-four".
            write!(f, "{}", self.rank)
        } else {
            write!(f, "{} {}", self.color, self.rank)
        }
    }
}

/// Build the standard 108-card set, unshuffled.
///
/// Per color: one 0, two of each of 1-9, Skip, Reverse and Draw Two.
/// Plus four Wild and four Wild Draw Four.
pub fn standard_set() -> Vec<Card> {
    let mut cards = Vec::with_capacity(crate::DECK_SIZE);

    for color in REAL_COLORS {
        cards.push(Card::new(color, Rank::Zero));
        for rank in NUMBER_RANKS.into_iter().skip(1).chain(ACTION_RANKS) {
            cards.push(Card::new(color, rank));
            cards.push(Card::new(color, rank));
        }
    }

    for _ in 0..4 {
        cards.push(Card::new(Color::Wild, Rank::Wild));
        cards.push(Card::new(Color::Wild, Rank::WildDrawFour));
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_set_size() {
        assert_eq!(standard_set().len(), 108);
    }

    #[test]
    fn test_standard_set_composition() {
        let cards = standard_set();

        let count = |color, rank| {
            cards.iter().filter(|c| c.color == color && c.rank == rank).count()
        };

        for color in REAL_COLORS {
            assert_eq!(count(color, Rank::Zero), 1);
            assert_eq!(count(color, Rank::Five), 2);
            assert_eq!(count(color, Rank::Nine), 2);
            assert_eq!(count(color, Rank::Skip), 2);
            assert_eq!(count(color, Rank::Reverse), 2);
            assert_eq!(count(color, Rank::DrawTwo), 2);
        }

        assert_eq!(count(Color::Wild, Rank::Wild), 4);
        assert_eq!(count(Color::Wild, Rank::WildDrawFour), 4);
    }

    #[test]
    fn test_matches_by_color() {
        let top = Card::new(Color::Red, Rank::Five);
        assert!(Card::new(Color::Red, Rank::Nine).matches(top));
        assert!(!Card::new(Color::Blue, Rank::Nine).matches(top));
    }

    #[test]
    fn test_matches_by_rank() {
        let top = Card::new(Color::Red, Rank::Five);
        assert!(Card::new(Color::Blue, Rank::Five).matches(top));
        assert!(Card::new(Color::Green, Rank::Five).matches(top));
    }

    #[test]
    fn test_wild_class_always_matches() {
        let top = Card::new(Color::Yellow, Rank::Seven);
        assert!(Card::new(Color::Wild, Rank::Wild).matches(top));
        assert!(Card::new(Color::Wild, Rank::WildDrawFour).matches(top));
        // A resolved wild on the pile is matched like any colored card.
        assert!(Card::new(Color::Wild, Rank::Wild)
            .with_color(Color::Red)
            .matches(Card::new(Color::Red, Rank::Two)));
    }

    #[test]
    fn test_with_color_does_not_mutate_original() {
        let wild = Card::new(Color::Wild, Rank::WildDrawFour);
        let placed = wild.with_color(Color::Green);
        assert_eq!(placed.color, Color::Green);
        assert_eq!(wild.color, Color::Wild);
    }

    #[test]
    fn test_unresolved_reverts_only_wild_class() {
        let placed = Card::new(Color::Green, Rank::Wild);
        assert_eq!(placed.unresolved().color, Color::Wild);

        let red_five = Card::new(Color::Red, Rank::Five);
        assert_eq!(red_five.unresolved(), red_five);
    }

    #[test]
    fn test_display() {
        assert_eq!(Card::new(Color::Red, Rank::Five).to_string(), "red 5");
        assert_eq!(Card::new(Color::Green, Rank::DrawTwo).to_string(), "green draw-two");
        assert_eq!(Card::new(Color::Wild, Rank::Wild).to_string(), "wild");
        assert_eq!(Card::new(Color::Wild, Rank::WildDrawFour).to_string(), "wild-draw-four");
        assert_eq!(
            Card::new(Color::Wild, Rank::WildDrawFour).with_color(Color::Blue).to_string(),
            "blue wild-draw-four"
        );
    }

    #[test]
    fn test_color_from_name() {
        assert_eq!(Color::from_name("red"), Some(Color::Red));
        assert_eq!(Color::from_name("YELLOW"), Some(Color::Yellow));
        assert_eq!(Color::from_name("wild"), None);
        assert_eq!(Color::from_name("purple"), None);
    }
}
