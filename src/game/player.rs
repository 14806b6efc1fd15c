//! Player Model
//!
//! Per-player hand and UNO declaration flag.

use std::fmt;
use serde::{Serialize, Deserialize};

use crate::game::card::Card;
use crate::game::deck::{Deck, DeckError};

/// Unique player identifier, supplied by the client on `join` and stable
/// for the process lifetime.
///
/// Implements `Ord` for deterministic BTree iteration order.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Create from a client-supplied name.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State of a single player at the table.
///
/// The hand is ordered and clients reference cards by position, so removal
/// shifts later indices exactly like the wire protocol promises.
#[derive(Debug)]
pub struct Player {
    /// Player identifier.
    pub id: PlayerId,
    /// Cards held, in client-visible order.
    pub hand: Vec<Card>,
    /// Has this player declared UNO for their current single card?
    /// Reset whenever the hand size leaves 1.
    pub has_declared: bool,
}

impl Player {
    /// Create a player with an empty hand.
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            hand: Vec::new(),
            has_declared: false,
        }
    }

    /// Draw `count` cards from the deck into the hand.
    pub fn draw_from(&mut self, deck: &mut Deck, count: usize) -> Result<(), DeckError> {
        for _ in 0..count {
            self.hand.push(deck.draw()?);
        }
        Ok(())
    }

    /// The card at `index`, if in range.
    pub fn card_at(&self, index: usize) -> Option<Card> {
        self.hand.get(index).copied()
    }

    /// Remove and return the card at `index`, if in range.
    pub fn remove_card(&mut self, index: usize) -> Option<Card> {
        if index < self.hand.len() {
            Some(self.hand.remove(index))
        } else {
            None
        }
    }

    /// Number of cards held.
    pub fn hand_len(&self) -> usize {
        self.hand.len()
    }

    /// True while the player holds exactly one card.
    pub fn holds_one(&self) -> bool {
        self.hand.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{Card, Color, Rank};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_from_deck() {
        let mut deck = Deck::standard(StdRng::seed_from_u64(1));
        let mut player = Player::new(PlayerId::new("alice"));

        player.draw_from(&mut deck, 7).unwrap();
        assert_eq!(player.hand_len(), 7);
        assert_eq!(deck.draw_pile_len(), 101);
    }

    #[test]
    fn test_remove_card_preserves_order() {
        let mut player = Player::new(PlayerId::new("alice"));
        player.hand = vec![
            Card::new(Color::Red, Rank::One),
            Card::new(Color::Green, Rank::Two),
            Card::new(Color::Blue, Rank::Three),
        ];

        let removed = player.remove_card(1).unwrap();
        assert_eq!(removed, Card::new(Color::Green, Rank::Two));
        assert_eq!(player.hand, vec![
            Card::new(Color::Red, Rank::One),
            Card::new(Color::Blue, Rank::Three),
        ]);
    }

    #[test]
    fn test_remove_card_out_of_range() {
        let mut player = Player::new(PlayerId::new("bob"));
        player.hand = vec![Card::new(Color::Red, Rank::One)];

        assert_eq!(player.remove_card(1), None);
        assert_eq!(player.hand_len(), 1);
    }

    #[test]
    fn test_player_id_ordering() {
        let a = PlayerId::new("alice");
        let b = PlayerId::new("bob");
        assert!(a < b);
        assert_eq!(a.as_str(), "alice");
    }
}
