//! Deck Lifecycle
//!
//! The shuffled draw pile and the discard pile it refills from.
//!
//! Conservation invariant: every one of the 108 cards is in the draw pile,
//! the discard pile, or some player's hand at all times. Cards are recycled,
//! never dropped. When the draw pile runs out, a single bounded pass moves
//! all but the discard top back into the draw pile and reshuffles.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::game::card::{standard_set, Card};

/// Deck failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    /// Both piles are empty. Unreachable while the 108-card total holds,
    /// but drawing reports it rather than assuming.
    #[error("no cards left to draw")]
    Exhausted,
}

/// Draw pile plus discard pile.
///
/// The discard pile owns the active top card (its last element). The deck
/// keeps its own RNG so reshuffles are reproducible from a seed.
#[derive(Debug)]
pub struct Deck {
    draw_pile: Vec<Card>,
    discard: Vec<Card>,
    rng: StdRng,
}

impl Deck {
    /// Build the standard 108-card deck, shuffled, with an empty discard.
    pub fn standard(mut rng: StdRng) -> Self {
        let mut draw_pile = standard_set();
        draw_pile.shuffle(&mut rng);
        Self {
            draw_pile,
            discard: Vec::new(),
            rng,
        }
    }

    /// Pop the top card of the draw pile, refilling from the discard pile
    /// if the draw pile is empty.
    pub fn draw(&mut self) -> Result<Card, DeckError> {
        if self.draw_pile.is_empty() {
            self.refill_from_discard();
        }
        self.draw_pile.pop().ok_or(DeckError::Exhausted)
    }

    /// Place a card on the discard pile. The caller resolves wild-class
    /// colors first; the pile never holds a sentinel-colored card.
    pub fn place(&mut self, card: Card) {
        debug_assert!(card.color.is_real());
        self.discard.push(card);
    }

    /// The active top card, if the discard has been seeded.
    pub fn discard_top(&self) -> Option<Card> {
        self.discard.last().copied()
    }

    /// Seed the discard pile with the opening card.
    ///
    /// Wild and action cards are not allowed to open the game: a rejected
    /// card goes back into the draw pile, which is reshuffled, and another
    /// is drawn until a plain number card comes up.
    pub fn flip_opening_card(&mut self) -> Result<Card, DeckError> {
        loop {
            let card = self.draw()?;
            if card.rank.is_number() {
                self.place(card);
                return Ok(card);
            }
            self.draw_pile.push(card);
            self.draw_pile.shuffle(&mut self.rng);
        }
    }

    /// One bounded refill pass: everything but the discard top moves back
    /// into the draw pile (wild-class colors reverted) and is reshuffled.
    fn refill_from_discard(&mut self) {
        if self.discard.len() <= 1 {
            return;
        }
        let top = self.discard.pop().expect("checked non-empty");
        self.draw_pile.extend(self.discard.drain(..).map(Card::unresolved));
        self.discard.push(top);
        self.draw_pile.shuffle(&mut self.rng);
    }

    /// Cards remaining in the draw pile.
    pub fn draw_pile_len(&self) -> usize {
        self.draw_pile.len()
    }

    /// Cards that could still be drawn: the draw pile plus everything the
    /// discard pile would give up in a refill (all but its top).
    pub fn cards_available(&self) -> usize {
        self.draw_pile.len() + self.discard.len().saturating_sub(1)
    }

    /// Cards in the discard pile, counting the top.
    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{Color, Rank};
    use rand::SeedableRng;
    use proptest::prelude::*;

    fn deck(seed: u64) -> Deck {
        Deck::standard(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_standard_deck_has_108_cards() {
        let d = deck(1);
        assert_eq!(d.draw_pile_len(), 108);
        assert_eq!(d.discard_len(), 0);
    }

    #[test]
    fn test_draw_reduces_pile() {
        let mut d = deck(2);
        let card = d.draw().unwrap();
        assert_eq!(d.draw_pile_len(), 107);
        assert!(standard_set().contains(&card));
    }

    #[test]
    fn test_opening_card_is_plain_number() {
        for seed in 0..20 {
            let mut d = deck(seed);
            let opening = d.flip_opening_card().unwrap();
            assert!(opening.rank.is_number(), "seed {}: got {}", seed, opening);
            assert!(opening.color.is_real());
            assert_eq!(d.discard_top(), Some(opening));
            assert_eq!(d.draw_pile_len() + d.discard_len(), 108);
        }
    }

    #[test]
    fn test_refill_keeps_discard_top() {
        let mut d = deck(3);
        d.flip_opening_card().unwrap();

        // Drain the draw pile into a hand, discarding a few along the way.
        let mut hand = Vec::new();
        while d.draw_pile_len() > 0 {
            hand.push(d.draw().unwrap());
        }
        for card in hand.drain(..20) {
            d.place(if card.is_wild_class() { card.with_color(Color::Red) } else { card });
        }
        let top_before = d.discard_top().unwrap();

        // Next draw triggers the refill; the top must survive it.
        let drawn = d.draw().unwrap();
        assert_eq!(d.discard_top(), Some(top_before));
        assert_eq!(d.discard_len(), 1);
        // 108 = draw pile + discard top + hand + the card just drawn.
        assert_eq!(d.draw_pile_len() + d.discard_len() + hand.len() + 1, 108);
        let _ = drawn;
    }

    #[test]
    fn test_refill_reverts_wild_colors() {
        let mut d = Deck {
            draw_pile: Vec::new(),
            discard: vec![
                Card::new(Color::Green, Rank::Wild),
                Card::new(Color::Red, Rank::Five),
            ],
            rng: StdRng::seed_from_u64(4),
        };

        let recycled = d.draw().unwrap();
        assert_eq!(recycled, Card::new(Color::Wild, Rank::Wild));
        assert_eq!(d.discard_top(), Some(Card::new(Color::Red, Rank::Five)));
    }

    #[test]
    fn test_exhausted_when_both_piles_empty() {
        let mut d = Deck {
            draw_pile: Vec::new(),
            discard: vec![Card::new(Color::Red, Rank::Five)],
            rng: StdRng::seed_from_u64(5),
        };

        // The lone discard top is never recycled.
        assert_eq!(d.draw(), Err(DeckError::Exhausted));
        assert_eq!(d.discard_top(), Some(Card::new(Color::Red, Rank::Five)));
    }

    proptest! {
        /// Any draw/discard interleaving conserves all 108 cards.
        #[test]
        fn prop_card_conservation(seed in 0u64..1000, ops in prop::collection::vec(any::<bool>(), 0..400)) {
            let mut d = deck(seed);
            d.flip_opening_card().unwrap();
            let mut hand: Vec<Card> = Vec::new();

            for draw_op in ops {
                if draw_op || hand.is_empty() {
                    match d.draw() {
                        Ok(card) => hand.push(card),
                        // Only reachable when the hand holds everything
                        // except the discard top.
                        Err(DeckError::Exhausted) => {
                            prop_assert_eq!(hand.len(), 107);
                        }
                    }
                } else {
                    let card = hand.pop().unwrap();
                    d.place(if card.is_wild_class() { card.with_color(Color::Red) } else { card });
                }
                prop_assert_eq!(d.draw_pile_len() + d.discard_len() + hand.len(), 108);
            }
        }
    }
}
