//! The Game Table
//!
//! The turn/state machine for the single shared UNO table: joining, playing,
//! drawing, UNO declaration and call-out, and the per-player state
//! projection. All rule checks happen before any mutation, so a rejected
//! command is always an atomic no-op.
//!
//! Uses BTree collections for deterministic iteration order.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::game::card::{Card, Color, Rank};
use crate::game::deck::{Deck, DeckError};
use crate::game::player::{Player, PlayerId};

// =============================================================================
// ERRORS
// =============================================================================

/// A rejected command. The table state is untouched whenever one of these
/// is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The acting player has not joined the table.
    #[error("player not found")]
    PlayerNotFound,

    /// It is another player's turn.
    #[error("it's not your turn")]
    NotYourTurn,

    /// The card index does not point into the player's hand.
    #[error("invalid card index {index}")]
    InvalidCardIndex {
        /// The rejected index.
        index: usize,
    },

    /// The chosen card matches neither color nor rank of the discard top.
    #[error("that card cannot be played")]
    CardDoesNotMatch,

    /// A wild-class card was played without choosing a real color.
    #[error("playing a wild card requires choosing a color")]
    ColorRequired,

    /// Strict rule: Wild Draw Four refused while another card is playable.
    #[error("wild draw four cannot be played while another card is playable")]
    WildDrawFourRefused,

    /// The game has a winner; no further moves are accepted.
    #[error("the game has already ended")]
    GameFinished,

    /// Deck failure while drawing.
    #[error(transparent)]
    Deck(#[from] DeckError),
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Table rule configuration.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// Cards dealt to each joining player.
    pub initial_hand_size: usize,
    /// When set, Wild Draw Four is only legal if no other held card could
    /// be played on the discard top.
    pub strict_wild_draw_four: bool,
    /// Seed for the deck RNG. `None` seeds from entropy; tests pin it.
    pub rng_seed: Option<u64>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_hand_size: crate::INITIAL_HAND_SIZE,
            strict_wild_draw_four: false,
            rng_seed: None,
        }
    }
}

// =============================================================================
// STATE PROJECTION
// =============================================================================

/// Public per-player status: hand count and call-out vulnerability, never
/// the cards themselves.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStatus {
    /// Cards held.
    pub count: usize,
    /// Exposed and undeclared: holding one card without having said UNO.
    pub on_uno: bool,
}

/// Read-only snapshot of the table from one player's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    /// The caller's full hand, in index order.
    pub hand: Vec<Card>,
    /// The discard top (wild colors resolved).
    pub top_card: Card,
    /// Whether the caller acts next.
    pub your_turn: bool,
    /// Whose turn it is.
    pub current_turn: Option<PlayerId>,
    /// The winner, once the game is finished.
    pub winner: Option<PlayerId>,
    /// Everyone's public status.
    pub player_statuses: BTreeMap<PlayerId, PlayerStatus>,
    /// Human-readable summary of the last action.
    pub last_message: String,
}

// =============================================================================
// GAME TABLE
// =============================================================================

/// The single shared game table.
///
/// Owned by the server process and handed by reference to every connection
/// worker; one table per process, alive until process exit.
#[derive(Debug)]
pub struct GameTable {
    config: TableConfig,
    deck: Deck,
    players: BTreeMap<PlayerId, Player>,
    turn_order: Vec<PlayerId>,
    current_index: usize,
    direction: i32,
    winner: Option<PlayerId>,
    exposed: BTreeSet<PlayerId>,
    last_message: String,
}

impl GameTable {
    /// Create the table: shuffled deck, discard seeded with a plain number
    /// card before any player acts.
    pub fn new(config: TableConfig) -> Result<Self, DeckError> {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut deck = Deck::standard(rng);
        let opening = deck.flip_opening_card()?;
        info!("table opened with {} on the discard pile", opening);

        Ok(Self {
            config,
            deck,
            players: BTreeMap::new(),
            turn_order: Vec::new(),
            current_index: 0,
            direction: 1,
            winner: None,
            exposed: BTreeSet::new(),
            last_message: String::new(),
        })
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Seat a player. Idempotent: a known id is a no-op.
    pub fn join(&mut self, id: PlayerId) -> Result<(), RuleError> {
        self.ensure_in_progress()?;
        if self.players.contains_key(&id) {
            return Ok(());
        }
        // Checked up front so a failed deal never strands cards.
        if self.deck.cards_available() < self.config.initial_hand_size {
            return Err(RuleError::Deck(DeckError::Exhausted));
        }

        let mut player = Player::new(id.clone());
        player.draw_from(&mut self.deck, self.config.initial_hand_size)?;
        self.players.insert(id.clone(), player);
        self.turn_order.push(id.clone());
        self.update_exposure(&id);
        self.last_message = format!("{} has joined the game.", id);
        info!(player = %id, "player joined");
        Ok(())
    }

    /// Play the card at `index` from `id`'s hand onto the discard pile.
    ///
    /// Wild-class cards require `chosen_color`. All preconditions are
    /// checked before the hand or pile is touched.
    pub fn play(
        &mut self,
        id: &PlayerId,
        index: usize,
        chosen_color: Option<Color>,
    ) -> Result<(), RuleError> {
        self.ensure_in_progress()?;
        let player = self.players.get(id).ok_or(RuleError::PlayerNotFound)?;
        self.ensure_current(id)?;

        let card = player.card_at(index).ok_or(RuleError::InvalidCardIndex { index })?;
        let top = self.top_card();
        if !card.matches(top) {
            return Err(RuleError::CardDoesNotMatch);
        }

        let resolved_color = if card.is_wild_class() {
            let color = chosen_color.filter(|c| c.is_real()).ok_or(RuleError::ColorRequired)?;
            if self.config.strict_wild_draw_four
                && card.rank == Rank::WildDrawFour
                && self.holds_other_playable(player, index, top)
            {
                return Err(RuleError::WildDrawFourRefused);
            }
            Some(color)
        } else {
            None
        };

        // Preconditions hold; from here on the move is committed.
        let player = self.players.get_mut(id).expect("looked up above");
        let removed = player.remove_card(index).expect("index validated above");
        let placed = match resolved_color {
            Some(color) => removed.with_color(color),
            None => removed,
        };
        let hand_empty = player.hand.is_empty();
        self.deck.place(placed);
        self.last_message = format!("{} played a {}.", id, removed);

        if hand_empty {
            self.winner = Some(id.clone());
            self.last_message = format!("{} wins the game!", id);
            info!(player = %id, "game over");
            return Ok(());
        }

        self.update_exposure(id);
        self.apply_effect(placed)?;
        Ok(())
    }

    /// Draw exactly one card. A draw always ends the turn.
    pub fn draw(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.ensure_in_progress()?;
        if !self.players.contains_key(id) {
            return Err(RuleError::PlayerNotFound);
        }
        self.ensure_current(id)?;

        let player = self.players.get_mut(id).expect("checked above");
        player.draw_from(&mut self.deck, 1)?;
        self.update_exposure(id);
        self.last_message = format!("{} drew a card.", id);
        self.advance(1);
        Ok(())
    }

    /// Declare UNO. Valid while the player holds exactly one card
    /// (idempotent); a false declaration costs one penalty card.
    pub fn declare_uno(&mut self, id: &PlayerId) -> Result<(), RuleError> {
        self.ensure_in_progress()?;
        if !self.players.contains_key(id) {
            return Err(RuleError::PlayerNotFound);
        }

        if self.exposed.contains(id) {
            let player = self.players.get_mut(id).expect("checked above");
            player.has_declared = true;
            self.last_message = format!("{} declared UNO!", id);
        } else {
            let player = self.players.get_mut(id).expect("checked above");
            player.draw_from(&mut self.deck, 1)?;
            self.update_exposure(id);
            self.last_message = format!("{} falsely declared UNO and drew a penalty card.", id);
        }
        Ok(())
    }

    /// Call out `target` for an undeclared single card. A correct call-out
    /// costs the target two cards; a false one costs the caller one.
    /// The turn pointer never moves either way.
    pub fn call_out(&mut self, caller: &PlayerId, target: &PlayerId) -> Result<(), RuleError> {
        self.ensure_in_progress()?;
        if !self.players.contains_key(caller) {
            return Err(RuleError::PlayerNotFound);
        }

        let target_vulnerable = self
            .players
            .get(target)
            .map(|p| self.exposed.contains(target) && !p.has_declared)
            .unwrap_or(false);

        if target_vulnerable {
            let player = self.players.get_mut(target).expect("vulnerable implies present");
            player.draw_from(&mut self.deck, 2)?;
            self.update_exposure(target);
            self.last_message =
                format!("{} called out {}! {} draws 2 cards.", caller, target, target);
        } else {
            let player = self.players.get_mut(caller).expect("checked above");
            player.draw_from(&mut self.deck, 1)?;
            self.update_exposure(caller);
            self.last_message = format!("{}'s call-out failed; {} draws a card.", caller, caller);
        }
        Ok(())
    }

    /// Read-only projection for one player. Works after the game finishes.
    pub fn state_for(&self, id: &PlayerId) -> Result<TableView, RuleError> {
        let player = self.players.get(id).ok_or(RuleError::PlayerNotFound)?;
        let current = self.current_player_id();

        let player_statuses = self
            .players
            .iter()
            .map(|(pid, p)| {
                let status = PlayerStatus {
                    count: p.hand_len(),
                    on_uno: self.exposed.contains(pid) && !p.has_declared,
                };
                (pid.clone(), status)
            })
            .collect();

        Ok(TableView {
            hand: player.hand.clone(),
            top_card: self.top_card(),
            your_turn: current == Some(id) && self.winner.is_none(),
            current_turn: current.cloned(),
            winner: self.winner.clone(),
            player_statuses,
            last_message: self.last_message.clone(),
        })
    }

    /// The winner, once set.
    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Whether `id` has joined.
    pub fn has_player(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_in_progress(&self) -> Result<(), RuleError> {
        if self.winner.is_some() {
            Err(RuleError::GameFinished)
        } else {
            Ok(())
        }
    }

    fn ensure_current(&self, id: &PlayerId) -> Result<(), RuleError> {
        if self.current_player_id() == Some(id) {
            Ok(())
        } else {
            Err(RuleError::NotYourTurn)
        }
    }

    fn current_player_id(&self) -> Option<&PlayerId> {
        self.turn_order.get(self.current_index)
    }

    fn top_card(&self) -> Card {
        self.deck
            .discard_top()
            .expect("discard pile is seeded at table construction")
    }

    /// Does the hand hold any card other than `played_index` that could be
    /// played on `top`?
    fn holds_other_playable(&self, player: &Player, played_index: usize, top: Card) -> bool {
        player
            .hand
            .iter()
            .enumerate()
            .any(|(i, c)| i != played_index && c.matches(top))
    }

    /// Recompute UNO exposure for `id`: exposed while holding exactly one
    /// card; leaving one card clears both exposure and the declaration.
    fn update_exposure(&mut self, id: &PlayerId) {
        let Some(player) = self.players.get_mut(id) else {
            return;
        };
        if player.holds_one() {
            self.exposed.insert(id.clone());
        } else {
            self.exposed.remove(id);
            player.has_declared = false;
        }
    }

    /// Advance the turn pointer by `steps` seats in the current direction.
    fn advance(&mut self, steps: i32) {
        let len = self.turn_order.len() as i32;
        if len == 0 {
            return;
        }
        let next = (self.current_index as i32 + self.direction * steps).rem_euclid(len);
        self.current_index = next as usize;
    }

    /// The player `offset` seats ahead in the current direction.
    fn player_ahead(&self, offset: i32) -> PlayerId {
        let len = self.turn_order.len() as i32;
        let idx = (self.current_index as i32 + self.direction * offset).rem_euclid(len);
        self.turn_order[idx as usize].clone()
    }

    /// Apply the placed card's special effect and advance the turn.
    /// `placed` already has its color resolved.
    fn apply_effect(&mut self, placed: Card) -> Result<(), RuleError> {
        match placed.rank {
            Rank::Skip => {
                let skipped = self.player_ahead(1);
                self.last_message.push_str(&format!(" {}'s turn is skipped.", skipped));
                self.advance(2);
            }
            Rank::Reverse => {
                if self.turn_order.len() == 2 {
                    self.last_message.push_str(" Direction reversed (acts as skip).");
                    self.advance(2);
                } else {
                    self.direction = -self.direction;
                    self.last_message.push_str(" Direction of play reversed.");
                    self.advance(1);
                }
            }
            Rank::DrawTwo => {
                let victim = self.player_ahead(1);
                self.penalty_draw(&victim, 2)?;
                self.last_message.push_str(&format!(" {} draws 2 cards.", victim));
                self.advance(2);
            }
            Rank::WildDrawFour => {
                let victim = self.player_ahead(1);
                self.penalty_draw(&victim, 4)?;
                self.last_message.push_str(&format!(
                    " Color changed to {}. {} draws 4 cards.",
                    placed.color, victim
                ));
                self.advance(2);
            }
            Rank::Wild => {
                self.last_message.push_str(&format!(" Color changed to {}.", placed.color));
                self.advance(1);
            }
            _ => {
                self.advance(1);
            }
        }
        Ok(())
    }

    fn penalty_draw(&mut self, id: &PlayerId, count: usize) -> Result<(), RuleError> {
        let player = self.players.get_mut(id).expect("turn order ids are seated");
        player.draw_from(&mut self.deck, count)?;
        self.update_exposure(id);
        Ok(())
    }

    #[cfg(test)]
    fn total_cards(&self) -> usize {
        self.deck.draw_pile_len()
            + self.deck.discard_len()
            + self.players.values().map(|p| p.hand_len()).sum::<usize>()
    }
}
