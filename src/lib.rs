//! # UNO Table Server
//!
//! Rule-enforcing UNO game engine shared by remote players through a
//! request/response command interface.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    UNO TABLE SERVER                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Game rules (deterministic)                │
//! │  ├── card.rs     - Card values, composition, legality        │
//! │  ├── deck.rs     - Draw pile + discard recycling             │
//! │  ├── player.rs   - Hands and UNO declaration flags           │
//! │  └── table.rs    - The shared turn/state machine             │
//! │                                                              │
//! │  network/        - Transport (non-deterministic)             │
//! │  ├── protocol.rs - Command decoding, JSON replies            │
//! │  ├── dispatcher.rs - Engine calls under the one table lock   │
//! │  └── server.rs   - TCP accept loop, bounded worker pool      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency Discipline
//!
//! Exactly one `GameTable` exists per process, guarded by a single mutex.
//! Every engine call - including the read-only state projection - runs
//! under that lock, so no client ever observes a partially-applied turn.
//! Connections are stateless: one command, one JSON reply, close.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod game;
pub mod network;

// Re-export commonly used types
pub use game::card::{Card, Color, Rank};
pub use game::player::PlayerId;
pub use game::table::{GameTable, RuleError, TableConfig, TableView};
pub use network::dispatcher::Dispatcher;
pub use network::server::{GameServer, ServerConfig};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Total cards at the table at all times.
pub const DECK_SIZE: usize = 108;

/// Cards dealt to each player on join.
pub const INITIAL_HAND_SIZE: usize = 7;
