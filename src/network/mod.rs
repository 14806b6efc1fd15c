//! Network Layer
//!
//! One-command-per-connection TCP front end for the shared table.
//! This layer is **non-deterministic** - all game rules live in `game/`.

pub mod protocol;
pub mod dispatcher;
pub mod server;

pub use protocol::{Command, CommandError, Reply};
pub use dispatcher::Dispatcher;
pub use server::{GameServer, ServeError, ServerConfig};
