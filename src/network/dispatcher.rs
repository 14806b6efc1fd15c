//! Command Dispatcher
//!
//! Maps a decoded [`Command`] to an engine call under the single table
//! lock and turns the outcome into a wire [`Reply`]. Every engine call,
//! including the read-only state projection, runs under the same lock, so
//! no client ever observes a partially-applied turn. Commands serialize in
//! lock-acquisition order; only in-memory work happens while it is held.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::game::table::GameTable;
use crate::network::protocol::{Command, Reply};

/// Shared handle executing commands against the one game table.
///
/// Cheap to clone; every connection worker holds one.
#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<Mutex<GameTable>>,
}

impl Dispatcher {
    /// Wrap the process-wide table.
    pub fn new(table: GameTable) -> Self {
        Self {
            table: Arc::new(Mutex::new(table)),
        }
    }

    /// Decode and execute one raw request line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(command) => self.execute(command).await,
            Err(err) => {
                debug!(%line, %err, "rejected malformed command");
                Reply::error(err.to_string())
            }
        }
    }

    /// Execute one decoded command.
    ///
    /// Successful commands answer with the caller's fresh state projection,
    /// taken under the same lock hold as the mutation itself.
    pub async fn execute(&self, command: Command) -> Reply {
        let player = command.player().clone();
        let mut table = self.table.lock().await;

        let result = match &command {
            Command::Join { player } => table.join(player.clone()),
            Command::Play { player, index, color } => table.play(player, *index, *color),
            Command::Draw { player } => table.draw(player),
            Command::DeclareUno { player } => table.declare_uno(player),
            Command::CallOut { player, target } => table.call_out(player, target),
            Command::GetState { .. } => Ok(()),
        };

        match result {
            Ok(()) => match table.state_for(&player) {
                Ok(view) => Reply::ok(view),
                Err(err) => Reply::error(err.to_string()),
            },
            Err(err) => {
                debug!(player = %player, %err, "rule violation");
                Reply::error(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::table::{GameTable, TableConfig};

    fn dispatcher() -> Dispatcher {
        let table = GameTable::new(TableConfig {
            rng_seed: Some(11),
            ..TableConfig::default()
        })
        .unwrap();
        Dispatcher::new(table)
    }

    fn json(reply: &Reply) -> String {
        reply.to_json().unwrap()
    }

    #[tokio::test]
    async fn test_join_then_get_state() {
        let dispatcher = dispatcher();

        let reply = dispatcher.handle_line("join alice").await;
        let body = json(&reply);
        assert!(body.contains("\"status\":\"OK\""));
        assert!(body.contains("\"your_turn\":true"));

        let reply = dispatcher.handle_line("get_state alice").await;
        assert!(json(&reply).contains("\"status\":\"OK\""));
    }

    #[tokio::test]
    async fn test_rule_violation_becomes_error_reply() {
        let dispatcher = dispatcher();
        dispatcher.handle_line("join alice").await;
        dispatcher.handle_line("join bob").await;

        let reply = dispatcher.handle_line("draw bob").await;
        let body = json(&reply);
        assert!(body.contains("\"status\":\"ERROR\""));
        assert!(body.contains("not your turn"));
    }

    #[tokio::test]
    async fn test_malformed_command_becomes_error_reply() {
        let dispatcher = dispatcher();

        let reply = dispatcher.handle_line("shout alice").await;
        assert!(json(&reply).contains("unknown command"));

        let reply = dispatcher.handle_line("play alice five").await;
        assert!(json(&reply).contains("invalid card index"));
    }

    #[tokio::test]
    async fn test_state_for_unknown_player_is_error() {
        let dispatcher = dispatcher();

        let reply = dispatcher.handle_line("get_state ghost").await;
        let body = json(&reply);
        assert!(body.contains("\"status\":\"ERROR\""));
        assert!(body.contains("player not found"));
    }

    #[tokio::test]
    async fn test_concurrent_commands_serialize() {
        let dispatcher = dispatcher();

        let mut handles = Vec::new();
        for name in ["alice", "bob", "carol", "dave"] {
            let d = dispatcher.clone();
            handles.push(tokio::spawn(async move {
                d.handle_line(&format!("join {}", name)).await
            }));
        }
        for handle in handles {
            let reply = handle.await.unwrap();
            assert!(json(&reply).contains("\"status\":\"OK\""));
        }

        // All four were seated exactly once, whatever the lock order was.
        let reply = dispatcher.handle_line("get_state alice").await;
        let body = json(&reply);
        for name in ["alice", "bob", "carol", "dave"] {
            assert!(body.contains(name));
        }
        assert!(body.contains("\"count\":7"));
    }
}
