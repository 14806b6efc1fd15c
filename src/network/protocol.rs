//! Protocol Messages
//!
//! Wire format for the one-command-per-connection exchange. Requests are a
//! single UTF-8 text line, space-separated: `<verb> <player_id> [args...]`.
//! Replies are one JSON object. Commands are decoded exactly once, here,
//! into a closed [`Command`] enum; the engine never re-parses text.

use serde::Serialize;

use crate::game::card::Color;
use crate::game::player::PlayerId;
use crate::game::table::TableView;

// =============================================================================
// CLIENT -> SERVER COMMANDS
// =============================================================================

/// A malformed command line. Nothing reaches the engine when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Empty request line.
    #[error("empty command")]
    Empty,

    /// Verb not in the protocol.
    #[error("unknown command: {0}")]
    UnknownVerb(String),

    /// A required field is missing.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// Card index field is not a non-negative integer.
    #[error("invalid card index: {0}")]
    InvalidIndex(String),

    /// Color field is not one of the four real colors.
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// A decoded client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Join the table (idempotent).
    Join {
        /// Joining player.
        player: PlayerId,
    },

    /// Play the card at `index`, with a chosen color for wild-class cards.
    Play {
        /// Acting player.
        player: PlayerId,
        /// Hand index of the card to play.
        index: usize,
        /// Chosen color, required for wild-class cards.
        color: Option<Color>,
    },

    /// Draw one card and end the turn.
    Draw {
        /// Acting player.
        player: PlayerId,
    },

    /// Declare UNO.
    DeclareUno {
        /// Declaring player.
        player: PlayerId,
    },

    /// Call out another player for an undeclared single card.
    CallOut {
        /// Calling player.
        player: PlayerId,
        /// Accused player.
        target: PlayerId,
    },

    /// Fetch the current state projection.
    GetState {
        /// Requesting player.
        player: PlayerId,
    },
}

impl Command {
    /// Decode one request line. The verb is case-insensitive; trailing
    /// fields beyond what the verb needs are ignored.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        fn next_player<'a>(
            parts: &mut impl Iterator<Item = &'a str>,
            field: &'static str,
        ) -> Result<PlayerId, CommandError> {
            parts
                .next()
                .map(PlayerId::new)
                .ok_or(CommandError::MissingArgument(field))
        }

        let mut parts = line.split_whitespace();
        let verb = parts.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();

        match verb.as_str() {
            "join" => Ok(Command::Join { player: next_player(&mut parts, "player id")? }),
            "play" => {
                let player = next_player(&mut parts, "player id")?;
                let raw_index = parts.next().ok_or(CommandError::MissingArgument("card index"))?;
                let index = raw_index
                    .parse::<usize>()
                    .map_err(|_| CommandError::InvalidIndex(raw_index.to_string()))?;
                let color = match parts.next() {
                    Some(name) => Some(
                        Color::from_name(name)
                            .ok_or_else(|| CommandError::InvalidColor(name.to_string()))?,
                    ),
                    None => None,
                };
                Ok(Command::Play { player, index, color })
            }
            "draw" => Ok(Command::Draw { player: next_player(&mut parts, "player id")? }),
            "uno" => Ok(Command::DeclareUno { player: next_player(&mut parts, "player id")? }),
            "callout" => {
                let player = next_player(&mut parts, "player id")?;
                let target = next_player(&mut parts, "target player id")?;
                Ok(Command::CallOut { player, target })
            }
            "get_state" => Ok(Command::GetState { player: next_player(&mut parts, "player id")? }),
            other => Err(CommandError::UnknownVerb(other.to_string())),
        }
    }

    /// The player issuing this command.
    pub fn player(&self) -> &PlayerId {
        match self {
            Command::Join { player }
            | Command::Play { player, .. }
            | Command::Draw { player }
            | Command::DeclareUno { player }
            | Command::CallOut { player, .. }
            | Command::GetState { player } => player,
        }
    }
}

// =============================================================================
// SERVER -> CLIENT REPLY
// =============================================================================

/// The one JSON object sent back per connection.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum Reply {
    /// Successful command: the caller's full state projection.
    #[serde(rename = "OK")]
    Ok(TableView),

    /// Rejected command: human-readable reason, state untouched.
    #[serde(rename = "ERROR")]
    Error {
        /// What went wrong.
        message: String,
    },
}

impl Reply {
    /// Successful reply carrying the state projection.
    pub fn ok(view: TableView) -> Self {
        Reply::Ok(view)
    }

    /// Error reply with a human-readable message.
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error { message: message.into() }
    }

    /// Serialize to the wire JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
