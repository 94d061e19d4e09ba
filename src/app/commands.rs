//! Inbound commands to the game core.
//!
//! These represent actions requested by the outside world (player clients,
//! the tick loop) that the [`GameService`](super::service::GameService)
//! validates and applies. The serde attributes keep the wire shape stable:
//! a tagged object like `{"type": "RUN_SURVEY", "animal_type": "ZEBRA"}`.

use serde::{Deserialize, Serialize};

use crate::solver::Animal;

/// Commands the processor accepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    /// Reset everything and start a fresh game anchored at the given center.
    /// Valid in any status.
    NewGame { center_lat: f64, center_lon: f64 },

    /// Add the sector the player is standing in to the selection.
    AddSector { lat: f64, lon: f64 },

    /// Remove the sector the player is standing in from the selection.
    RemoveSector { lat: f64, lon: f64 },

    /// Consume the selection as a survey of one animal type.
    RunSurvey { animal_type: Animal },

    /// Guess the whole board, sector by sector.
    SubmitGuess { guess: Vec<Animal> },

    /// Countdown heartbeat. Touches storage only to apply expiry.
    Tick,
}

impl Command {
    /// Short label for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Command::NewGame { .. } => "NEW_GAME",
            Command::AddSector { .. } => "ADD_SECTOR",
            Command::RemoveSector { .. } => "REMOVE_SECTOR",
            Command::RunSurvey { .. } => "RUN_SURVEY",
            Command::SubmitGuess { .. } => "SUBMIT_GUESS",
            Command::Tick => "TICK",
        }
    }
}

/// A command plus its optional client-supplied idempotency token.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub command: Command,
    /// At-most-once marker: a repeated token is a silent success.
    pub token: Option<String>,
}

impl CommandRequest {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            token: None,
        }
    }

    pub fn with_token(command: Command, token: impl Into<String>) -> Self {
        Self {
            command,
            token: Some(token.into()),
        }
    }
}
