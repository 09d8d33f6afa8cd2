//! Wire messages
//!
//! Line-delimited JSON. Each inbound line is one `Command`; each outbound
//! line is one `Reply`. Messages are tagged by a `"type"` field:
//!
//! ```text
//! -> {"type":"createGame","p1Name":"Ana","p2Name":"Ben","maxScore":11,"serving":1}
//! <- {"type":"gameState","state":{"p1Name":"Ana",...}}
//! -> {"type":"incrementScore","player":1}
//! -> {"type":"undo"}
//! <- {"type":"error","message":"Cannot undo: no prior rally"}
//! ```

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::game::config::DEFAULT_MAX_SCORE;
use crate::game::GameStateSnapshot;

fn default_max_score() -> u32 {
    DEFAULT_MAX_SCORE
}

fn default_serving() -> u8 {
    1
}

/// Inbound client command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    /// Start a new game, replacing any active one
    #[serde(rename_all = "camelCase")]
    CreateGame {
        p1_name: String,
        p2_name: String,
        #[serde(default = "default_max_score")]
        max_score: u32,
        #[serde(default = "default_serving")]
        serving: u8,
    },
    /// Award a rally to player 1 or 2
    IncrementScore { player: u8 },
    /// Remove the last rally
    Undo,
    /// Reset the game to 0-0
    Restart,
    /// Ask for the leading player's name
    GetWinner,
    /// Restore a full state (e.g. after reconnect)
    SetGameState { state: GameStateSnapshot },
    /// Record the post-game choice
    SetEndGameChoice { choice: Option<String> },
    /// Ask for the current state
    GetGameState,
    /// End the active game
    EndGame,
}

impl Command {
    /// Parse one inbound line
    pub fn parse(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }

    /// Whether the command changes the session
    ///
    /// Replies to mutating commands are fanned out to every client.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Command::GetWinner | Command::GetGameState)
    }
}

/// Outbound message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Reply {
    /// Current state of the active game
    GameState { state: GameStateSnapshot },
    /// Leading player's name
    Winner { name: String },
    /// The active game was ended
    GameEnded,
    /// The command was rejected; nothing changed
    Error { message: String },
}

impl Reply {
    /// Whether this reply reports a rejected command
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error { .. })
    }

    /// Encode as one newline-terminated frame
    pub fn to_frame(&self) -> Result<Bytes> {
        let mut buf = serde_json::to_vec(self)?;
        buf.push(b'\n');
        Ok(Bytes::from(buf))
    }
}
