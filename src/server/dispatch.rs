//! Command dispatch
//!
//! Maps wire commands onto registry and session operations. Rejected
//! commands become `Reply::Error` and leave the session unchanged.
//!
//! Successful mutations are published on a broadcast channel. Applying a
//! mutation and publishing its reply happen under one lock, so every
//! subscriber sees updates in the order they were applied.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{broadcast, Mutex};

use crate::error::Result;
use crate::game::{Player, ScoreError, ServeIntervals, SessionConfig};
use crate::registry::SessionRegistry;

use super::config::ServerConfig;
use super::protocol::{Command, Reply};

/// Where a reply frame has to go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Published to every subscriber, the sender included
    Broadcast { receivers: usize },
    /// Only for the client that sent the command
    Direct(Bytes),
}

/// Executes commands against a registry
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    serve_intervals: ServeIntervals,
    updates: broadcast::Sender<Bytes>,
    order: Mutex<()>,
}

impl Dispatcher {
    /// Create a dispatcher with default server settings
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self::from_config(registry, &ServerConfig::default())
    }

    /// Create a dispatcher using the serve intervals and broadcast
    /// capacity of `config`
    pub fn from_config(registry: Arc<SessionRegistry>, config: &ServerConfig) -> Self {
        let (updates, _) = broadcast::channel(config.broadcast_capacity);

        Self {
            registry,
            serve_intervals: config.serve_intervals.clone(),
            updates,
            order: Mutex::new(()),
        }
    }

    /// The registry commands run against
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Subscribe to updates, together with the state they start from
    ///
    /// No update is published between taking the state and subscribing, so
    /// the first frame received is always newer than the returned state.
    pub async fn subscribe(&self) -> (broadcast::Receiver<Bytes>, Option<Reply>) {
        let _order = self.order.lock().await;
        let rx = self.updates.subscribe();
        (rx, self.current_state().await)
    }

    /// Run one command and route its reply
    ///
    /// Successful mutations are broadcast; queries and errors go back to
    /// the sender only.
    pub async fn submit(&self, command: Command) -> Result<Delivery> {
        if !command.is_mutation() {
            let reply = self.handle(command).await;
            return Ok(Delivery::Direct(reply.to_frame()?));
        }

        let _order = self.order.lock().await;
        let reply = self.handle(command).await;
        let frame = reply.to_frame()?;
        if reply.is_error() {
            return Ok(Delivery::Direct(frame));
        }

        let receivers = self.updates.send(frame).unwrap_or(0);
        tracing::trace!(receivers = receivers, "Update broadcast");
        Ok(Delivery::Broadcast { receivers })
    }

    /// Run one command and build the reply
    pub async fn handle(&self, command: Command) -> Reply {
        let kind = command_name(&command);

        match self.execute(command).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(command = kind, error = %e, "Command rejected");
                Reply::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Current state, if a session is active
    pub async fn current_state(&self) -> Option<Reply> {
        let handle = self.registry.get().await.ok()?;
        Some(Reply::GameState {
            state: handle.snapshot().await,
        })
    }

    async fn execute(&self, command: Command) -> Result<Reply> {
        let reply = match command {
            Command::CreateGame {
                p1_name,
                p2_name,
                max_score,
                serving,
            } => {
                if max_score == 0 {
                    return Err(ScoreError::InvalidMaxScore.into());
                }
                let server = Player::try_from(serving)?;
                let config = SessionConfig::new(p1_name, p2_name)
                    .max_score(max_score)
                    .initial_server(server)
                    .serve_intervals(self.serve_intervals.clone());
                let handle = self.registry.create(config).await;
                Reply::GameState {
                    state: handle.snapshot().await,
                }
            }
            Command::IncrementScore { player } => {
                let handle = self.registry.get().await?;
                Reply::GameState {
                    state: handle.increment(player).await?,
                }
            }
            Command::Undo => {
                let handle = self.registry.get().await?;
                Reply::GameState {
                    state: handle.undo().await?,
                }
            }
            Command::Restart => {
                let handle = self.registry.get().await?;
                Reply::GameState {
                    state: handle.restart().await,
                }
            }
            Command::GetWinner => {
                let handle = self.registry.get().await?;
                Reply::Winner {
                    name: handle.winner().await,
                }
            }
            Command::SetGameState { state } => {
                let validated = state.validate()?;
                let handle = self.registry.get().await?;
                handle.replace(validated).await;
                Reply::GameState {
                    state: handle.snapshot().await,
                }
            }
            Command::SetEndGameChoice { choice } => {
                let handle = self.registry.get().await?;
                Reply::GameState {
                    state: handle.set_end_game_choice(choice).await,
                }
            }
            Command::GetGameState => {
                let handle = self.registry.get().await?;
                Reply::GameState {
                    state: handle.snapshot().await,
                }
            }
            Command::EndGame => {
                self.registry.end().await?;
                Reply::GameEnded
            }
        };

        Ok(reply)
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::CreateGame { .. } => "createGame",
        Command::IncrementScore { .. } => "incrementScore",
        Command::Undo => "undo",
        Command::Restart => "restart",
        Command::GetWinner => "getWinner",
        Command::SetGameState { .. } => "setGameState",
        Command::SetEndGameChoice { .. } => "setEndGameChoice",
        Command::GetGameState => "getGameState",
        Command::EndGame => "endGame",
    }
}
