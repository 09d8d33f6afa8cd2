//! Shared handle to the active session

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::game::{GameSession, GameState, GameStateSnapshot, Phase, ScoreError};

/// Clonable handle to one game session
///
/// Every operation locks the session for its whole duration and returns a
/// snapshot taken under the same lock.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: u64,
    session: Arc<Mutex<GameSession>>,
}

impl SessionHandle {
    pub(super) fn new(id: u64, session: GameSession) -> Self {
        Self {
            id,
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Registry-assigned session ID
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Award a rally to player slot 1 or 2
    pub async fn increment(&self, slot: u8) -> Result<GameStateSnapshot, ScoreError> {
        let mut session = self.session.lock().await;
        let state = session.increment_slot(slot)?;
        Ok(state.to_snapshot())
    }

    /// Remove the last rally
    pub async fn undo(&self) -> Result<GameStateSnapshot, ScoreError> {
        let mut session = self.session.lock().await;
        let state = session.undo()?;
        Ok(state.to_snapshot())
    }

    /// Reset to 0-0
    pub async fn restart(&self) -> GameStateSnapshot {
        let mut session = self.session.lock().await;
        session.restart().to_snapshot()
    }

    /// Name of the leading player
    pub async fn winner(&self) -> String {
        self.session.lock().await.winner().to_string()
    }

    /// Swap in a validated state
    pub async fn replace(&self, state: GameState) {
        self.session.lock().await.replace(state);
    }

    /// Record the post-game choice
    pub async fn set_end_game_choice(&self, choice: Option<String>) -> GameStateSnapshot {
        let mut session = self.session.lock().await;
        session.set_end_game_choice(choice);
        session.snapshot()
    }

    /// Current state
    pub async fn snapshot(&self) -> GameStateSnapshot {
        self.session.lock().await.snapshot()
    }

    /// Current phase
    pub async fn phase(&self) -> Phase {
        self.session.lock().await.phase()
    }
}
