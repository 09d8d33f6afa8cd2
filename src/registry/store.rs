//! Session registry implementation

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use super::error::RegistryError;
use super::handle::SessionHandle;
use crate::game::{GameSession, SessionConfig};
use crate::sink::ResultNotifier;

/// Registry holding zero or one active session
pub struct SessionRegistry {
    /// The active session, if any
    active: RwLock<Option<SessionHandle>>,

    /// Next session ID to hand out
    next_session_id: AtomicU64,

    /// Handed to every session created here
    notifier: ResultNotifier,
}

impl SessionRegistry {
    /// Create a registry whose sessions discard results
    pub fn new() -> Self {
        Self::with_notifier(ResultNotifier::disabled())
    }

    /// Create a registry whose sessions publish results through `notifier`
    pub fn with_notifier(notifier: ResultNotifier) -> Self {
        Self {
            active: RwLock::new(None),
            next_session_id: AtomicU64::new(1),
            notifier,
        }
    }

    /// Start a new session, dropping any previous one
    pub async fn create(&self, config: SessionConfig) -> SessionHandle {
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        let p1 = config.p1_name.clone();
        let p2 = config.p2_name.clone();
        let max_score = config.max_score;

        let handle = SessionHandle::new(
            id,
            GameSession::with_notifier(config, self.notifier.clone()),
        );

        let previous = self.active.write().await.replace(handle.clone());

        tracing::info!(
            session_id = id,
            replaced = ?previous.as_ref().map(SessionHandle::id),
            p1 = %p1,
            p2 = %p2,
            max_score = max_score,
            "Game session created"
        );

        handle
    }

    /// End the active session
    pub async fn end(&self) -> Result<SessionHandle, RegistryError> {
        let handle = self
            .active
            .write()
            .await
            .take()
            .ok_or(RegistryError::SessionNotFound)?;

        tracing::info!(session_id = handle.id(), "Game session ended");

        Ok(handle)
    }

    /// Get the active session
    pub async fn get(&self) -> Result<SessionHandle, RegistryError> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(RegistryError::SessionNotFound)
    }

    /// Whether a session is active
    pub async fn is_active(&self) -> bool {
        self.active.read().await.is_some()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
