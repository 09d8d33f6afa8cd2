//! Rally-point scoring
//!
//! This module provides:
//! - Session configuration and the serve interval table
//! - Game state with its wire snapshot and validation
//! - Win and serve rotation rules
//! - The score-serve state machine

pub mod config;
pub mod error;
pub mod rules;
pub mod session;
pub mod state;

pub use config::{ServeIntervals, SessionConfig};
pub use error::{ScoreError, SnapshotError};
pub use rules::{ServeDecision, ServeReason};
pub use session::GameSession;
pub use state::{GameState, GameStateSnapshot, Phase, Player};
