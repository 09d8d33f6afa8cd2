//! Live scoring for two-player rally-point matches
//!
//! Tracks the score of a badminton or table-tennis style match as an
//! append-only history of rallies and derives from it who serves next and
//! when the game is over.
//!
//! # Layout
//!
//! - [`game`]: the score-serve state machine and its rules
//! - [`registry`]: holder of the single active session
//! - [`sink`]: fire-and-forget delivery of finished match results
//! - [`server`]: line-delimited JSON transport that fans state out to clients
//!
//! # Example
//!
//! ```
//! use rally_score::game::{GameSession, Phase, Player, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::new("Ana", "Ben").max_score(11));
//! for _ in 0..11 {
//!     session.increment(Player::One);
//! }
//!
//! assert_eq!(session.phase(), Phase::Ended);
//! assert_eq!(session.winner(), "Ana");
//! ```

pub mod error;
pub mod game;
pub mod registry;
pub mod server;
pub mod sink;

pub use error::{Error, Result};
pub use game::{GameSession, GameState, GameStateSnapshot, Phase, Player, SessionConfig};
pub use registry::{SessionHandle, SessionRegistry};
pub use server::{ScoreServer, ServerConfig};
pub use sink::{MatchResult, ResultNotifier, ResultSink};
