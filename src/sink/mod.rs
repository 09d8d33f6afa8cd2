//! Match result sinks
//!
//! When a game ends, the winner and loser are handed off exactly once to a
//! result sink (persistence, leaderboard feed, log). Delivery is
//! fire-and-forget: the score transition never waits for it and never
//! fails because of it.

pub mod error;
pub mod file;
pub mod notifier;

pub use error::SinkError;
pub use file::{JsonLinesSink, LogSink};
pub use notifier::{
    spawn_result_worker, spawn_result_worker_until, MatchResult, ResultNotifier, ResultSink,
};
