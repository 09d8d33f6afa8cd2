//! Scoreboard transport
//!
//! A thin TCP front end over the session registry. Clients send one JSON
//! command per line; state changes are pushed to every connected client.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod listener;
pub mod protocol;

pub use config::ServerConfig;
pub use dispatch::{Delivery, Dispatcher};
pub use listener::ScoreServer;
pub use protocol::{Command, Reply};
