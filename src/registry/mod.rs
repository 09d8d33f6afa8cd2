//! Session registry
//!
//! Holds at most one active game session. The registry is an ordinary
//! value: build it once at startup and share it by `Arc` with whatever
//! handles inbound events.
//!
//! # Architecture
//!
//! ```text
//!                    Arc<SessionRegistry>
//!               ┌──────────────────────────────┐
//!               │ active: RwLock<Option<       │
//!               │   SessionHandle {            │
//!               │     Arc<Mutex<GameSession>>  │
//!               │   }                          │
//!               │ >                            │
//!               │ notifier: ResultNotifier ────┼──► result worker ──► ResultSink
//!               └──────────────┬───────────────┘
//!                              │ get()
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!         [Connection]    [Connection]    [Connection]
//!         increment()     undo()          snapshot()
//! ```
//!
//! The per-session `Mutex` serializes events from concurrent connections,
//! so each score transition runs to completion before the next starts.

pub mod error;
pub mod handle;
pub mod store;

pub use error::RegistryError;
pub use handle::SessionHandle;
pub use store::SessionRegistry;
