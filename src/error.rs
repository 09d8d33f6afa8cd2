//! Crate-level error type

use crate::game::{ScoreError, SnapshotError};
use crate::registry::RegistryError;
use crate::sink::SinkError;

/// Result type for fallible crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Any error surfaced by the crate
#[derive(Debug)]
pub enum Error {
    /// Score transition rejected
    Score(ScoreError),
    /// Replacement snapshot failed validation
    Snapshot(SnapshotError),
    /// Registry operation rejected
    Registry(RegistryError),
    /// Result sink failure
    Sink(SinkError),
    /// Malformed inbound message
    Protocol(serde_json::Error),
    /// Network or file I/O
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Score(e) => write!(f, "{}", e),
            Error::Snapshot(e) => write!(f, "Invalid game state: {}", e),
            Error::Registry(e) => write!(f, "{}", e),
            Error::Sink(e) => write!(f, "{}", e),
            Error::Protocol(e) => write!(f, "Malformed message: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Score(e) => Some(e),
            Error::Snapshot(e) => Some(e),
            Error::Registry(e) => Some(e),
            Error::Sink(e) => Some(e),
            Error::Protocol(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<ScoreError> for Error {
    fn from(e: ScoreError) -> Self {
        Error::Score(e)
    }
}

impl From<SnapshotError> for Error {
    fn from(e: SnapshotError) -> Self {
        Error::Snapshot(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<SinkError> for Error {
    fn from(e: SinkError) -> Self {
        Error::Sink(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Protocol(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
