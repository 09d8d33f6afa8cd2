//! Result sink error types

/// Error type for result sink deliveries
///
/// Only ever logged; a failed delivery never affects the score.
#[derive(Debug)]
pub enum SinkError {
    /// Underlying storage failed
    Io(std::io::Error),
    /// Result could not be encoded
    Encode(serde_json::Error),
    /// Result channel has no receiver
    Closed,
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "Result sink I/O error: {}", e),
            SinkError::Encode(e) => write!(f, "Result encode error: {}", e),
            SinkError::Closed => write!(f, "Result sink closed"),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Io(e) => Some(e),
            SinkError::Encode(e) => Some(e),
            SinkError::Closed => None,
        }
    }
}

impl From<std::io::Error> for SinkError {
    fn from(e: std::io::Error) -> Self {
        SinkError::Io(e)
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(e: serde_json::Error) -> Self {
        SinkError::Encode(e)
    }
}
