//! Scoring error types
//!
//! Rejections raised by the score state machine and by snapshot validation.
//! A rejected call leaves the session untouched.

use super::state::Phase;

/// Error type for score transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// Player slot outside {1, 2}
    InvalidPlayer(u8),
    /// Undo requested with only the initial entry left
    NoHistoryToUndo,
    /// Max score must be positive
    InvalidMaxScore,
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::InvalidPlayer(value) => {
                write!(f, "Invalid player: {} (expected 1 or 2)", value)
            }
            ScoreError::NoHistoryToUndo => write!(f, "Cannot undo: no prior rally"),
            ScoreError::InvalidMaxScore => write!(f, "Max score must be at least 1"),
        }
    }
}

impl std::error::Error for ScoreError {}

/// Error type for snapshot validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// One of the histories is empty
    EmptyHistory,
    /// Histories differ in length
    LengthMismatch {
        p1: usize,
        p2: usize,
        serving: usize,
    },
    /// A score history does not start at zero
    NonZeroStart { p1: u32, p2: u32 },
    /// Rally at `index` is not exactly one point for one side
    InvalidDelta { index: usize },
    /// Max score must be positive
    InvalidMaxScore,
    /// Rally at `index` was played after the game was already won
    RallyAfterWin { index: usize },
    /// Phase does not agree with the final score
    PhaseMismatch { phase: Phase, expected: Phase },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::EmptyHistory => write!(f, "Snapshot history is empty"),
            SnapshotError::LengthMismatch { p1, p2, serving } => write!(
                f,
                "Snapshot history lengths differ: p1={}, p2={}, serving={}",
                p1, p2, serving
            ),
            SnapshotError::NonZeroStart { p1, p2 } => {
                write!(f, "Snapshot scores must start at 0-0, got {}-{}", p1, p2)
            }
            SnapshotError::InvalidDelta { index } => {
                write!(f, "Snapshot rally {} is not a single point", index)
            }
            SnapshotError::InvalidMaxScore => write!(f, "Snapshot max score must be positive"),
            SnapshotError::RallyAfterWin { index } => {
                write!(f, "Snapshot rally {} was played after the game was won", index)
            }
            SnapshotError::PhaseMismatch { phase, expected } => write!(
                f,
                "Snapshot phase {:?} does not match the score (expected {:?})",
                phase, expected
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}
