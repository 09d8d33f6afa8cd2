//! Built-in result sinks

use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use super::error::SinkError;
use super::notifier::{MatchResult, ResultSink};

/// Sink that only logs results
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ResultSink for LogSink {
    async fn record_result(&self, result: &MatchResult) -> Result<(), SinkError> {
        tracing::info!(
            winner = %result.winner,
            loser = %result.loser,
            winner_score = result.winner_score,
            loser_score = result.loser_score,
            max_score = result.max_score,
            "Match finished"
        );
        Ok(())
    }
}

/// Sink that appends one JSON object per result to a file
#[derive(Debug, Clone)]
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    /// Create a sink writing to `path` (created on first result)
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File results are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for JsonLinesSink {
    async fn record_result(&self, result: &MatchResult) -> Result<(), SinkError> {
        let mut line = serde_json::to_vec(result)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;

        Ok(())
    }
}
