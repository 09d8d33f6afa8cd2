//! Fire-and-forget delivery of match results
//!
//! The score state machine is synchronous and must never wait on storage.
//! It hands finished results to a `ResultNotifier`, which pushes them onto
//! an unbounded channel. A background worker drains the channel into a
//! `ResultSink` and logs any failure.
//!
//! ```text
//!   GameSession::increment ──► ResultNotifier::notify ──► mpsc ──► worker ──► ResultSink
//!        (sync, never blocks)                                      (tokio task)
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::error::SinkError;

/// Outcome of one finished match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub winner: String,
    pub loser: String,
    pub winner_score: u32,
    pub loser_score: u32,
    pub max_score: u32,
}

/// Destination for finished match results
///
/// Implementations own their retry policy; the worker calls each result
/// exactly once.
pub trait ResultSink: Send + Sync + 'static {
    /// Record one result
    fn record_result(
        &self,
        result: &MatchResult,
    ) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// Non-blocking handle used by sessions to publish results
#[derive(Debug, Clone, Default)]
pub struct ResultNotifier {
    tx: Option<mpsc::UnboundedSender<MatchResult>>,
}

impl ResultNotifier {
    /// Create a notifier and the receiver its results arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<MatchResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A notifier that discards every result
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Whether results go anywhere
    pub fn is_enabled(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    /// Publish a result without waiting for delivery
    pub fn notify(&self, result: MatchResult) {
        let Some(tx) = &self.tx else {
            tracing::debug!(
                winner = %result.winner,
                loser = %result.loser,
                "Result sink disabled, result dropped"
            );
            return;
        };

        if let Err(mpsc::error::SendError(result)) = tx.send(result) {
            tracing::warn!(
                winner = %result.winner,
                loser = %result.loser,
                error = %SinkError::Closed,
                "Result not delivered"
            );
        }
    }
}

/// Spawn the worker that feeds results into `sink`
///
/// Runs until every `ResultNotifier` clone is dropped.
pub fn spawn_result_worker<S: ResultSink>(
    sink: Arc<S>,
    rx: mpsc::UnboundedReceiver<MatchResult>,
) -> JoinHandle<()> {
    spawn_result_worker_until(sink, rx, std::future::pending())
}

/// Spawn the worker, stopping once `shutdown` resolves
///
/// On shutdown the channel is closed to new results and everything already
/// queued is recorded before the task exits, even while notifier clones are
/// still alive.
pub fn spawn_result_worker_until<S, F>(
    sink: Arc<S>,
    mut rx: mpsc::UnboundedReceiver<MatchResult>,
    shutdown: F,
) -> JoinHandle<()>
where
    S: ResultSink,
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some(result) => record(sink.as_ref(), &result).await,
                    None => {
                        tracing::debug!("Result channel closed, worker exiting");
                        return;
                    }
                },
                _ = &mut shutdown => break,
            }
        }

        rx.close();
        let mut flushed = 0usize;
        while let Some(result) = rx.recv().await {
            record(sink.as_ref(), &result).await;
            flushed += 1;
        }
        tracing::debug!(flushed = flushed, "Result worker stopped");
    })
}

async fn record<S: ResultSink>(sink: &S, result: &MatchResult) {
    match sink.record_result(result).await {
        Ok(()) => {
            tracing::debug!(
                winner = %result.winner,
                loser = %result.loser,
                "Match result recorded"
            );
        }
        Err(e) => {
            tracing::error!(
                winner = %result.winner,
                loser = %result.loser,
                error = %e,
                "Failed to record match result"
            );
        }
    }
}
