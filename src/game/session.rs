//! Score-serve state machine
//!
//! Owns the history of one match and applies rallies to it. Every public
//! operation is a complete transition: it either applies fully or returns
//! an error without touching the state.
//!
//! Rally ordering is fixed: scores are appended, the win rule runs (and may
//! end the game and publish the result), and only then is the next server
//! picked and appended. The serve entry is appended even on the rally that
//! ends the game, so all three histories stay the same length.

use super::config::SessionConfig;
use super::error::ScoreError;
use super::rules;
use super::state::{GameState, GameStateSnapshot, Phase, Player};
use crate::sink::{MatchResult, ResultNotifier};

/// State machine for a single match
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Config the session was created from, used by `restart`
    config: SessionConfig,

    /// Current state
    state: GameState,

    /// Where finished results go
    notifier: ResultNotifier,
}

impl GameSession {
    /// Create a session that discards results
    pub fn new(config: SessionConfig) -> Self {
        Self::with_notifier(config, ResultNotifier::disabled())
    }

    /// Create a session that publishes results through `notifier`
    pub fn with_notifier(config: SessionConfig, notifier: ResultNotifier) -> Self {
        let state = GameState::new(&config);

        tracing::debug!(
            p1 = %config.p1_name,
            p2 = %config.p2_name,
            max_score = config.max_score,
            server = %config.initial_server,
            "Game session created"
        );

        Self {
            config,
            state,
            notifier,
        }
    }

    /// Config the session was created from
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Wire snapshot of the current state
    pub fn snapshot(&self) -> GameStateSnapshot {
        self.state.to_snapshot()
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Rallies played so far
    pub fn rally_count(&self) -> usize {
        self.state.len().saturating_sub(1)
    }

    /// Award a rally to a player given as a wire slot (1 or 2)
    pub fn increment_slot(&mut self, slot: u8) -> Result<&GameState, ScoreError> {
        let player = Player::try_from(slot)?;
        Ok(self.increment(player))
    }

    /// Award a rally to `player`
    ///
    /// A no-op once the game has ended.
    pub fn increment(&mut self, player: Player) -> &GameState {
        if self.state.phase == Phase::Ended {
            tracing::debug!(player = %player, "Rally ignored, game already ended");
            return &self.state;
        }

        let (p1, p2) = self.state.latest_scores();
        let (p1, p2) = match player {
            Player::One => (p1 + 1, p2),
            Player::Two => (p1, p2 + 1),
        };
        self.state.p1_score.push(p1);
        self.state.p2_score.push(p2);

        if self.state.phase == Phase::NotStarted {
            self.state.phase = Phase::InProgress;
        }

        if rules::is_game_over(p1, p2, self.state.max_score) {
            self.finish(p1, p2);
        }

        let current = self
            .state
            .current_server()
            .unwrap_or(self.config.initial_server);
        let interval = self
            .config
            .serve_intervals
            .interval_for(self.state.max_score);
        let decision = rules::next_server(
            p1,
            p2,
            self.state.max_score,
            current,
            self.state.serving.len(),
            interval,
        );
        self.state.serving.push(decision.server);

        tracing::debug!(
            player = %player,
            p1_score = p1,
            p2_score = p2,
            server = %decision.server,
            reason = ?decision.reason,
            "Rally recorded"
        );

        &self.state
    }

    /// End the game and publish the result
    fn finish(&mut self, p1: u32, p2: u32) {
        self.state.phase = Phase::Ended;

        let winner = rules::leader(p1, p2);
        let (winner_score, loser_score) = match winner {
            Player::One => (p1, p2),
            Player::Two => (p2, p1),
        };
        let result = MatchResult {
            winner: self.state.name_of(winner).to_string(),
            loser: self.state.name_of(winner.opponent()).to_string(),
            winner_score,
            loser_score,
            max_score: self.state.max_score,
        };

        tracing::info!(
            winner = %result.winner,
            loser = %result.loser,
            p1_score = p1,
            p2_score = p2,
            "Game ended"
        );

        self.notifier.notify(result);
    }

    /// Name of the player with the larger latest score
    ///
    /// Only meaningful once the game has ended; ties go to player two.
    pub fn winner(&self) -> &str {
        let (p1, p2) = self.state.latest_scores();
        self.state.name_of(rules::leader(p1, p2))
    }

    /// Remove the last rally
    ///
    /// The phase is left as is, so a game that ended stays ended.
    pub fn undo(&mut self) -> Result<&GameState, ScoreError> {
        if self.state.len() < 2 {
            return Err(ScoreError::NoHistoryToUndo);
        }

        self.state.p1_score.pop();
        self.state.p2_score.pop();
        self.state.serving.pop();

        let (p1, p2) = self.state.latest_scores();
        tracing::debug!(
            p1_score = p1,
            p2_score = p2,
            phase = ?self.state.phase,
            "Rally undone"
        );

        Ok(&self.state)
    }

    /// Reset to 0-0 with the initial server
    pub fn restart(&mut self) -> &GameState {
        self.state = GameState::new(&self.config);

        tracing::debug!(
            server = %self.config.initial_server,
            "Game restarted"
        );

        &self.state
    }

    /// Swap in a whole, already validated state
    pub fn replace(&mut self, state: GameState) {
        let (p1, p2) = state.latest_scores();
        tracing::debug!(
            p1_score = p1,
            p2_score = p2,
            phase = ?state.phase,
            rallies = state.len() - 1,
            "Game state replaced"
        );

        self.state = state;
    }

    /// Record the post-game choice made by the players
    pub fn set_end_game_choice(&mut self, choice: Option<String>) {
        self.state.end_game_choice = choice;
    }
}
