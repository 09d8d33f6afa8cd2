//! Session configuration

use std::collections::BTreeMap;

use super::state::Player;

/// Default points needed to win a game
pub const DEFAULT_MAX_SCORE: u32 = 11;

/// Serve switch interval used when no table entry matches
pub const DEFAULT_SERVE_INTERVAL: usize = 2;

/// Serve switch interval for the legacy 21-point game
pub const LEGACY_21_SERVE_INTERVAL: usize = 5;

/// Lookup table of serve switch intervals keyed by max score
///
/// Outside the game-point and deuce rules, serve changes hands every
/// `interval` rallies. The default table only carries the 21-point
/// entry; every other max score falls back to two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeIntervals {
    table: BTreeMap<u32, usize>,
    fallback: usize,
}

impl Default for ServeIntervals {
    fn default() -> Self {
        let mut table = BTreeMap::new();
        table.insert(21, LEGACY_21_SERVE_INTERVAL);

        Self {
            table,
            fallback: DEFAULT_SERVE_INTERVAL,
        }
    }
}

impl ServeIntervals {
    /// An empty table where every max score uses `fallback`
    pub fn uniform(fallback: usize) -> Self {
        Self {
            table: BTreeMap::new(),
            fallback: fallback.max(1),
        }
    }

    /// Set the interval for a specific max score
    pub fn with_interval(mut self, max_score: u32, interval: usize) -> Self {
        self.table.insert(max_score, interval.max(1));
        self
    }

    /// Set the interval used when no entry matches
    pub fn fallback(mut self, interval: usize) -> Self {
        self.fallback = interval.max(1);
        self
    }

    /// Interval for a game played to `max_score`
    pub fn interval_for(&self, max_score: u32) -> usize {
        self.table.get(&max_score).copied().unwrap_or(self.fallback)
    }
}

/// Configuration a session is created from
///
/// Retained verbatim by the session so `restart` can rebuild the
/// initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Player one display name
    pub p1_name: String,

    /// Player two display name
    pub p2_name: String,

    /// Points needed to win (subject to the two-point margin)
    pub max_score: u32,

    /// Who serves the first rally
    pub initial_server: Player,

    /// Serve switch interval table
    pub serve_intervals: ServeIntervals,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            p1_name: "Player 1".to_string(),
            p2_name: "Player 2".to_string(),
            max_score: DEFAULT_MAX_SCORE,
            initial_server: Player::One,
            serve_intervals: ServeIntervals::default(),
        }
    }
}

impl SessionConfig {
    /// Create a config for two named players with default rules
    pub fn new(p1_name: impl Into<String>, p2_name: impl Into<String>) -> Self {
        Self {
            p1_name: p1_name.into(),
            p2_name: p2_name.into(),
            ..Default::default()
        }
    }

    /// Set the max score (zero is raised to one)
    pub fn max_score(mut self, max_score: u32) -> Self {
        self.max_score = max_score.max(1);
        self
    }

    /// Set the first server
    pub fn initial_server(mut self, server: Player) -> Self {
        self.initial_server = server;
        self
    }

    /// Replace the serve interval table
    pub fn serve_intervals(mut self, intervals: ServeIntervals) -> Self {
        self.serve_intervals = intervals;
        self
    }

    /// Serve switch interval for this config's max score
    pub fn serve_interval(&self) -> usize {
        self.serve_intervals.interval_for(self.max_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.max_score, DEFAULT_MAX_SCORE);
        assert_eq!(config.initial_server, Player::One);
        assert_eq!(config.serve_interval(), DEFAULT_SERVE_INTERVAL);
    }

    #[test]
    fn test_builder_chaining() {
        let config = SessionConfig::new("Ana", "Ben")
            .max_score(21)
            .initial_server(Player::Two);

        assert_eq!(config.p1_name, "Ana");
        assert_eq!(config.p2_name, "Ben");
        assert_eq!(config.max_score, 21);
        assert_eq!(config.initial_server, Player::Two);
        assert_eq!(config.serve_interval(), LEGACY_21_SERVE_INTERVAL);
    }

    #[test]
    fn test_max_score_floor() {
        let config = SessionConfig::default().max_score(0);

        assert_eq!(config.max_score, 1);
    }

    #[test]
    fn test_default_intervals_match_binary_rule() {
        let intervals = ServeIntervals::default();

        assert_eq!(intervals.interval_for(21), 5);
        for max_score in [5, 11, 15, 25] {
            assert_eq!(intervals.interval_for(max_score), 2);
        }
    }

    #[test]
    fn test_custom_interval_table() {
        let intervals = ServeIntervals::uniform(3)
            .with_interval(15, 4)
            .with_interval(7, 0);

        assert_eq!(intervals.interval_for(15), 4);
        assert_eq!(intervals.interval_for(11), 3);
        // Zero intervals are clamped
        assert_eq!(intervals.interval_for(7), 1);
    }
}
