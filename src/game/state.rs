//! Game state and its wire snapshot
//!
//! `GameState` is the authoritative per-match history. Three parallel
//! histories grow by one entry per rally: player one's score, player two's
//! score, and who serves next. Index 0 is always the 0-0 start with the
//! initial server.

use serde::{Deserialize, Serialize};

use super::config::SessionConfig;
use super::error::{ScoreError, SnapshotError};
use super::rules;

/// One of the two player slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// The other player
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Wire value (1 or 2)
    pub fn as_u8(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = ScoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::One),
            2 => Ok(Player::Two),
            other => Err(ScoreError::InvalidPlayer(other)),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> Self {
        player.as_u8()
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Created or restarted, no rally yet
    NotStarted,
    /// At least one rally played
    InProgress,
    /// Win condition reached; further rallies are ignored
    Ended,
}

/// Complete state of one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) p1_name: String,
    pub(crate) p2_name: String,
    pub(crate) phase: Phase,
    pub(crate) p1_score: Vec<u32>,
    pub(crate) p2_score: Vec<u32>,
    pub(crate) serving: Vec<Player>,
    pub(crate) max_score: u32,
    pub(crate) end_game_choice: Option<String>,
}

impl GameState {
    /// Fresh 0-0 state for a config
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            p1_name: config.p1_name.clone(),
            p2_name: config.p2_name.clone(),
            phase: Phase::NotStarted,
            p1_score: vec![0],
            p2_score: vec![0],
            serving: vec![config.initial_server],
            max_score: config.max_score,
            end_game_choice: None,
        }
    }

    pub fn p1_name(&self) -> &str {
        &self.p1_name
    }

    pub fn p2_name(&self) -> &str {
        &self.p2_name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn p1_history(&self) -> &[u32] {
        &self.p1_score
    }

    pub fn p2_history(&self) -> &[u32] {
        &self.p2_score
    }

    pub fn serving_history(&self) -> &[Player] {
        &self.serving
    }

    pub fn end_game_choice(&self) -> Option<&str> {
        self.end_game_choice.as_deref()
    }

    /// Number of entries in each history (rallies played + 1)
    pub fn len(&self) -> usize {
        self.serving.len()
    }

    /// Always false: histories hold at least the initial entry
    pub fn is_empty(&self) -> bool {
        self.serving.is_empty()
    }

    /// Latest (player one, player two) score
    pub fn latest_scores(&self) -> (u32, u32) {
        (
            self.p1_score.last().copied().unwrap_or(0),
            self.p2_score.last().copied().unwrap_or(0),
        )
    }

    /// Player serving the next rally
    pub fn current_server(&self) -> Option<Player> {
        self.serving.last().copied()
    }

    /// Name attached to `player`
    pub fn name_of(&self, player: Player) -> &str {
        match player {
            Player::One => &self.p1_name,
            Player::Two => &self.p2_name,
        }
    }

    /// Wire representation of this state
    pub fn to_snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot {
            p1_name: self.p1_name.clone(),
            p2_name: self.p2_name.clone(),
            phase: self.phase,
            p1_score: self.p1_score.clone(),
            p2_score: self.p2_score.clone(),
            serving: self.serving.clone(),
            max_score: self.max_score,
            end_game_choice: self.end_game_choice.clone(),
        }
    }
}

/// Serializable state of a session at one point in time
///
/// ```text
/// {
///   "p1Name": "Ana", "p2Name": "Ben", "phase": "InProgress",
///   "p1Score": [0, 1], "p2Score": [0, 0], "serving": [1, 1],
///   "maxScore": 11, "endGameChoice": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateSnapshot {
    pub p1_name: String,
    pub p2_name: String,
    pub phase: Phase,
    pub p1_score: Vec<u32>,
    pub p2_score: Vec<u32>,
    pub serving: Vec<Player>,
    pub max_score: u32,
    #[serde(default)]
    pub end_game_choice: Option<String>,
}

impl GameStateSnapshot {
    /// Check the history invariants and convert into a `GameState`
    ///
    /// Histories must be non-empty and equally long, start at 0-0, and
    /// every rally must add exactly one point to exactly one side. No rally
    /// may follow a won score, and the phase must agree with the final
    /// score: `Ended` exactly when it is a win, `NotStarted` only before the
    /// first rally.
    pub fn validate(self) -> Result<GameState, SnapshotError> {
        if self.max_score == 0 {
            return Err(SnapshotError::InvalidMaxScore);
        }

        let (p1_len, p2_len, serving_len) =
            (self.p1_score.len(), self.p2_score.len(), self.serving.len());
        if p1_len == 0 || p2_len == 0 || serving_len == 0 {
            return Err(SnapshotError::EmptyHistory);
        }
        if p1_len != p2_len || p1_len != serving_len {
            return Err(SnapshotError::LengthMismatch {
                p1: p1_len,
                p2: p2_len,
                serving: serving_len,
            });
        }

        if self.p1_score[0] != 0 || self.p2_score[0] != 0 {
            return Err(SnapshotError::NonZeroStart {
                p1: self.p1_score[0],
                p2: self.p2_score[0],
            });
        }

        for index in 1..p1_len {
            let d1 = self.p1_score[index].checked_sub(self.p1_score[index - 1]);
            let d2 = self.p2_score[index].checked_sub(self.p2_score[index - 1]);
            if !matches!((d1, d2), (Some(1), Some(0)) | (Some(0), Some(1))) {
                return Err(SnapshotError::InvalidDelta { index });
            }
        }

        let last = p1_len - 1;
        for index in 1..last {
            if rules::is_game_over(self.p1_score[index], self.p2_score[index], self.max_score) {
                return Err(SnapshotError::RallyAfterWin { index: index + 1 });
            }
        }

        let won = rules::is_game_over(self.p1_score[last], self.p2_score[last], self.max_score);
        let expected = if won {
            Phase::Ended
        } else if last > 0 {
            Phase::InProgress
        } else if self.phase == Phase::Ended {
            Phase::NotStarted
        } else {
            // A lone start entry may be InProgress after undoing the first rally
            self.phase
        };
        if self.phase != expected {
            return Err(SnapshotError::PhaseMismatch {
                phase: self.phase,
                expected,
            });
        }

        Ok(GameState {
            p1_name: self.p1_name,
            p2_name: self.p2_name,
            phase: self.phase,
            p1_score: self.p1_score,
            p2_score: self.p2_score,
            serving: self.serving,
            max_score: self.max_score,
            end_game_choice: self.end_game_choice,
        })
    }
}

impl TryFrom<GameStateSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(snapshot: GameStateSnapshot) -> Result<Self, Self::Error> {
        snapshot.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(p1: Vec<u32>, p2: Vec<u32>, serving: Vec<Player>) -> GameStateSnapshot {
        GameStateSnapshot {
            p1_name: "Ana".into(),
            p2_name: "Ben".into(),
            phase: Phase::InProgress,
            p1_score: p1,
            p2_score: p2,
            serving,
            max_score: 11,
            end_game_choice: None,
        }
    }

    #[test]
    fn test_player_from_u8() {
        assert_eq!(Player::try_from(1), Ok(Player::One));
        assert_eq!(Player::try_from(2), Ok(Player::Two));
        assert_eq!(Player::try_from(0), Err(ScoreError::InvalidPlayer(0)));
        assert_eq!(Player::try_from(3), Err(ScoreError::InvalidPlayer(3)));
        assert_eq!(Player::One.opponent(), Player::Two);
    }

    #[test]
    fn test_new_state() {
        let config = SessionConfig::new("Ana", "Ben").initial_server(Player::Two);
        let state = GameState::new(&config);

        assert_eq!(state.phase(), Phase::NotStarted);
        assert_eq!(state.len(), 1);
        assert_eq!(state.latest_scores(), (0, 0));
        assert_eq!(state.current_server(), Some(Player::Two));
        assert_eq!(state.name_of(Player::One), "Ana");
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let state = GameState::new(&SessionConfig::new("Ana", "Ben"));
        let json = serde_json::to_value(state.to_snapshot()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "p1Name": "Ana",
                "p2Name": "Ben",
                "phase": "NotStarted",
                "p1Score": [0],
                "p2Score": [0],
                "serving": [1],
                "maxScore": 11,
                "endGameChoice": null,
            })
        );
    }

    #[test]
    fn test_snapshot_rejects_bad_server() {
        let json = r#"{"p1Name":"a","p2Name":"b","phase":"InProgress",
            "p1Score":[0],"p2Score":[0],"serving":[3],"maxScore":11}"#;

        assert!(serde_json::from_str::<GameStateSnapshot>(json).is_err());
    }

    #[test]
    fn test_validate_accepts_consistent_history() {
        let snap = snapshot(
            vec![0, 1, 1, 2],
            vec![0, 0, 1, 1],
            vec![Player::One, Player::One, Player::Two, Player::Two],
        );

        let state = snap.validate().unwrap();
        assert_eq!(state.latest_scores(), (2, 1));
    }

    #[test]
    fn test_validate_rejects_length_mismatch() {
        let snap = snapshot(vec![0, 1], vec![0, 0], vec![Player::One]);

        assert_eq!(
            snap.validate(),
            Err(SnapshotError::LengthMismatch {
                p1: 2,
                p2: 2,
                serving: 1
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_and_nonzero_start() {
        let empty = snapshot(vec![], vec![], vec![]);
        assert_eq!(empty.validate(), Err(SnapshotError::EmptyHistory));

        let nonzero = snapshot(vec![1], vec![0], vec![Player::One]);
        assert_eq!(
            nonzero.validate(),
            Err(SnapshotError::NonZeroStart { p1: 1, p2: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_bad_deltas() {
        // Both sides scored
        let both = snapshot(vec![0, 1], vec![0, 1], vec![Player::One, Player::One]);
        assert_eq!(both.validate(), Err(SnapshotError::InvalidDelta { index: 1 }));

        // Nobody scored
        let none = snapshot(vec![0, 0], vec![0, 0], vec![Player::One, Player::One]);
        assert_eq!(none.validate(), Err(SnapshotError::InvalidDelta { index: 1 }));

        // Score went down
        let down = snapshot(
            vec![0, 1, 0],
            vec![0, 0, 1],
            vec![Player::One, Player::One, Player::One],
        );
        assert_eq!(down.validate(), Err(SnapshotError::InvalidDelta { index: 2 }));
    }

    #[test]
    fn test_validate_rejects_zero_max_score() {
        let mut snap = snapshot(vec![0], vec![0], vec![Player::One]);
        snap.max_score = 0;

        assert_eq!(snap.validate(), Err(SnapshotError::InvalidMaxScore));
    }

    /// Player one takes `points` straight rallies
    fn shutout(points: u32, phase: Phase) -> GameStateSnapshot {
        let len = points as usize + 1;
        let mut snap = snapshot((0..=points).collect(), vec![0; len], vec![Player::One; len]);
        snap.phase = phase;
        snap
    }

    #[test]
    fn test_validate_phase_follows_score() {
        assert!(shutout(11, Phase::Ended).validate().is_ok());
        assert!(shutout(0, Phase::NotStarted).validate().is_ok());
        assert!(shutout(0, Phase::InProgress).validate().is_ok());
        assert!(shutout(3, Phase::InProgress).validate().is_ok());

        assert_eq!(
            shutout(0, Phase::Ended).validate(),
            Err(SnapshotError::PhaseMismatch {
                phase: Phase::Ended,
                expected: Phase::NotStarted
            })
        );
        assert_eq!(
            shutout(2, Phase::NotStarted).validate(),
            Err(SnapshotError::PhaseMismatch {
                phase: Phase::NotStarted,
                expected: Phase::InProgress
            })
        );
        assert_eq!(
            shutout(5, Phase::Ended).validate(),
            Err(SnapshotError::PhaseMismatch {
                phase: Phase::Ended,
                expected: Phase::InProgress
            })
        );
        assert_eq!(
            shutout(11, Phase::InProgress).validate(),
            Err(SnapshotError::PhaseMismatch {
                phase: Phase::InProgress,
                expected: Phase::Ended
            })
        );
    }

    #[test]
    fn test_validate_rejects_rally_after_win() {
        assert_eq!(
            shutout(12, Phase::Ended).validate(),
            Err(SnapshotError::RallyAfterWin { index: 12 })
        );

        // Alternate up to 11-10, then 11-11 and 12-11: deuce play, no win yet
        let mut p1: Vec<u32> = Vec::new();
        let mut p2: Vec<u32> = Vec::new();
        for i in 0..=10 {
            p1.extend([i, i + 1]);
            p2.extend([i, i]);
        }
        p1.extend([11, 12]);
        p2.extend([11, 11]);
        let len = p1.len();
        let mut snap = snapshot(p1, p2, vec![Player::One; len]);
        snap.phase = Phase::InProgress;
        assert!(snap.validate().is_ok());
    }
}
