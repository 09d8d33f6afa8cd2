//! Win and serve rotation rules
//!
//! Both rules are pure functions of the latest scores so they can be
//! checked in isolation from the session.
//!
//! Serve rotation is evaluated in a fixed priority order:
//!
//! ```text
//!   1. p1 + 1 >= max && |p1 + 1 - p2| >= 2   -> player two serves
//!   2. p2 + 1 >= max && |p1 - (p2 + 1)| >= 2 -> player one serves
//!   3. p1 + 1 >= max && p2 + 1 >= max        -> deuce, serve flips
//!   4. len % interval == 0                   -> serve flips
//!      otherwise                             -> server keeps serve
//! ```
//!
//! Branches 1-3 pre-empt the periodic switch near game point and in deuce.

use super::state::Player;

/// Which rotation branch picked the next server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeReason {
    /// Player one is one point from winning
    PlayerOneGamePoint,
    /// Player two is one point from winning
    PlayerTwoGamePoint,
    /// Both players are within a point of the max score
    Deuce,
    /// Periodic interval reached
    Switch,
    /// No rule fired
    Hold,
}

/// Outcome of serve rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServeDecision {
    pub server: Player,
    pub reason: ServeReason,
}

/// True when someone reached `max_score` with a two-point margin
pub fn is_game_over(p1: u32, p2: u32, max_score: u32) -> bool {
    (p1 >= max_score || p2 >= max_score) && p1.abs_diff(p2) >= 2
}

/// Player holding the larger score; ties go to player two
pub fn leader(p1: u32, p2: u32) -> Player {
    if p1 > p2 {
        Player::One
    } else {
        Player::Two
    }
}

/// Pick the server for the next rally
///
/// `p1`/`p2` are the scores after the rally, `current` is the last entry of
/// the serving history and `history_len` its length before the new entry is
/// appended.
pub fn next_server(
    p1: u32,
    p2: u32,
    max_score: u32,
    current: Player,
    history_len: usize,
    interval: usize,
) -> ServeDecision {
    let (p1_next, p2_next) = (p1 + 1, p2 + 1);

    let (server, reason) = if p1_next >= max_score && p1_next.abs_diff(p2) >= 2 {
        (Player::Two, ServeReason::PlayerOneGamePoint)
    } else if p2_next >= max_score && p1.abs_diff(p2_next) >= 2 {
        (Player::One, ServeReason::PlayerTwoGamePoint)
    } else if p1_next >= max_score && p2_next >= max_score {
        (current.opponent(), ServeReason::Deuce)
    } else if history_len % interval.max(1) == 0 {
        (current.opponent(), ServeReason::Switch)
    } else {
        (current, ServeReason::Hold)
    };

    ServeDecision { server, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_over_to_eleven() {
        assert!(!is_game_over(10, 9, 11));
        assert!(!is_game_over(11, 10, 11));
        assert!(is_game_over(11, 9, 11));
        assert!(is_game_over(12, 10, 11));
        assert!(is_game_over(3, 11, 11));
        assert!(!is_game_over(0, 0, 11));
    }

    #[test]
    fn test_leader_tie_goes_to_player_two() {
        assert_eq!(leader(5, 3), Player::One);
        assert_eq!(leader(3, 5), Player::Two);
        assert_eq!(leader(4, 4), Player::Two);
    }

    #[test]
    fn test_periodic_switch() {
        let hold = next_server(1, 0, 11, Player::One, 1, 2);
        assert_eq!(hold.server, Player::One);
        assert_eq!(hold.reason, ServeReason::Hold);

        let switch = next_server(2, 0, 11, Player::One, 2, 2);
        assert_eq!(switch.server, Player::Two);
        assert_eq!(switch.reason, ServeReason::Switch);
    }

    #[test]
    fn test_game_point_branches() {
        // 10-5 to 11: player one one point from the win
        let p1 = next_server(10, 5, 11, Player::One, 16, 2);
        assert_eq!(p1.server, Player::Two);
        assert_eq!(p1.reason, ServeReason::PlayerOneGamePoint);

        let p2 = next_server(5, 10, 11, Player::Two, 16, 2);
        assert_eq!(p2.server, Player::One);
        assert_eq!(p2.reason, ServeReason::PlayerTwoGamePoint);
    }

    #[test]
    fn test_deuce_flips_serve() {
        let decision = next_server(10, 10, 11, Player::One, 21, 2);
        assert_eq!(decision.server, Player::Two);
        assert_eq!(decision.reason, ServeReason::Deuce);

        let decision = next_server(10, 10, 11, Player::Two, 21, 2);
        assert_eq!(decision.server, Player::One);
    }

    #[test]
    fn test_game_point_beats_periodic_rule() {
        // history length is a multiple of the interval but branch 1 wins
        let decision = next_server(21, 20, 21, Player::One, 40, 5);
        assert_eq!(decision.server, Player::Two);
        assert_eq!(decision.reason, ServeReason::PlayerOneGamePoint);
    }
}
