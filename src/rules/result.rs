//! Round and game results.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{PlayerId, PlayerMap};
use crate::events::{ExecutionLog, NarrativeEvent};

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// Single winner.
    Winner(PlayerId),
    /// Both seats were knocked out in the same round.
    Draw,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        matches!(self, GameResult::Winner(p) if *p == player)
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerId> {
        match self {
            GameResult::Winner(p) => Some(*p),
            GameResult::Draw => None,
        }
    }

    #[must_use]
    pub fn loser(&self) -> Option<PlayerId> {
        self.winner().map(PlayerId::opponent)
    }

    /// Decide the game from the seats at 0 HP, if any.
    #[must_use]
    pub fn from_knockouts(knocked_out: &[PlayerId]) -> Option<Self> {
        match knocked_out {
            [] => None,
            [loser] => Some(GameResult::Winner(loser.opponent())),
            _ => Some(GameResult::Draw),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The next round has begun.
    Continue,
    GameOver(GameResult),
}

/// Everything a resolved round reports to the session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// The round that was resolved.
    pub round: u32,
    pub logs: PlayerMap<ExecutionLog>,
    /// Deduplicated events of both seats, in resolution order.
    pub events: Vec<NarrativeEvent>,
    pub knocked_out: SmallVec<[PlayerId; 2]>,
    pub outcome: RoundOutcome,
}

impl RoundReport {
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        matches!(self.outcome, RoundOutcome::GameOver(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::SECOND);
        assert!(!result.is_winner(PlayerId::FIRST));
        assert!(result.is_winner(PlayerId::SECOND));
        assert_eq!(result.loser(), Some(PlayerId::FIRST));

        let draw = GameResult::Draw;
        assert!(!draw.is_winner(PlayerId::FIRST));
        assert_eq!(draw.winner(), None);
    }

    #[test]
    fn test_from_knockouts() {
        assert_eq!(GameResult::from_knockouts(&[]), None);
        assert_eq!(
            GameResult::from_knockouts(&[PlayerId::FIRST]),
            Some(GameResult::Winner(PlayerId::SECOND))
        );
        assert_eq!(
            GameResult::from_knockouts(&[PlayerId::FIRST, PlayerId::SECOND]),
            Some(GameResult::Draw)
        );
    }
}
