use serde::{Deserialize, Serialize};

use crate::core::{GameId, PlayerId};
use crate::powerups::PowerupOutcome;
use crate::rules::{GameResult, RoundReport};

/// What a command produced, for the transport to broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Player state changed; no round was resolved.
    Updated { game: GameId },
    PowerupPlayed {
        game: GameId,
        player: PlayerId,
        outcome: PowerupOutcome,
    },
    RoundResolved { game: GameId, report: RoundReport },
    /// Terminal: the game and its lobby have been removed.
    GameOver {
        game: GameId,
        result: GameResult,
        report: RoundReport,
    },
    PlayerLeft {
        game: GameId,
        player: String,
        remaining: String,
    },
}

impl SessionEvent {
    #[must_use]
    pub fn game(&self) -> &GameId {
        match self {
            SessionEvent::Updated { game }
            | SessionEvent::PowerupPlayed { game, .. }
            | SessionEvent::RoundResolved { game, .. }
            | SessionEvent::GameOver { game, .. }
            | SessionEvent::PlayerLeft { game, .. } => game,
        }
    }

    #[must_use]
    pub fn report(&self) -> Option<&RoundReport> {
        match self {
            SessionEvent::RoundResolved { report, .. } | SessionEvent::GameOver { report, .. } => Some(report),
            _ => None,
        }
    }
}
