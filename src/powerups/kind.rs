use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::error::PowerupError;

/// Powerup effects, dispatched by card key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    /// Upgrade one of the actor's top-level containers to capacity 2.
    CapacityIncrease,
    /// Take a random card from the opponent's hand.
    DrawFromOpponent,
    /// Move a random opponent card to the discard pile.
    OpponentDiscard,
    /// Disable an opponent node and its subtree.
    Bug,
    /// Re-enable one of the actor's bugged nodes and its subtree.
    Debug,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 5] = [
        PowerupKind::CapacityIncrease,
        PowerupKind::DrawFromOpponent,
        PowerupKind::OpponentDiscard,
        PowerupKind::Bug,
        PowerupKind::Debug,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            PowerupKind::CapacityIncrease => "capacity_increase",
            PowerupKind::DrawFromOpponent => "draw_from_opponent",
            PowerupKind::OpponentDiscard => "opponent_discard",
            PowerupKind::Bug => "bug",
            PowerupKind::Debug => "debug",
        }
    }

    /// Whether the powerup needs a target node.
    #[must_use]
    pub const fn needs_target(self) -> bool {
        matches!(
            self,
            PowerupKind::CapacityIncrease | PowerupKind::Bug | PowerupKind::Debug
        )
    }
}

impl FromStr for PowerupKind {
    type Err = PowerupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PowerupKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| PowerupError::UnknownPowerup(s.to_string()))
    }
}

impl std::fmt::Display for PowerupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
