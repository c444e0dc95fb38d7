use thiserror::Error;

use crate::cards::CardKey;
use crate::program::NodeId;

/// Why a powerup could not be played. The game is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PowerupError {
    #[error("powerup '{0}' is not in hand")]
    NotInHand(String),

    #[error("card '{0}' is not a powerup")]
    NotAPowerup(CardKey),

    #[error("unknown powerup '{0}'")]
    UnknownPowerup(String),

    #[error("target required")]
    TargetRequired,

    #[error("target block {0} not found")]
    TargetNotFound(NodeId),

    #[error("block {0} is not a container")]
    NotAContainer(NodeId),

    #[error("block {0} is already at max capacity")]
    AlreadyAtMaxCapacity(NodeId),

    #[error("cannot increase capacity of nested container block {0}")]
    NestedContainer(NodeId),

    #[error("opponent hand is empty")]
    OpponentHandEmpty,

    #[error("block {0} is already bugged")]
    AlreadyBugged(NodeId),

    #[error("block {0} is not bugged")]
    NotBugged(NodeId),
}
