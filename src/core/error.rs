//! Request-level errors.
//!
//! Component errors (`ValidationError`, `PowerupError`) are defined next to
//! the code that raises them and lifted into `GameError` at the session
//! boundary. Execution errors never reach here: the round engine contains
//! them per player.

use thiserror::Error;

use super::player::{PlayerId, TurnPhase};
use crate::cards::CatalogError;
use crate::powerups::PowerupError;
use crate::program::ValidationError;

/// Errors returned to the requester of a game operation.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("game not found: {0}")]
    GameNotFound(String),

    #[error("game already exists: {0}")]
    GameExists(String),

    #[error("player not in game: {0}")]
    PlayerNotFound(String),

    #[error("game is already over")]
    GameOver,

    #[error("{action} is only allowed in the {expected} phase (currently {actual})")]
    WrongPhase {
        action: &'static str,
        expected: TurnPhase,
        actual: TurnPhase,
    },

    #[error("{0} is already ready")]
    AlreadyReady(PlayerId),

    #[error("already drew this round")]
    AlreadyDrew,

    #[error("hand is full")]
    HandFull,

    #[error("deck is empty")]
    DeckEmpty,

    #[error("invalid hand index {0}")]
    InvalidHandIndex(usize),

    #[error("not every player is ready")]
    NotAllReady,

    #[error("invalid program: {0}")]
    Validation(#[from] ValidationError),

    #[error("powerup failed: {0}")]
    Powerup(#[from] PowerupError),

    #[error("card catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("lobby error: {0}")]
    Lobby(#[from] crate::lobby::LobbyError),

    #[error("game state lock was poisoned")]
    LockPoisoned,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
