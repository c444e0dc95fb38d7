//! Core engine types: seats, game state, RNG, configuration, errors.
//!
//! Everything here is independent of card content. Numeric limits come from
//! `RulesConfig` rather than constants scattered through the rules.

pub mod config;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use config::RulesConfig;
pub use error::{GameError, Result};
pub use player::{PlayerId, PlayerMap, PlayerState, TurnPhase, SEAT_COUNT};
pub use rng::{GameRng, GameRngState};
pub use state::{Game, GameId, GameSnapshot, Lifecycle};
