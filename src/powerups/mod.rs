//! Powerup cards: played from hand, never placed in a program.

mod error;
mod kind;
mod resolver;

pub use error::PowerupError;
pub use kind::PowerupKind;
pub use resolver::{apply_powerup, PowerupOutcome};
