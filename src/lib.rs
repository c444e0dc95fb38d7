//! # code-duel
//!
//! Rules engine for a two-player card-programming duel.
//!
//! Each round both players assemble a small program out of cards (actions,
//! `for_loop` and `if` containers), then both programs run at once. Attacks,
//! heals, and draws are collected first and applied simultaneously, so
//! neither player moves first. Powerup cards are played from hand to bend
//! the rules: bug an opponent's block, steal a card, upgrade a container.
//!
//! ## Design Principles
//!
//! 1. **Scripts Are Data**: Card behavior is a typed `Op` tree, interpreted
//!    under a fuel budget. No code text is generated or evaluated.
//!
//! 2. **Immutable Programs**: A `Program` is a persistent tree (`im-rs`).
//!    Powerups and resubmissions produce new snapshots instead of mutating
//!    shared ones.
//!
//! 3. **Contained Failures**: A failing program zeroes that player's
//!    contribution for the round; the opponent and the round carry on.
//!
//! 4. **Owned State**: Lobbies and games live in a `SessionManager` that the
//!    caller constructs and owns. There is no global registry.
//!
//! ## Modules
//!
//! - `core`: Seats, game record, RNG, configuration, errors
//! - `cards`: Card definitions, registry, catalog, deck building
//! - `program`: Program trees, transforms, structural validation
//! - `effects`: Card script AST and interpreter
//! - `events`: Narrative events and per-player logs
//! - `rules`: Round engine and turn actions
//! - `powerups`: Powerup effects
//! - `lobby`: Pre-game lobbies
//! - `session`: Session manager tying lobbies and games together

pub mod cards;
pub mod core;
pub mod effects;
pub mod events;
pub mod lobby;
pub mod powerups;
pub mod program;
pub mod rules;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Game, GameError, GameId, GameRng, GameSnapshot, PlayerId, PlayerMap, PlayerState, RulesConfig, TurnPhase,
};

pub use crate::cards::{
    build_deck, CardCatalog, CardCategory, CardDefinition, CardInstance, CardKey, CardRegistry, Params,
    StandardCatalog,
};

pub use crate::program::{NodeDraft, NodeId, Program, ProgramNode, ValidationError};

pub use crate::effects::{ExecutionError, ExecutionOutcome, Interpreter, Op};

pub use crate::events::{ExecutionLog, NarrativeEvent};

pub use crate::rules::{GameResult, RoundEngine, RoundReport};

pub use crate::powerups::{apply_powerup, PowerupError, PowerupKind, PowerupOutcome};

pub use crate::lobby::{Lobby, LobbyError, LobbyId, LobbyRegistry};

pub use crate::session::{SessionEvent, SessionManager};
