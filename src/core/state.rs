//! Game record: both seats, the shared deck and discard pile, the round
//! counter, and the game's RNG.
//!
//! ## Game
//!
//! Owned by exactly one session entry. Every mutation goes through the turn
//! actions, the powerup resolver, or the round engine.
//!
//! ## GameSnapshot
//!
//! Serializable checkpoint of a `Game`, including the RNG stream position.
//! Encoded with `bincode`.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::config::RulesConfig;
use super::error::GameError;
use super::player::{PlayerId, PlayerMap, PlayerState, TurnPhase};
use super::rng::{GameRng, GameRngState};
use crate::cards::CardInstance;
use crate::rules::GameResult;

/// Identifier of a game; games inherit the id of the lobby they started from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(String);

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    InProgress,
    Finished(GameResult),
}

/// Complete state of one running game.
#[derive(Clone, Debug)]
pub struct Game {
    pub id: GameId,
    pub players: PlayerMap<PlayerState>,

    /// Shared draw pile; the front is the top card.
    pub deck: Vector<CardInstance>,
    pub discard: Vec<CardInstance>,

    /// Starts at 1, incremented after every non-terminal round.
    pub round: u32,
    pub lifecycle: Lifecycle,
    pub config: RulesConfig,
    rng: GameRng,
}

impl Game {
    /// Create a game with empty hands. Call `deal_opening_hands` to deal.
    #[must_use]
    pub fn new(
        id: GameId,
        names: [String; 2],
        deck: Vector<CardInstance>,
        config: RulesConfig,
        rng: GameRng,
    ) -> Self {
        let [first, second] = names;
        let mut names = [Some(first), Some(second)];
        let players = PlayerMap::new(|p| PlayerState::new(names[p.index()].take().unwrap_or_default(), &config));
        Self {
            id,
            players,
            deck,
            discard: Vec::new(),
            round: 1,
            lifecycle: Lifecycle::InProgress,
            config,
            rng,
        }
    }

    /// Deal `starting_hand` cards to each seat, each drawn from a random
    /// deck position.
    pub fn deal_opening_hands(&mut self) {
        for player in PlayerId::both() {
            for _ in 0..self.config.starting_hand {
                let Some(index) = self.rng.pick_index(self.deck.len()) else {
                    return;
                };
                let card = self.deck.remove(index);
                self.players[player].hand.push(card);
            }
        }
    }

    #[must_use]
    pub fn seat_of(&self, name: &str) -> Option<PlayerId> {
        self.players.iter().find(|(_, p)| p.name == name).map(|(id, _)| id)
    }

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn names(&self) -> PlayerMap<String> {
        self.players.map(|_, p| p.name.clone())
    }

    #[must_use]
    pub fn all_ready(&self) -> bool {
        self.players.iter().all(|(_, p)| p.ready)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Finished(_))
    }

    pub fn rng_mut(&mut self) -> &mut GameRng {
        &mut self.rng
    }

    /// Reset per-round flags and carry the executed program into the next
    /// round as both program and preview.
    pub fn advance_round(&mut self) {
        self.round += 1;
        for (_, player) in self.players.iter_mut() {
            player.ready = false;
            player.has_drawn = false;
            player.turn_phase = TurnPhase::Choose;
            let carried = player.program.take().or_else(|| player.preview.take());
            player.preview = carried.clone();
            player.program = carried;
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            id: self.id.clone(),
            players: self.players.clone(),
            deck: self.deck.clone(),
            discard: self.discard.clone(),
            round: self.round,
            lifecycle: self.lifecycle.clone(),
            config: self.config.clone(),
            rng: self.rng.state(),
        }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: GameSnapshot) -> Self {
        Self {
            id: snapshot.id,
            players: snapshot.players,
            deck: snapshot.deck,
            discard: snapshot.discard,
            round: snapshot.round,
            lifecycle: snapshot.lifecycle,
            config: snapshot.config,
            rng: GameRng::from_state(&snapshot.rng),
        }
    }
}

/// Serializable checkpoint of a `Game`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: GameId,
    pub players: PlayerMap<PlayerState>,
    pub deck: Vector<CardInstance>,
    pub discard: Vec<CardInstance>,
    pub round: u32,
    pub lifecycle: Lifecycle,
    pub config: RulesConfig,
    pub rng: GameRngState,
}

impl GameSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, GameError> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GameError> {
        bincode::deserialize(bytes).map_err(|e| GameError::Snapshot(e.to_string()))
    }
}
