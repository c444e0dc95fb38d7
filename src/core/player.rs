//! Player seats, per-seat storage, and combat state.
//!
//! ## PlayerId
//!
//! A duel always has exactly two seats. `PlayerId` is a seat index that can
//! only be constructed for a valid seat, so indexing a `PlayerMap` never
//! goes out of bounds.
//!
//! ## PlayerMap
//!
//! Fixed two-entry storage indexed by `PlayerId`.
//!
//! ## PlayerState
//!
//! Everything the rules engine tracks for one seat: hand, HP, energy, turn
//! phase, the submitted program and its live preview, and the defensive
//! flags surfaced by the last defense scan.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

use crate::cards::CardInstance;
use crate::core::config::RulesConfig;
use crate::program::Program;

/// Number of seats in a duel.
pub const SEAT_COUNT: usize = 2;

/// Seat identifier. The first seat is `PlayerId::FIRST`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// Seat 0.
    pub const FIRST: PlayerId = PlayerId(0);
    /// Seat 1.
    pub const SECOND: PlayerId = PlayerId(1);

    /// Create a seat ID from a raw index, if the seat exists.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < SEAT_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Get the raw seat index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both seats in seat order.
    ///
    /// ```
    /// use code_duel::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::both().collect();
    /// assert_eq!(seats, vec![PlayerId::FIRST, PlayerId::SECOND]);
    /// ```
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::FIRST, Self::SECOND].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-seat data storage.
///
/// ## Example
///
/// ```
/// use code_duel::core::{PlayerId, PlayerMap};
///
/// let mut hp: PlayerMap<i32> = PlayerMap::with_value(10);
/// hp[PlayerId::SECOND] -= 3;
/// assert_eq!(hp[PlayerId::FIRST], 10);
/// assert_eq!(hp[PlayerId::SECOND], 7);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: [T; SEAT_COUNT],
}

impl<T> PlayerMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(mut factory: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::FIRST), factory(PlayerId::SECOND)],
        }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Create a map with default values.
    pub fn with_default() -> Self
    where
        T: Default,
    {
        Self::new(|_| T::default())
    }

    /// Get a reference to a seat's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Borrow both entries mutably, `player` first.
    pub fn pair_mut(&mut self, player: PlayerId) -> (&mut T, &mut T) {
        let [first, second] = &mut self.data;
        if player == PlayerId::FIRST {
            (first, second)
        } else {
            (second, first)
        }
    }

    /// Iterate over (PlayerId, &T) pairs in seat order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::both().zip(self.data.iter())
    }

    /// Iterate over (PlayerId, &mut T) pairs in seat order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (PlayerId, &mut T)> {
        PlayerId::both().zip(self.data.iter_mut())
    }

    /// Transform every entry, keeping seat positions.
    pub fn map<U>(&self, mut f: impl FnMut(PlayerId, &T) -> U) -> PlayerMap<U> {
        PlayerMap::new(|p| f(p, self.get(p)))
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Where a seat is within the current round.
///
/// `Choose` → `Building` (to play code) or `Drawn` (took a card instead).
/// Execution is implicit once both seats are ready; every seat then returns
/// to `Choose`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    #[default]
    Choose,
    Building,
    Drawn,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::Choose => "choose",
            TurnPhase::Building => "building",
            TurnPhase::Drawn => "drawn",
        };
        f.write_str(name)
    }
}

/// Combat state for one seat.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Session-level identity (connection or account id).
    pub name: String,

    /// Cards in hand, in the order they were received.
    pub hand: Vec<CardInstance>,

    /// Hit points, `0..=max_hp`.
    pub hp: i32,

    /// Energy, `0..=max_energy`.
    pub energy: i32,

    pub turn_phase: TurnPhase,
    pub ready: bool,
    pub has_drawn: bool,

    /// Submitted program, authoritative for execution.
    pub program: Option<Program>,

    /// Live draft visible to the opponent before submission.
    pub preview: Option<Program>,

    /// Set by the defense scan of the last resolved round.
    pub has_hide: bool,
    /// Set by the defense scan of the last resolved round.
    pub dodges_remaining: u32,
}

impl PlayerState {
    /// Create a fresh seat at full HP and starting energy.
    #[must_use]
    pub fn new(name: impl Into<String>, config: &RulesConfig) -> Self {
        Self {
            name: name.into(),
            hand: Vec::new(),
            hp: config.max_hp,
            energy: config.starting_energy,
            turn_phase: TurnPhase::Choose,
            ready: false,
            has_drawn: false,
            program: None,
            preview: None,
            has_hide: false,
            dodges_remaining: 0,
        }
    }

    /// The program executed this round: the submission, else the preview.
    #[must_use]
    pub fn active_program(&self) -> Option<&Program> {
        self.program.as_ref().or(self.preview.as_ref())
    }

    /// Free hand slots under the configured maximum.
    #[must_use]
    pub fn hand_space(&self, config: &RulesConfig) -> usize {
        config.hand_max.saturating_sub(self.hand.len())
    }

    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}
