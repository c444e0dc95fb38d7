//! Card instances - individual copies in a deck, hand, or discard pile.
//!
//! Two copies of the same card share a `CardKey` but never an
//! `InstanceId`, so the UI and the powerup resolver can tell duplicates
//! apart.

use serde::{Deserialize, Serialize};

use super::definition::{CardCategory, CardDefinition, CardKey};
use super::params::Params;

/// Unique identifier of one physical card within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// Allocates instance ids for one game's deck.
#[derive(Clone, Debug, Default)]
pub struct InstanceIdAllocator {
    next: u64,
}

impl InstanceIdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self) -> InstanceId {
        let id = InstanceId(self.next);
        self.next += 1;
        id
    }
}

/// A single card copy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub instance_id: InstanceId,
    pub key: CardKey,
    pub name: String,
    pub category: CardCategory,

    /// Variation label from the deck composition (e.g. `"loop_3"`).
    pub variation: Option<String>,

    /// Definition defaults overlaid with the variation's parameters.
    pub params: Params,
}

impl CardInstance {
    /// Materialize a copy of `definition` with variation parameters applied.
    #[must_use]
    pub fn from_definition(
        instance_id: InstanceId,
        definition: &CardDefinition,
        variation: Option<String>,
        params: &Params,
    ) -> Self {
        Self {
            instance_id,
            key: definition.key.clone(),
            name: definition.name.clone(),
            category: definition.category,
            variation,
            params: definition.defaults.merged(params),
        }
    }

    #[must_use]
    pub fn is_powerup(&self) -> bool {
        self.category == CardCategory::Powerup
    }
}
