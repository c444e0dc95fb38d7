//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card type, as
//! supplied by the catalog: its key, category, script, default
//! parameters, and base capacity. Per-copy data (instance id, variation
//! parameters) lives in `CardInstance`.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;

use super::params::{ParamValue, Params};
use crate::effects::Op;
use crate::program::ContainerKind;

/// Unique symbolic identifier of a card definition (`"attack"`, `"for_loop"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardKey(String);

impl CardKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CardKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for CardKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of card this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCategory {
    /// A program block performing primitive operations.
    Action,
    /// A program block that only reads combat state.
    Condition,
    /// A program block holding nested blocks (`for_loop`, `if`).
    Container,
    /// Played directly from hand, never placed in a program.
    Powerup,
}

impl CardCategory {
    /// Whether cards of this category can be placed in a program.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        !matches!(self, CardCategory::Powerup)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use code_duel::cards::{CardCategory, CardDefinition};
/// use code_duel::effects::{Amount, Op};
///
/// let strike = CardDefinition::new("strike", "Strike", CardCategory::Action)
///     .with_script(vec![Op::Attack(Amount::param("damage"))])
///     .with_default("damage", 2);
///
/// assert_eq!(strike.defaults.get_int("damage"), Some(2));
/// assert!(strike.container.is_none());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub key: CardKey,

    /// Card name (for display).
    pub name: String,

    pub category: CardCategory,

    #[serde(default)]
    pub description: String,

    /// Operations run when a program node of this card executes.
    pub script: Vec<Op>,

    /// Parameter values used when a node does not override them.
    #[serde(default)]
    pub defaults: Params,

    /// Set for container cards.
    pub container: Option<ContainerKind>,

    /// Direct-child slots a fresh container node gets.
    pub base_capacity: u8,

    #[serde(default)]
    pub rarity: Rarity,
}

impl CardDefinition {
    /// Create a definition with an empty script.
    #[must_use]
    pub fn new(key: impl Into<String>, name: impl Into<String>, category: CardCategory) -> Self {
        Self {
            key: CardKey::new(key),
            name: name.into(),
            category,
            description: String::new(),
            script: Vec::new(),
            defaults: Params::new(),
            container: None,
            base_capacity: 0,
            rarity: Rarity::Common,
        }
    }

    /// Create a container definition with capacity 1.
    #[must_use]
    pub fn container(key: impl Into<String>, name: impl Into<String>, kind: ContainerKind) -> Self {
        let mut def = Self::new(key, name, CardCategory::Container);
        def.container = Some(kind);
        def.base_capacity = 1;
        def
    }

    #[must_use]
    pub fn with_script(mut self, script: Vec<Op>) -> Self {
        self.script = script;
        self
    }

    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.defaults.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_rarity(mut self, rarity: Rarity) -> Self {
        self.rarity = rarity;
        self
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }
}
