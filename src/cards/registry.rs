//! Card registry for definition lookup.
//!
//! The `CardRegistry` holds every card definition the catalog supplied.
//! Program construction, the interpreter, and the defense scan all resolve
//! card keys here; nothing downstream re-interprets a key.

use rustc_hash::FxHashMap;

use super::catalog::CardCatalog;
use super::definition::{CardCategory, CardDefinition, CardKey};

/// Registry of card definitions keyed by `CardKey`.
///
/// ## Example
///
/// ```
/// use code_duel::cards::{CardRegistry, StandardCatalog};
///
/// let registry = CardRegistry::from_catalog(&StandardCatalog);
/// let attack = registry.get("attack").unwrap();
/// assert_eq!(attack.name, "Attack");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardKey, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every definition a catalog provides.
    #[must_use]
    pub fn from_catalog(catalog: &dyn CardCatalog) -> Self {
        let mut registry = Self::new();
        for card in catalog.all_cards() {
            registry.register(card);
        }
        registry
    }

    /// Register a card definition, returning any definition it replaced.
    pub fn register(&mut self, card: CardDefinition) -> Option<CardDefinition> {
        self.cards.insert(card.key.clone(), card)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&CardDefinition> {
        self.cards.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cards.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values()
    }

    /// Find cards by category.
    pub fn find_by_category(&self, category: CardCategory) -> impl Iterator<Item = &CardDefinition> {
        self.cards.values().filter(move |c| c.category == category)
    }
}
