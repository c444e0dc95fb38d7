//! Card catalog: the read-only source of card definitions and deck
//! composition.
//!
//! The engine never stores card data itself. A `CardCatalog` hands out
//! definitions (loaded into a `CardRegistry`) and the weighted deck
//! composition used by `build_deck`. `StandardCatalog` is the built-in
//! card set.

use im::Vector;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::definition::{CardCategory, CardDefinition, CardKey, Rarity};
use super::instance::{CardInstance, InstanceIdAllocator};
use super::params::Params;
use super::registry::CardRegistry;
use crate::core::GameRng;
use crate::effects::{Amount, Condition, ConditionSource, DefensiveEffect, Guard, Op};
use crate::program::ContainerKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("deck composition references unknown card '{0}'")]
    UnknownCard(CardKey),

    #[error("deck composition produced an empty deck")]
    EmptyDeck,
}

/// One row of the deck composition: `quantity` copies of a card variation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card_key: CardKey,
    pub variation: Option<String>,
    #[serde(default)]
    pub params: Params,
    pub quantity: u32,
}

impl DeckEntry {
    #[must_use]
    pub fn new(card_key: impl Into<String>, quantity: u32) -> Self {
        Self {
            card_key: CardKey::new(card_key),
            variation: None,
            params: Params::new(),
            quantity,
        }
    }

    #[must_use]
    pub fn variation(mut self, label: impl Into<String>, params: Params) -> Self {
        self.variation = Some(label.into());
        self.params = params;
        self
    }
}

/// Read-only card data source.
pub trait CardCatalog: Send + Sync {
    /// Every card definition the catalog knows about.
    fn all_cards(&self) -> Vec<CardDefinition>;

    /// Weighted deck composition.
    fn deck_composition(&self) -> Vec<DeckEntry>;
}

/// Materialize a shuffled deck: one instance per quantity unit, each with a
/// unique instance id. The front of the returned vector is the top card.
pub fn build_deck(
    catalog: &dyn CardCatalog,
    registry: &CardRegistry,
    rng: &mut GameRng,
) -> Result<Vector<CardInstance>, CatalogError> {
    let mut ids = InstanceIdAllocator::new();
    let mut cards = Vec::new();

    for entry in catalog.deck_composition() {
        let definition = registry
            .get(entry.card_key.as_str())
            .ok_or_else(|| CatalogError::UnknownCard(entry.card_key.clone()))?;
        for _ in 0..entry.quantity {
            cards.push(CardInstance::from_definition(
                ids.alloc(),
                definition,
                entry.variation.clone(),
                &entry.params,
            ));
        }
    }

    if cards.is_empty() {
        return Err(CatalogError::EmptyDeck);
    }

    rng.shuffle(&mut cards);
    Ok(cards.into_iter().collect())
}

/// The built-in card set.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardCatalog;

impl StandardCatalog {
    fn powerup(key: &str, name: &str, description: &str) -> CardDefinition {
        CardDefinition::new(key, name, CardCategory::Powerup)
            .with_description(description)
            .with_rarity(Rarity::Uncommon)
    }
}

impl CardCatalog for StandardCatalog {
    fn all_cards(&self) -> Vec<CardDefinition> {
        let one = Amount::Fixed(1);
        vec![
            CardDefinition::new("attack", "Attack", CardCategory::Action)
                .with_description("Deal damage to the opponent for 1 energy.")
                .with_default("damage", 1)
                .with_script(vec![Op::When {
                    guard: Guard::HasEnergy(one.clone()),
                    then: vec![Op::Attack(Amount::param("damage")), Op::ConsumeEnergy(one.clone())],
                }]),
            CardDefinition::new("healing", "Heal", CardCategory::Action)
                .with_description("Restore health, paid for with energy.")
                .with_default("amount", 1)
                .with_script(vec![Op::When {
                    guard: Guard::HasEnergy(one.clone()),
                    then: vec![Op::Heal(Amount::param("amount"))],
                }]),
            CardDefinition::new("energy", "Energy", CardCategory::Action)
                .with_description("Gain energy. Cancels this round's attacks.")
                .with_default("amount", 1)
                .with_script(vec![Op::GainEnergy(Amount::param("amount"))]),
            CardDefinition::new("dodge", "Dodge", CardCategory::Action)
                .with_description("Spend 1 energy to cancel 1 incoming damage.")
                .with_script(vec![Op::When {
                    guard: Guard::ConsumeEnergy(one),
                    then: vec![Op::Register(DefensiveEffect::DodgeOne)],
                }]),
            CardDefinition::new("hide", "Hide", CardCategory::Action)
                .with_description("If attacked, spend all energy to avoid all damage.")
                .with_rarity(Rarity::Rare)
                .with_script(vec![Op::When {
                    guard: Guard::Condition(ConditionSource::Fixed(Condition::OpponentAttackedThisRound)),
                    then: vec![
                        Op::ConsumeEnergy(Amount::CurrentEnergy),
                        Op::Register(DefensiveEffect::DodgeAll),
                    ],
                }]),
            CardDefinition::new("draw", "Draw", CardCategory::Action)
                .with_description("Draw cards at the end of the round.")
                .with_default("count", 1)
                .with_script(vec![Op::Draw(Amount::param("count"))]),
            CardDefinition::container("for_loop", "For Loop", ContainerKind::ForLoop)
                .with_description("Repeat the nested blocks.")
                .with_default("count", 2)
                .with_script(vec![Op::Repeat {
                    times: Amount::param("count"),
                    body: vec![Op::Body],
                }]),
            CardDefinition::container("if", "If", ContainerKind::If)
                .with_description("Run the nested blocks when the condition holds.")
                .with_default("condition", Condition::HealthBelow5.as_str())
                .with_script(vec![Op::When {
                    guard: Guard::Condition(ConditionSource::Param("condition".into())),
                    then: vec![Op::Body],
                }]),
            Self::powerup(
                "capacity_increase",
                "Capacity Increase",
                "Give one of your top-level containers a second slot.",
            ),
            Self::powerup(
                "draw_from_opponent",
                "Pickpocket",
                "Take a random card from the opponent's hand.",
            ),
            Self::powerup(
                "opponent_discard",
                "Discard",
                "The opponent discards a random card.",
            ),
            Self::powerup("bug", "Bug", "Disable an opponent block and everything inside it."),
            Self::powerup("debug", "Debug", "Re-enable one of your bugged blocks."),
        ]
    }

    fn deck_composition(&self) -> Vec<DeckEntry> {
        let condition = |c: Condition| Params::new().with("condition", c.as_str());
        vec![
            DeckEntry::new("attack", 8),
            DeckEntry::new("healing", 5),
            DeckEntry::new("energy", 4),
            DeckEntry::new("dodge", 4),
            DeckEntry::new("hide", 2),
            DeckEntry::new("draw", 3),
            DeckEntry::new("for_loop", 3).variation("loop_2", Params::new().with("count", 2)),
            DeckEntry::new("for_loop", 2).variation("loop_3", Params::new().with("count", 3)),
            DeckEntry::new("if", 2).variation("if_health_below_5", condition(Condition::HealthBelow5)),
            DeckEntry::new("if", 1).variation("if_health_below_3", condition(Condition::HealthBelow3)),
            DeckEntry::new("if", 1).variation("if_no_energy", condition(Condition::NoEnergy)),
            DeckEntry::new("if", 1).variation("if_damage_taken", condition(Condition::DamageTakenAboveZero)),
            DeckEntry::new("capacity_increase", 2),
            DeckEntry::new("draw_from_opponent", 2),
            DeckEntry::new("opponent_discard", 2),
            DeckEntry::new("bug", 2),
            DeckEntry::new("debug", 2),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustc_hash::FxHashSet;

    struct EmptyCatalog;

    impl CardCatalog for EmptyCatalog {
        fn all_cards(&self) -> Vec<CardDefinition> {
            StandardCatalog.all_cards()
        }

        fn deck_composition(&self) -> Vec<DeckEntry> {
            vec![DeckEntry::new("attack", 0)]
        }
    }

    struct BrokenCatalog;

    impl CardCatalog for BrokenCatalog {
        fn all_cards(&self) -> Vec<CardDefinition> {
            Vec::new()
        }

        fn deck_composition(&self) -> Vec<DeckEntry> {
            vec![DeckEntry::new("attack", 1)]
        }
    }

    #[test]
    fn test_standard_deck_has_unique_instances() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let mut rng = GameRng::new(42);
        let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();

        let expected: u32 = StandardCatalog.deck_composition().iter().map(|e| e.quantity).sum();
        assert_eq!(deck.len(), expected as usize);

        let ids: FxHashSet<_> = deck.iter().map(|c| c.instance_id).collect();
        assert_eq!(ids.len(), deck.len());
    }

    #[test]
    fn test_variation_params_reach_instances() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let deck = build_deck(&StandardCatalog, &registry, &mut GameRng::new(1)).unwrap();

        let loop_3 = deck
            .iter()
            .find(|c| c.variation.as_deref() == Some("loop_3"))
            .unwrap();
        assert_eq!(loop_3.params.get_int("count"), Some(3));
    }

    #[test]
    fn test_same_seed_same_deck() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let a = build_deck(&StandardCatalog, &registry, &mut GameRng::new(9)).unwrap();
        let b = build_deck(&StandardCatalog, &registry, &mut GameRng::new(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_composition_is_rejected() {
        let registry = CardRegistry::from_catalog(&EmptyCatalog);
        let err = build_deck(&EmptyCatalog, &registry, &mut GameRng::new(0)).unwrap_err();
        assert_eq!(err, CatalogError::EmptyDeck);
    }

    #[test]
    fn test_unknown_card_is_rejected() {
        let registry = CardRegistry::from_catalog(&BrokenCatalog);
        let err = build_deck(&BrokenCatalog, &registry, &mut GameRng::new(0)).unwrap_err();
        assert_eq!(err, CatalogError::UnknownCard(CardKey::new("attack")));
    }
}
