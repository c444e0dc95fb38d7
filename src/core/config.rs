//! Rules configuration.
//!
//! All numeric limits the engine enforces live in `RulesConfig`. The engine
//! never hardcodes HP, energy, hand size, or program size; callers build a
//! config (usually `RulesConfig::default()`) and pass it in.

use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Numeric limits for a duel.
///
/// ## Example
///
/// ```
/// use code_duel::core::RulesConfig;
///
/// let config = RulesConfig::from_json(r#"{ "max_hp": 15 }"#).unwrap();
/// assert_eq!(config.max_hp, 15);
/// assert_eq!(config.hand_max, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Starting and maximum hit points.
    pub max_hp: i32,

    /// Energy each seat starts the game with.
    pub starting_energy: i32,

    /// Energy ceiling; gains past it are discarded.
    pub max_energy: i32,

    /// Maximum cards in hand.
    pub hand_max: usize,

    /// Cards dealt to each seat when the game starts.
    pub starting_hand: usize,

    /// Maximum total nodes (including nested) in one program.
    pub max_program_nodes: usize,

    /// Capacity a container reaches after an upgrade.
    pub max_capacity: u8,

    /// Operations one program execution may perform before it is aborted.
    pub execution_fuel: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_hp: 10,
            starting_energy: 3,
            max_energy: 3,
            hand_max: 5,
            starting_hand: 3,
            max_program_nodes: 5,
            max_capacity: 2,
            execution_fuel: 256,
        }
    }
}

impl RulesConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        serde_json::from_str(json).map_err(|e| GameError::Config(e.to_string()))
    }

    /// Set the execution fuel (builder pattern).
    #[must_use]
    pub fn with_execution_fuel(mut self, fuel: u32) -> Self {
        self.execution_fuel = fuel;
        self
    }
}
