//! Interpreter inputs and results.

use serde::{Deserialize, Serialize};

use crate::events::NarrativeEvent;

/// Whether an execution pass may change the actor's energy and draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// Lookahead: intended damage only, no energy change, no draws.
    DryRun,
    Authoritative,
}

impl ExecutionMode {
    #[must_use]
    pub const fn is_dry_run(self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

/// Actor combat state visible to a program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorView {
    pub hp: i32,
    pub energy: i32,
}

/// Per-round flags seeded by the orchestrator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensiveContext {
    pub has_hide: bool,
    pub dodges_remaining: u32,
    /// Energy cards suppress every attack of the same program.
    pub has_energy_card: bool,
    pub opponent_attacked: bool,
    pub opponent_damage: i32,
    /// Opponent's intended damage after this actor's own defenses.
    pub damage_taken: i32,
}

/// Aggregated effects of one execution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub damage_dealt: i32,
    pub healing_requested: i32,
    pub draws_requested: i32,
    pub energy_gained: i32,
    /// Working energy when the pass ended. Equals the input energy on a dry run.
    pub final_energy: i32,
    pub skip_attack: bool,
    pub has_hide: bool,
    pub dodges_registered: u32,
    pub successful_attack: bool,
    pub fuel_used: u32,
    pub lines: Vec<String>,
    pub events: Vec<NarrativeEvent>,
}

impl ExecutionOutcome {
    #[must_use]
    pub fn attacked(&self) -> bool {
        self.damage_dealt > 0
    }
}
