//! Card script AST.
//!
//! A card's behavior is a short list of `Op`s. Scripts are data: the
//! interpreter walks them, the defense scan inspects them, and nothing ever
//! generates or evaluates code text.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// A numeric operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    /// Looked up in the executing node's merged parameters.
    Param(String),
    /// The actor's working energy at the moment of evaluation.
    CurrentEnergy,
}

impl Amount {
    pub fn param(name: impl Into<String>) -> Self {
        Amount::Param(name.into())
    }
}

/// Read-only predicates over combat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    HealthBelow3,
    HealthBelow5,
    NoEnergy,
    /// An attack landed earlier in this same execution.
    SuccessfulAttackThisRound,
    OpponentAttackedThisRound,
    DamageTakenAboveZero,
}

impl Condition {
    pub const ALL: [Condition; 6] = [
        Condition::HealthBelow3,
        Condition::HealthBelow5,
        Condition::NoEnergy,
        Condition::SuccessfulAttackThisRound,
        Condition::OpponentAttackedThisRound,
        Condition::DamageTakenAboveZero,
    ];

    /// Name used in card parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Condition::HealthBelow3 => "health_below_3",
            Condition::HealthBelow5 => "health_below_5",
            Condition::NoEnergy => "no_energy",
            Condition::SuccessfulAttackThisRound => "success_attack_this_round",
            Condition::OpponentAttackedThisRound => "opponent_attacked_this_round",
            Condition::DamageTakenAboveZero => "damage_taken_gt_0",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown condition '{0}'")]
pub struct UnknownCondition(pub String);

impl FromStr for Condition {
    type Err = UnknownCondition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Condition::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCondition(s.to_string()))
    }
}

/// Where a `Guard::Condition` gets its predicate from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionSource {
    Fixed(Condition),
    /// Parameter holding a condition name (the `if` card's `condition`).
    Param(String),
}

/// Defensive effects a program can register for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefensiveEffect {
    /// Cancel one point of incoming damage.
    DodgeOne,
    /// Cancel all incoming damage.
    DodgeAll,
}

/// Boolean test gating a `When` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Guard {
    /// Inspect energy without spending it.
    HasEnergy(Amount),
    /// Spend energy; false when it could not be spent.
    ConsumeEnergy(Amount),
    Condition(ConditionSource),
}

/// A primitive operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Attack(Amount),
    Heal(Amount),
    GainEnergy(Amount),
    /// Spend energy, ignoring whether it succeeded.
    ConsumeEnergy(Amount),
    Draw(Amount),
    Register(DefensiveEffect),
    When { guard: Guard, then: Vec<Op> },
    Repeat { times: Amount, body: Vec<Op> },
    /// Executes the node's children in order. Only meaningful in container scripts.
    Body,
}

impl Op {
    /// Visit this op and every op nested inside it, pre-order.
    pub fn visit<F: FnMut(&Op)>(&self, f: &mut F) {
        f(self);
        match self {
            Op::When { then: ops, .. } | Op::Repeat { body: ops, .. } => {
                for op in ops {
                    op.visit(f);
                }
            }
            _ => {}
        }
    }

    /// Whether any op in `script` satisfies `pred`.
    pub fn any_in(script: &[Op], mut pred: impl FnMut(&Op) -> bool) -> bool {
        let mut found = false;
        for op in script {
            op.visit(&mut |o| found |= pred(o));
        }
        found
    }
}
