//! Phase 1 lookahead: which defensive and energy cards a program holds.
//!
//! The scan reads card scripts without executing them. Bugged subtrees are
//! skipped.

use serde::{Deserialize, Serialize};

use crate::cards::CardRegistry;
use crate::effects::{DefensiveContext, DefensiveEffect, Op};
use crate::program::Program;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseScan {
    pub has_hide: bool,
    /// One per dodge card.
    pub dodges: u32,
    pub has_energy_card: bool,
}

impl DefenseScan {
    #[must_use]
    pub fn of(program: Option<&Program>, registry: &CardRegistry) -> Self {
        let mut scan = Self::default();
        let Some(program) = program else {
            return scan;
        };

        program.without_bugged().visit(|node, _| {
            let Some(definition) = registry.get(node.card.as_str()) else {
                return;
            };
            let script = &definition.script;
            if Op::any_in(script, |op| matches!(op, Op::Register(DefensiveEffect::DodgeAll))) {
                scan.has_hide = true;
            }
            if Op::any_in(script, |op| matches!(op, Op::Register(DefensiveEffect::DodgeOne))) {
                scan.dodges += 1;
            }
            if Op::any_in(script, |op| matches!(op, Op::GainEnergy(_))) {
                scan.has_energy_card = true;
            }
        });
        scan
    }

    /// Incoming damage left after this seat's hide or dodges.
    #[must_use]
    pub fn mitigate(&self, damage: i32) -> i32 {
        if self.has_hide {
            return 0;
        }
        let blocked = i32::try_from(self.dodges).unwrap_or(i32::MAX).min(damage);
        (damage - blocked).max(0)
    }

    /// Context for the dry run, before anything is known about the opponent.
    #[must_use]
    pub fn context(&self) -> DefensiveContext {
        DefensiveContext {
            has_hide: self.has_hide,
            dodges_remaining: self.dodges,
            has_energy_card: self.has_energy_card,
            ..DefensiveContext::default()
        }
    }
}
