//! Budgeted program interpreter.
//!
//! Walks a bug-filtered program top-to-bottom, left-to-right, running each
//! node's card script. Every executed op (and every loop iteration) costs
//! one unit of fuel; a pass that runs out is aborted with
//! `ExecutionError::BudgetExceeded`.
//!
//! The interpreter never touches game state. Energy is tracked in a local
//! working copy and returned in `ExecutionOutcome::final_energy` for the
//! orchestrator to commit.

use thiserror::Error;

use super::op::{Amount, Condition, ConditionSource, DefensiveEffect, Guard, Op, UnknownCondition};
use super::outcome::{ActorView, DefensiveContext, ExecutionMode, ExecutionOutcome};
use crate::cards::{CardKey, CardRegistry};
use crate::core::{PlayerId, RulesConfig};
use crate::events::NarrativeEvent;
use crate::program::{Program, ProgramNode};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("exceeded fuel budget of {fuel} operations")]
    BudgetExceeded { fuel: u32 },

    #[error("no definition for card '{0}'")]
    UnknownCard(CardKey),

    #[error("card '{card}' is missing parameter '{param}'")]
    MissingParam { card: CardKey, param: String },

    #[error("card '{card}' parameter '{param}' has the wrong type")]
    InvalidParam { card: CardKey, param: String },

    #[error(transparent)]
    UnknownCondition(#[from] UnknownCondition),
}

/// Runs programs against the card registry.
///
/// ```
/// use code_duel::cards::{CardRegistry, StandardCatalog};
/// use code_duel::core::{PlayerId, RulesConfig};
/// use code_duel::effects::{ActorView, DefensiveContext, ExecutionMode, Interpreter};
/// use code_duel::program::{NodeDraft, Program};
///
/// let registry = CardRegistry::from_catalog(&StandardCatalog);
/// let config = RulesConfig::default();
/// let program = Program::build(&[NodeDraft::new("attack")], &registry).unwrap();
///
/// let outcome = Interpreter::new(&registry, &config)
///     .execute(
///         &program,
///         PlayerId::FIRST,
///         ActorView { hp: 10, energy: 3 },
///         &DefensiveContext::default(),
///         ExecutionMode::Authoritative,
///     )
///     .unwrap();
///
/// assert_eq!(outcome.damage_dealt, 1);
/// assert_eq!(outcome.final_energy, 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Interpreter<'a> {
    registry: &'a CardRegistry,
    config: &'a RulesConfig,
}

impl<'a> Interpreter<'a> {
    #[must_use]
    pub fn new(registry: &'a CardRegistry, config: &'a RulesConfig) -> Self {
        Self { registry, config }
    }

    /// Execute `program` for `actor`.
    pub fn execute(
        &self,
        program: &Program,
        actor: PlayerId,
        view: ActorView,
        ctx: &DefensiveContext,
        mode: ExecutionMode,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let program = program.without_bugged();
        let mut run = Run::new(self, actor, view, ctx, mode);

        if program.is_empty() {
            run.line("no executable code (all blocks bugged)");
            run.events.push(NarrativeEvent::no_executable_code(actor));
            return Ok(run.finish());
        }

        for node in program.nodes() {
            run.exec_node(node)?;
        }

        if !mode.is_dry_run() {
            run.net_events();
        }
        Ok(run.finish())
    }
}

/// Mutable state of one execution pass.
struct Run<'i, 'a> {
    interpreter: &'i Interpreter<'a>,
    actor: PlayerId,
    mode: ExecutionMode,
    ctx: &'i DefensiveContext,

    hp: i32,
    energy: i32,
    fuel_left: u32,

    skip_attack: bool,
    last_attack_blocked: bool,
    successful_attack: bool,
    has_hide: bool,
    dodges: u32,
    damage: i32,
    healing: i32,
    draws: i32,
    energy_gained: i32,

    lines: Vec<String>,
    events: Vec<NarrativeEvent>,
}

impl<'i, 'a> Run<'i, 'a> {
    fn new(
        interpreter: &'i Interpreter<'a>,
        actor: PlayerId,
        view: ActorView,
        ctx: &'i DefensiveContext,
        mode: ExecutionMode,
    ) -> Self {
        Self {
            interpreter,
            actor,
            mode,
            ctx,
            hp: view.hp,
            energy: view.energy,
            fuel_left: interpreter.config.execution_fuel,
            skip_attack: ctx.has_energy_card,
            last_attack_blocked: false,
            successful_attack: false,
            has_hide: ctx.has_hide,
            dodges: ctx.dodges_remaining,
            damage: 0,
            healing: 0,
            draws: 0,
            energy_gained: 0,
            lines: Vec::new(),
            events: Vec::new(),
        }
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn tick(&mut self) -> Result<(), ExecutionError> {
        if self.fuel_left == 0 {
            return Err(ExecutionError::BudgetExceeded {
                fuel: self.interpreter.config.execution_fuel,
            });
        }
        self.fuel_left -= 1;
        Ok(())
    }

    fn exec_node(&mut self, node: &ProgramNode) -> Result<(), ExecutionError> {
        let definition = self
            .interpreter
            .registry
            .get(node.card.as_str())
            .ok_or_else(|| ExecutionError::UnknownCard(node.card.clone()))?;
        self.exec_ops(&definition.script, node)
    }

    fn exec_ops(&mut self, ops: &[Op], node: &ProgramNode) -> Result<(), ExecutionError> {
        ops.iter().try_for_each(|op| self.step(op, node))
    }

    fn step(&mut self, op: &Op, node: &ProgramNode) -> Result<(), ExecutionError> {
        self.tick()?;
        match op {
            Op::Attack(amount) => {
                let amount = self.amount(amount, node)?;
                self.attack(amount);
            }
            Op::Heal(amount) => {
                let amount = self.amount(amount, node)?;
                self.healing = self.healing.saturating_add(amount);
                self.line(format!("heal for {amount} HP"));
            }
            Op::GainEnergy(amount) => {
                let amount = self.amount(amount, node)?;
                self.gain_energy(amount);
            }
            Op::ConsumeEnergy(amount) => {
                let amount = self.amount(amount, node)?;
                self.consume_energy(amount);
            }
            Op::Draw(amount) => {
                let count = self.amount(amount, node)?;
                if !self.mode.is_dry_run() && count > 0 {
                    self.draws = self.draws.saturating_add(count);
                    self.line(format!("will draw {count} card(s)"));
                }
            }
            Op::Register(effect) => self.register(*effect),
            Op::When { guard, then } => {
                if self.guard(guard, node)? {
                    self.exec_ops(then, node)?;
                }
            }
            Op::Repeat { times, body } => {
                let times = self.amount(times, node)?;
                for _ in 0..times {
                    self.tick()?;
                    self.exec_ops(body, node)?;
                }
            }
            Op::Body => {
                for child in &node.children {
                    self.exec_node(child)?;
                }
            }
        }
        Ok(())
    }

    fn amount(&self, amount: &Amount, node: &ProgramNode) -> Result<i32, ExecutionError> {
        let value = match amount {
            Amount::Fixed(v) => *v,
            Amount::CurrentEnergy => self.energy,
            Amount::Param(name) => {
                let value = node.params.get(name).ok_or_else(|| ExecutionError::MissingParam {
                    card: node.card.clone(),
                    param: name.clone(),
                })?;
                let value = value.as_int().ok_or_else(|| ExecutionError::InvalidParam {
                    card: node.card.clone(),
                    param: name.clone(),
                })?;
                i32::try_from(value).unwrap_or(if value < 0 { 0 } else { i32::MAX })
            }
        };
        Ok(value.max(0))
    }

    fn guard(&mut self, guard: &Guard, node: &ProgramNode) -> Result<bool, ExecutionError> {
        match guard {
            Guard::HasEnergy(amount) => {
                let required = self.amount(amount, node)?;
                Ok(self.has_energy(required))
            }
            Guard::ConsumeEnergy(amount) => {
                let amount = self.amount(amount, node)?;
                Ok(self.consume_energy(amount))
            }
            Guard::Condition(source) => {
                let condition = match source {
                    ConditionSource::Fixed(c) => *c,
                    ConditionSource::Param(name) => node
                        .params
                        .get_text(name)
                        .ok_or_else(|| ExecutionError::MissingParam {
                            card: node.card.clone(),
                            param: name.clone(),
                        })?
                        .parse::<Condition>()?,
                };
                Ok(self.check(condition))
            }
        }
    }

    fn check(&self, condition: Condition) -> bool {
        match condition {
            Condition::HealthBelow3 => self.hp < 3,
            Condition::HealthBelow5 => self.hp < 5,
            Condition::NoEnergy => self.energy == 0,
            Condition::SuccessfulAttackThisRound => self.successful_attack,
            Condition::OpponentAttackedThisRound => self.ctx.opponent_attacked,
            Condition::DamageTakenAboveZero => self.ctx.damage_taken > 0,
        }
    }

    fn has_energy(&mut self, required: i32) -> bool {
        if self.energy >= required {
            return true;
        }
        self.line(format!("insufficient energy: need {required}, have {}", self.energy));
        self.events
            .push(NarrativeEvent::insufficient_energy(self.actor, required, self.energy));
        false
    }

    fn attack(&mut self, amount: i32) {
        if self.skip_attack {
            self.line("cannot attack (energy card used)");
            self.events.push(NarrativeEvent::attack_blocked(self.actor));
            self.last_attack_blocked = true;
            return;
        }
        self.damage = self.damage.saturating_add(amount);
        self.successful_attack = true;
        self.last_attack_blocked = false;
        self.line(format!("attack for {amount} damage"));
    }

    fn gain_energy(&mut self, amount: i32) {
        if !self.mode.is_dry_run() {
            self.energy = self.energy.saturating_add(amount).min(self.interpreter.config.max_energy);
        }
        self.skip_attack = true;
        self.damage = 0;
        self.successful_attack = false;
        self.energy_gained = self.energy_gained.saturating_add(amount);
        self.line(format!("gained {amount} energy, attacks this round canceled"));
    }

    fn consume_energy(&mut self, amount: i32) -> bool {
        // A blocked attack voids the energy payment that follows it.
        if self.last_attack_blocked {
            self.last_attack_blocked = false;
            self.line("cannot consume energy (attack was blocked by energy card)");
            return false;
        }
        if self.energy < amount {
            self.line(format!("insufficient energy: need {amount}, have {}", self.energy));
            self.events.push(NarrativeEvent::consume_failed(self.actor));
            return false;
        }
        let before = self.energy;
        if !self.mode.is_dry_run() {
            self.energy -= amount;
        }
        self.line(format!("consumed {amount} energy ({before} -> {})", self.energy));
        true
    }

    fn register(&mut self, effect: DefensiveEffect) {
        match effect {
            DefensiveEffect::DodgeOne => {
                self.dodges = self.dodges.saturating_add(1);
                self.line("registered dodge");
                self.events.push(NarrativeEvent::dodge(self.actor));
            }
            DefensiveEffect::DodgeAll => {
                self.has_hide = true;
                self.line("registered hide");
                self.events.push(NarrativeEvent::hide(self.actor));
            }
        }
    }

    fn net_events(&mut self) {
        if self.energy_gained > 0 && self.damage == 0 {
            self.events.push(NarrativeEvent::energy_surge(self.actor));
        }
        if self.damage > 0 {
            self.events
                .push(NarrativeEvent::attack(self.actor, self.actor.opponent()));
        }
    }

    fn finish(self) -> ExecutionOutcome {
        ExecutionOutcome {
            damage_dealt: self.damage,
            healing_requested: self.healing,
            draws_requested: self.draws,
            energy_gained: self.energy_gained,
            final_energy: self.energy,
            skip_attack: self.skip_attack,
            has_hide: self.has_hide,
            dodges_registered: self.dodges,
            successful_attack: self.successful_attack,
            fuel_used: self.interpreter.config.execution_fuel - self.fuel_left,
            lines: self.lines,
            events: self.events,
        }
    }
}
