//! Card scripts and their interpreter.
//!
//! - `Op`: primitive operations a card script is made of
//! - `Guard`, `Amount`, `Condition`: operands of those operations
//! - `Interpreter`: runs a program under a fuel budget
//! - `ExecutionOutcome`: aggregated effects of one pass
//!
//! ## Design Philosophy
//!
//! Scripts are data. A card's behavior is a closed tagged union that the
//! interpreter matches on, so there is no code text to build or sandbox.
//! The interpreter reports intended effects; the round engine decides
//! what actually happens to HP, energy, and hands.

mod interpreter;
mod op;
mod outcome;

pub use interpreter::{ExecutionError, Interpreter};
pub use op::{Amount, Condition, ConditionSource, DefensiveEffect, Guard, Op, UnknownCondition};
pub use outcome::{ActorView, DefensiveContext, ExecutionMode, ExecutionOutcome};
