//! Round resolution and turn actions.
//!
//! - `RoundEngine`: the five-phase simultaneous resolution
//! - `DefenseScan`: static lookahead over a program's cards
//! - `turn`: phase-gated seat actions (draw, build, ready, submit)
//! - `GameResult` / `RoundReport`: what a round produced

pub mod defense;
pub mod engine;
pub mod result;
pub mod turn;

pub use defense::DefenseScan;
pub use engine::RoundEngine;
pub use result::{GameResult, RoundOutcome, RoundReport};
pub use turn::{
    choose_build, discard_card, draw_card, ensure_can_ready, set_ready, submit_preview, submit_program,
};
