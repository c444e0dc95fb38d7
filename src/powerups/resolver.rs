//! Powerup effects.
//!
//! Program and preview are separate snapshots. Node effects rewrite each
//! copy that holds the target, so the two never share mutable state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::PowerupError;
use super::kind::PowerupKind;
use crate::cards::{CardCategory, CardInstance, CardKey};
use crate::core::{Game, PlayerId, PlayerState};
use crate::program::{NodeId, Program, ProgramNode, SubtreeIds};

/// What a successful powerup did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupOutcome {
    CapacityIncreased { node: NodeId, capacity: u8 },
    /// `kept` is false when the actor's hand was full and the card was discarded.
    CardStolen { card: CardInstance, kept: bool },
    CardDiscarded { card: CardInstance },
    Bugged { nodes: SubtreeIds },
    Debugged { nodes: SubtreeIds },
}

/// Play the first powerup with `key` from `actor`'s hand.
///
/// On success the card moves from hand to the discard pile. On failure
/// nothing changes.
pub fn apply_powerup(
    game: &mut Game,
    actor: PlayerId,
    key: &str,
    target: Option<&NodeId>,
) -> Result<PowerupOutcome, PowerupError> {
    let hand_index = game
        .player(actor)
        .hand
        .iter()
        .position(|c| c.key.as_str() == key)
        .ok_or_else(|| PowerupError::NotInHand(key.to_string()))?;
    let card = &game.player(actor).hand[hand_index];
    if card.category != CardCategory::Powerup {
        return Err(PowerupError::NotAPowerup(card.key.clone()));
    }
    let kind: PowerupKind = key.parse()?;

    let target = if kind.needs_target() {
        Some(target.ok_or(PowerupError::TargetRequired)?)
    } else {
        None
    };

    let outcome = match (kind, target) {
        (PowerupKind::CapacityIncrease, Some(id)) => capacity_increase(game, actor, id)?,
        (PowerupKind::DrawFromOpponent, _) => draw_from_opponent(game, actor)?,
        (PowerupKind::OpponentDiscard, _) => opponent_discard(game, actor)?,
        (PowerupKind::Bug, Some(id)) => set_bugged(game.player_mut(actor.opponent()), id, true)?,
        (PowerupKind::Debug, Some(id)) => set_bugged(game.player_mut(actor), id, false)?,
        (_, None) => return Err(PowerupError::TargetRequired),
    };

    let card = game.player_mut(actor).hand.remove(hand_index);
    debug!(game = %game.id, player = %actor, powerup = %kind, "powerup played");
    game.discard.push(card);
    Ok(outcome)
}

/// Find `id` in the program, falling back to the preview.
fn locate<'s>(state: &'s PlayerState, id: &NodeId) -> Option<(&'s Program, &'s ProgramNode)> {
    [state.program.as_ref(), state.preview.as_ref()]
        .into_iter()
        .flatten()
        .find_map(|program| program.find(id).map(|node| (program, node)))
}

/// Apply `rewrite` to every stored copy whose node `id` is still `card`
/// and passes `fits`. A copy that reuses the id for another block is left
/// alone.
fn rewrite_copies(
    state: &mut PlayerState,
    id: &NodeId,
    card: &CardKey,
    fits: impl Fn(&Program, &ProgramNode) -> bool,
    rewrite: impl Fn(&Program) -> Option<Program>,
) {
    for slot in [&mut state.program, &mut state.preview] {
        let updated = slot
            .as_ref()
            .filter(|p| p.find(id).is_some_and(|n| &n.card == card && fits(p, n)))
            .and_then(&rewrite);
        if let Some(updated) = updated {
            *slot = Some(updated);
        }
    }
}

fn capacity_increase(game: &mut Game, actor: PlayerId, id: &NodeId) -> Result<PowerupOutcome, PowerupError> {
    let max = game.config.max_capacity;
    let state = game.player_mut(actor);
    let (program, node) = locate(state, id).ok_or_else(|| PowerupError::TargetNotFound(id.clone()))?;
    if !node.is_container() {
        return Err(PowerupError::NotAContainer(id.clone()));
    }
    if node.capacity >= max {
        return Err(PowerupError::AlreadyAtMaxCapacity(id.clone()));
    }
    if program.is_nested(id) {
        return Err(PowerupError::NestedContainer(id.clone()));
    }
    let card = node.card.clone();

    rewrite_copies(
        state,
        id,
        &card,
        |p, n| n.is_container() && !p.is_nested(id),
        |p| p.update_node(id, |n| n.capacity = max),
    );
    Ok(PowerupOutcome::CapacityIncreased {
        node: id.clone(),
        capacity: max,
    })
}

fn draw_from_opponent(game: &mut Game, actor: PlayerId) -> Result<PowerupOutcome, PowerupError> {
    let card = take_random_opponent_card(game, actor)?;
    let kept = game.player(actor).hand_space(&game.config) > 0;
    if kept {
        game.player_mut(actor).hand.push(card.clone());
    } else {
        game.discard.push(card.clone());
    }
    Ok(PowerupOutcome::CardStolen { card, kept })
}

fn opponent_discard(game: &mut Game, actor: PlayerId) -> Result<PowerupOutcome, PowerupError> {
    let card = take_random_opponent_card(game, actor)?;
    game.discard.push(card.clone());
    Ok(PowerupOutcome::CardDiscarded { card })
}

fn take_random_opponent_card(game: &mut Game, actor: PlayerId) -> Result<CardInstance, PowerupError> {
    let len = game.player(actor.opponent()).hand.len();
    let index = game.rng_mut().pick_index(len).ok_or(PowerupError::OpponentHandEmpty)?;
    Ok(game.player_mut(actor.opponent()).hand.remove(index))
}

/// Bug (`bugged == true`, opponent's node) or debug (own node) a subtree.
fn set_bugged(state: &mut PlayerState, id: &NodeId, bugged: bool) -> Result<PowerupOutcome, PowerupError> {
    let (program, node) = locate(state, id).ok_or_else(|| PowerupError::TargetNotFound(id.clone()))?;
    match (bugged, node.bugged) {
        (true, true) => return Err(PowerupError::AlreadyBugged(id.clone())),
        (false, false) => return Err(PowerupError::NotBugged(id.clone())),
        _ => {}
    }
    let nodes = program.subtree_ids(id);
    let card = node.card.clone();

    rewrite_copies(state, id, &card, |_, _| true, |p| p.set_bugged_subtree(id, bugged));
    Ok(if bugged {
        PowerupOutcome::Bugged { nodes }
    } else {
        PowerupOutcome::Debugged { nodes }
    })
}
