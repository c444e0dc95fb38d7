//! Per-seat turn actions, gated by the seat's `TurnPhase`.
//!
//! Every action checks its preconditions before touching state, so a
//! rejected request leaves the game unchanged.

use tracing::debug;

use crate::cards::{CardInstance, CardRegistry};
use crate::core::{Game, GameError, PlayerId, TurnPhase};
use crate::program::{ensure_ready, validate, NodeDraft, Program};

fn ensure_running(game: &Game) -> Result<(), GameError> {
    if game.is_over() {
        Err(GameError::GameOver)
    } else {
        Ok(())
    }
}

fn ensure_phase(game: &Game, player: PlayerId, action: &'static str, expected: TurnPhase) -> Result<(), GameError> {
    let actual = game.player(player).turn_phase;
    if actual == expected {
        Ok(())
    } else {
        Err(GameError::WrongPhase {
            action,
            expected,
            actual,
        })
    }
}

/// Draw the top card instead of building this round.
pub fn draw_card(game: &mut Game, player: PlayerId) -> Result<CardInstance, GameError> {
    ensure_running(game)?;
    ensure_phase(game, player, "draw", TurnPhase::Choose)?;
    let state = game.player(player);
    if state.has_drawn {
        return Err(GameError::AlreadyDrew);
    }
    if state.hand_space(&game.config) == 0 {
        return Err(GameError::HandFull);
    }

    let card = game.deck.pop_front().ok_or(GameError::DeckEmpty)?;
    let state = game.player_mut(player);
    state.hand.push(card.clone());
    state.has_drawn = true;
    state.turn_phase = TurnPhase::Drawn;
    debug!(game = %game.id, %player, card = %card.key, "card drawn");
    Ok(card)
}

/// Commit to building a program this round.
pub fn choose_build(game: &mut Game, player: PlayerId) -> Result<(), GameError> {
    ensure_running(game)?;
    ensure_phase(game, player, "choose build", TurnPhase::Choose)?;
    game.player_mut(player).turn_phase = TurnPhase::Building;
    Ok(())
}

/// Check that a seat could be marked ready now, without marking it.
pub fn ensure_can_ready(game: &Game, player: PlayerId) -> Result<(), GameError> {
    ensure_running(game)?;
    if let Some(program) = game.player(player).active_program() {
        ensure_ready(program)?;
    }
    Ok(())
}

/// Mark a seat ready (or not). A seat cannot become ready while its
/// program has an empty container.
pub fn set_ready(game: &mut Game, player: PlayerId, ready: bool) -> Result<(), GameError> {
    if ready {
        ensure_can_ready(game, player)?;
    } else {
        ensure_running(game)?;
    }
    game.player_mut(player).ready = ready;
    Ok(())
}

/// Move a hand card to the discard pile.
pub fn discard_card(game: &mut Game, player: PlayerId, hand_index: usize) -> Result<CardInstance, GameError> {
    ensure_running(game)?;
    let hand = &mut game.player_mut(player).hand;
    if hand_index >= hand.len() {
        return Err(GameError::InvalidHandIndex(hand_index));
    }
    let card = hand.remove(hand_index);
    game.discard.push(card.clone());
    Ok(card)
}

/// Resolve the drafts, carry bug marks and capacity upgrades over from the
/// stored snapshots, then validate.
fn prepare(game: &Game, player: PlayerId, drafts: &[NodeDraft], registry: &CardRegistry) -> Result<Program, GameError> {
    let program = Program::build(drafts, registry)?;

    let state = game.player(player);
    let program = [state.program.as_ref(), state.preview.as_ref()]
        .into_iter()
        .flatten()
        .fold(program, |p, previous| p.carry_over_from(previous));
    validate(&program, &game.config)?;
    Ok(program)
}

/// Submit a program. It becomes both the executed program and the preview.
pub fn submit_program(
    game: &mut Game,
    player: PlayerId,
    drafts: &[NodeDraft],
    registry: &CardRegistry,
) -> Result<(), GameError> {
    ensure_running(game)?;
    let program = prepare(game, player, drafts, registry)?;
    debug!(game = %game.id, %player, nodes = program.count_nodes(), "program submitted");

    let state = game.player_mut(player);
    state.preview = Some(program.clone());
    state.program = Some(program);
    Ok(())
}

/// Update the live preview while building.
pub fn submit_preview(
    game: &mut Game,
    player: PlayerId,
    drafts: &[NodeDraft],
    registry: &CardRegistry,
) -> Result<(), GameError> {
    ensure_running(game)?;
    if game.player(player).ready {
        return Err(GameError::AlreadyReady(player));
    }
    ensure_phase(game, player, "preview", TurnPhase::Building)?;
    let program = prepare(game, player, drafts, registry)?;
    game.player_mut(player).preview = Some(program);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{build_deck, StandardCatalog};
    use crate::core::{GameId, GameRng, RulesConfig};
    use crate::program::{NodeId, ValidationError};

    fn setup() -> (CardRegistry, Game) {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let mut rng = GameRng::new(5);
        let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();
        let game = Game::new(GameId::new("g"), ["a".into(), "b".into()], deck, RulesConfig::default(), rng);
        (registry, game)
    }

    #[test]
    fn test_draw_once_per_round() {
        let (_, mut game) = setup();
        let top = game.deck[0].clone();

        let card = draw_card(&mut game, PlayerId::FIRST).unwrap();
        assert_eq!(card, top);
        assert_eq!(game.player(PlayerId::FIRST).turn_phase, TurnPhase::Drawn);

        assert!(matches!(
            draw_card(&mut game, PlayerId::FIRST),
            Err(GameError::WrongPhase { .. })
        ));
    }

    #[test]
    fn test_draw_rejects_full_hand_and_empty_deck() {
        let (_, mut game) = setup();
        let cards: Vec<_> = (0..5).filter_map(|_| game.deck.pop_front()).collect();
        game.player_mut(PlayerId::FIRST).hand = cards;
        assert!(matches!(draw_card(&mut game, PlayerId::FIRST), Err(GameError::HandFull)));

        game.deck.clear();
        assert!(matches!(draw_card(&mut game, PlayerId::SECOND), Err(GameError::DeckEmpty)));
        assert!(!game.player(PlayerId::SECOND).has_drawn);
    }

    #[test]
    fn test_choose_build_only_from_choose() {
        let (_, mut game) = setup();
        choose_build(&mut game, PlayerId::FIRST).unwrap();
        assert_eq!(game.player(PlayerId::FIRST).turn_phase, TurnPhase::Building);
        assert!(choose_build(&mut game, PlayerId::FIRST).is_err());
    }

    #[test]
    fn test_invalid_submission_keeps_previous_program() {
        let (registry, mut game) = setup();
        submit_program(&mut game, PlayerId::FIRST, &[NodeDraft::new("attack")], &registry).unwrap();
        let before = game.player(PlayerId::FIRST).program.clone();

        let six: Vec<_> = (0..6).map(|_| NodeDraft::new("healing")).collect();
        let err = submit_program(&mut game, PlayerId::FIRST, &six, &registry).unwrap_err();

        assert!(matches!(err, GameError::Validation(ValidationError::TooManyNodes { max: 5 })));
        assert_eq!(game.player(PlayerId::FIRST).program, before);
    }

    #[test]
    fn test_resubmission_keeps_bug_marks() {
        let (registry, mut game) = setup();
        submit_program(&mut game, PlayerId::FIRST, &[NodeDraft::new("attack").with_id("a")], &registry).unwrap();
        let bugged = game
            .player(PlayerId::FIRST)
            .program
            .as_ref()
            .and_then(|p| p.set_bugged_subtree(&NodeId::new("a"), true));
        game.player_mut(PlayerId::FIRST).program = bugged;

        submit_program(
            &mut game,
            PlayerId::FIRST,
            &[NodeDraft::new("attack").with_id("a"), NodeDraft::new("dodge")],
            &registry,
        )
        .unwrap();

        let program = game.player(PlayerId::FIRST).program.clone().unwrap();
        assert!(program.find(&NodeId::new("a")).unwrap().bugged);
        assert_eq!(game.player(PlayerId::FIRST).preview, Some(program));
    }

    #[test]
    fn test_preview_requires_building_and_not_ready() {
        let (registry, mut game) = setup();
        let drafts = [NodeDraft::new("attack")];
        assert!(matches!(
            submit_preview(&mut game, PlayerId::FIRST, &drafts, &registry),
            Err(GameError::WrongPhase { .. })
        ));

        choose_build(&mut game, PlayerId::FIRST).unwrap();
        submit_preview(&mut game, PlayerId::FIRST, &drafts, &registry).unwrap();
        assert!(game.player(PlayerId::FIRST).preview.is_some());
        assert!(game.player(PlayerId::FIRST).program.is_none());

        set_ready(&mut game, PlayerId::FIRST, true).unwrap();
        assert!(matches!(
            submit_preview(&mut game, PlayerId::FIRST, &drafts, &registry),
            Err(GameError::AlreadyReady(_))
        ));
    }

    #[test]
    fn test_ready_rejects_empty_container() {
        let (registry, mut game) = setup();
        submit_program(&mut game, PlayerId::FIRST, &[NodeDraft::new("for_loop")], &registry).unwrap();
        let err = set_ready(&mut game, PlayerId::FIRST, true).unwrap_err();
        assert!(matches!(err, GameError::Validation(ValidationError::EmptyContainer)));
        assert!(!game.player(PlayerId::FIRST).ready);
    }

    #[test]
    fn test_discard_card() {
        let (_, mut game) = setup();
        game.deal_opening_hands();
        let first = game.player(PlayerId::FIRST).hand[0].clone();

        assert_eq!(discard_card(&mut game, PlayerId::FIRST, 0).unwrap(), first);
        assert_eq!(game.discard, vec![first]);
        assert!(matches!(
            discard_card(&mut game, PlayerId::FIRST, 9),
            Err(GameError::InvalidHandIndex(9))
        ));
    }
}
