//! Round resolution scenarios: combat math, defenses, containers, events.

use code_duel::cards::{build_deck, CardRegistry, StandardCatalog};
use code_duel::core::{Game, GameId, GameRng, PlayerId, RulesConfig};
use code_duel::events::EventIcon;
use code_duel::program::{NodeDraft, NodeId};
use code_duel::rules::{submit_program, GameResult, RoundEngine, RoundOutcome, RoundReport};

const A: PlayerId = PlayerId::FIRST;
const B: PlayerId = PlayerId::SECOND;

fn setup() -> (CardRegistry, Game) {
    let registry = CardRegistry::from_catalog(&StandardCatalog);
    let mut rng = GameRng::new(42);
    let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();
    let game = Game::new(
        GameId::new("duel"),
        ["alice".into(), "bob".into()],
        deck,
        RulesConfig::default(),
        rng,
    );
    (registry, game)
}

fn program(game: &mut Game, registry: &CardRegistry, seat: PlayerId, drafts: Vec<NodeDraft>) {
    submit_program(game, seat, &drafts, registry).unwrap();
}

fn resolve(game: &mut Game, registry: &CardRegistry) -> RoundReport {
    RoundEngine::new(registry).resolve(game).unwrap()
}

fn count(report: &RoundReport, icon: EventIcon) -> usize {
    report.events.iter().filter(|e| e.icon == icon).count()
}

// =============================================================================
// Attack and energy
// =============================================================================

#[test]
fn test_single_attack() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("attack")]);

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 9);
    assert_eq!(game.player(A).energy, 2);
    assert_eq!(count(&report, EventIcon::Attack), 1);
}

#[test]
fn test_two_attacks() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("attack"), NodeDraft::new("attack")],
    );

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 8);
    assert_eq!(game.player(A).energy, 1);
}

#[test]
fn test_attack_without_energy_is_skipped() {
    let (registry, mut game) = setup();
    game.player_mut(A).energy = 0;
    program(&mut game, &registry, A, vec![NodeDraft::new("attack")]);

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 10);
    assert_eq!(game.player(A).energy, 0);
}

#[test]
fn test_energy_card_cancels_attacks() {
    let (registry, mut game) = setup();
    game.player_mut(A).energy = 2;
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("energy"), NodeDraft::new("attack")],
    );

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 10);
    // The blocked attack never pays its energy cost.
    assert_eq!(game.player(A).energy, 3);
    assert!(!report.events.iter().any(|e| e.icon == EventIcon::Attack));
}

#[test]
fn test_energy_gain_is_capped() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("energy").with_param("amount", 5)]);

    resolve(&mut game, &registry);

    assert_eq!(game.player(A).energy, 3);
}

#[test]
fn test_oversized_params_still_resolve() {
    let (registry, mut game) = setup();
    let huge = i64::from(i32::MAX);
    program(&mut game, &registry, A, vec![NodeDraft::new("energy").with_param("amount", huge)]);
    program(
        &mut game,
        &registry,
        B,
        vec![
            NodeDraft::new("attack").with_param("damage", huge),
            NodeDraft::new("attack").with_param("damage", huge),
        ],
    );

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(A).energy, 3);
    assert_eq!(game.player(A).hp, 0);
    assert_eq!(report.outcome, RoundOutcome::GameOver(GameResult::Winner(B)));
}

// =============================================================================
// Healing
// =============================================================================

#[test]
fn test_heal_at_full_hp_costs_nothing() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("healing")]);

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(A).hp, 10);
    assert_eq!(game.player(A).energy, 3);
    assert_eq!(count(&report, EventIcon::Heal), 0);
}

#[test]
fn test_heal_pays_only_for_restored_hp() {
    let (registry, mut game) = setup();
    game.player_mut(A).hp = 9;
    program(
        &mut game,
        &registry,
        A,
        vec![
            NodeDraft::new("healing"),
            NodeDraft::new("healing"),
            NodeDraft::new("healing"),
        ],
    );

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(A).hp, 10);
    assert_eq!(game.player(A).energy, 2);
    assert_eq!(count(&report, EventIcon::Heal), 1);
}

#[test]
fn test_damage_lands_before_healing() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("healing")]);
    program(&mut game, &registry, B, vec![NodeDraft::new("attack")]);

    resolve(&mut game, &registry);

    // At full HP when the round starts, but the hit opens room to heal.
    assert_eq!(game.player(A).hp, 10);
    assert_eq!(game.player(A).energy, 2);
}

// =============================================================================
// Defenses
// =============================================================================

#[test]
fn test_dodge_cancels_one_attack() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("attack"), NodeDraft::new("attack")],
    );
    program(&mut game, &registry, B, vec![NodeDraft::new("dodge")]);

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 9);
    assert_eq!(game.player(B).energy, 2);
    assert_eq!(game.player(B).dodges_remaining, 1);
    assert_eq!(count(&report, EventIcon::Shield), 1);
}

#[test]
fn test_hide_blocks_every_attack() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![
            NodeDraft::new("attack"),
            NodeDraft::new("attack"),
            NodeDraft::new("attack"),
        ],
    );
    program(&mut game, &registry, B, vec![NodeDraft::new("hide")]);

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 10);
    assert!(game.player(B).has_hide);
    // Hiding spends all remaining energy once the opponent attacks.
    assert_eq!(game.player(B).energy, 0);
}

#[test]
fn test_hide_costs_nothing_when_not_attacked() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, B, vec![NodeDraft::new("hide")]);

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).energy, 3);
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_for_loop_repeats_body() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("for_loop").with_child(NodeDraft::new("attack"))],
    );

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 8);
    assert_eq!(game.player(A).energy, 1);
}

#[test]
fn test_for_loop_stops_paying_when_energy_runs_out() {
    let (registry, mut game) = setup();
    game.player_mut(A).energy = 2;
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("for_loop")
            .with_param("count", 4)
            .with_child(NodeDraft::new("attack"))],
    );

    resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 8);
    assert_eq!(game.player(A).energy, 0);
}

#[test]
fn test_for_loop_heal_limited_by_energy() {
    let (registry, mut game) = setup();
    {
        let a = game.player_mut(A);
        a.hp = 5;
        a.energy = 2;
    }
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("for_loop")
            .with_param("count", 4)
            .with_child(NodeDraft::new("healing"))],
    );

    resolve(&mut game, &registry);

    assert_eq!(game.player(A).hp, 7);
    assert_eq!(game.player(A).energy, 0);
}

#[test]
fn test_if_runs_child_only_when_condition_holds() {
    let (registry, mut game) = setup();
    let guarded = || {
        vec![NodeDraft::new("if")
            .with_param("condition", "health_below_5")
            .with_child(NodeDraft::new("attack"))]
    };

    program(&mut game, &registry, A, guarded());
    resolve(&mut game, &registry);
    assert_eq!(game.player(B).hp, 10);

    game.player_mut(A).hp = 4;
    program(&mut game, &registry, A, guarded());
    resolve(&mut game, &registry);
    assert_eq!(game.player(B).hp, 9);
}

#[test]
fn test_if_damage_taken_reacts_to_incoming_attack() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("if")
            .with_param("condition", "damage_taken_gt_0")
            .with_child(NodeDraft::new("attack"))],
    );
    program(&mut game, &registry, B, vec![NodeDraft::new("attack")]);

    resolve(&mut game, &registry);

    assert_eq!(game.player(A).hp, 9);
    assert_eq!(game.player(B).hp, 9);
}

#[test]
fn test_cross_nested_containers() {
    let (registry, mut game) = setup();
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("for_loop")
            .with_capacity(2)
            .with_child(
                NodeDraft::new("if")
                    .with_param("condition", "no_energy")
                    .with_child(NodeDraft::new("energy")),
            )
            .with_child(NodeDraft::new("draw"))],
    );
    let hand_before = game.player(A).hand.len();

    resolve(&mut game, &registry);

    assert_eq!(game.player(A).hand.len(), hand_before + 2);
}

// =============================================================================
// Bugs, events, rounds
// =============================================================================

#[test]
fn test_bugged_program_does_nothing() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("attack").with_id("hit")]);
    let bugged = game
        .player(A)
        .program
        .as_ref()
        .and_then(|p| p.set_bugged_subtree(&NodeId::new("hit"), true));
    game.player_mut(A).program = bugged;

    let report = resolve(&mut game, &registry);

    assert_eq!(game.player(B).hp, 10);
    assert_eq!(count(&report, EventIcon::Bug), 1);
}

#[test]
fn test_insufficient_energy_reported_once() {
    let (registry, mut game) = setup();
    game.player_mut(A).energy = 0;
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("attack"), NodeDraft::new("attack")],
    );

    let report = resolve(&mut game, &registry);

    let insufficient = report
        .events
        .iter()
        .filter(|e| e.message.contains("not enough energy") && e.actor == Some(A))
        .count();
    assert_eq!(insufficient, 1);
    assert_eq!(report.logs[A].lines.len(), 2);
}

#[test]
fn test_fuel_exhaustion_is_contained() {
    let registry = CardRegistry::from_catalog(&StandardCatalog);
    let mut rng = GameRng::new(7);
    let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();
    let config = RulesConfig::default().with_execution_fuel(3);
    let mut game = Game::new(GameId::new("fuel"), ["a".into(), "b".into()], deck, config, rng);
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("for_loop")
            .with_param("count", 4)
            .with_child(NodeDraft::new("attack"))],
    );
    program(&mut game, &registry, B, vec![NodeDraft::new("attack")]);

    let report = resolve(&mut game, &registry);

    assert!(!report.logs[A].success);
    assert_eq!(game.player(B).hp, 10);
    assert_eq!(game.player(A).hp, 9);
    assert_eq!(game.player(A).energy, 3);
}

#[test]
fn test_program_carries_into_next_round() {
    let (registry, mut game) = setup();
    program(&mut game, &registry, A, vec![NodeDraft::new("attack")]);

    resolve(&mut game, &registry);
    let report = resolve(&mut game, &registry);

    assert_eq!(report.round, 2);
    assert_eq!(game.round, 3);
    assert_eq!(game.player(B).hp, 8);
    assert_eq!(game.player(A).energy, 1);
}

#[test]
fn test_knockout_ends_game() {
    let (registry, mut game) = setup();
    game.player_mut(B).hp = 2;
    program(
        &mut game,
        &registry,
        A,
        vec![NodeDraft::new("attack"), NodeDraft::new("attack")],
    );

    let report = resolve(&mut game, &registry);

    assert_eq!(report.outcome, RoundOutcome::GameOver(GameResult::Winner(A)));
    assert_eq!(game.player(B).hp, 0);
    assert!(game.is_over());
}
