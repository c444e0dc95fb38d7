//! Benchmarks for round resolution and program validation.

#![allow(missing_docs)]

use std::hint::black_box;

use code_duel::cards::{build_deck, CardRegistry, StandardCatalog};
use code_duel::core::{Game, GameId, GameRng, PlayerId, RulesConfig};
use code_duel::program::{validate, NodeDraft, Program};
use code_duel::rules::RoundEngine;
use criterion::{criterion_group, criterion_main, Criterion};

fn game(registry: &CardRegistry) -> Game {
    let mut rng = GameRng::new(42);
    let deck = build_deck(&StandardCatalog, registry, &mut rng).expect("standard deck builds");
    Game::new(
        GameId::new("bench"),
        ["alice".into(), "bob".into()],
        deck,
        RulesConfig::default(),
        rng,
    )
}

/// A five-block program that exercises loops, conditions, and defenses.
fn busy_program() -> Vec<NodeDraft> {
    vec![
        NodeDraft::new("for_loop")
            .with_capacity(2)
            .with_child(
                NodeDraft::new("if")
                    .with_param("condition", "health_below_5")
                    .with_child(NodeDraft::new("healing")),
            )
            .with_child(NodeDraft::new("attack")),
        NodeDraft::new("dodge"),
    ]
}

fn bench_resolve_round(c: &mut Criterion) {
    let registry = CardRegistry::from_catalog(&StandardCatalog);
    let program = Program::build(&busy_program(), &registry).expect("program builds");
    let mut base = game(&registry);
    for seat in PlayerId::both() {
        base.player_mut(seat).program = Some(program.clone());
    }
    let engine = RoundEngine::new(&registry);

    c.bench_function("resolve_round", |b| {
        b.iter(|| {
            let mut game = base.clone();
            let report = engine.resolve(black_box(&mut game));
            black_box(report)
        });
    });
}

fn bench_validate(c: &mut Criterion) {
    let registry = CardRegistry::from_catalog(&StandardCatalog);
    let drafts = busy_program();
    let config = RulesConfig::default();

    c.bench_function("build_and_validate", |b| {
        b.iter(|| {
            let program = Program::build(black_box(&drafts), &registry);
            black_box(program.map(|p| validate(&p, &config)))
        });
    });
}

criterion_group!(benches, bench_resolve_round, bench_validate);
criterion_main!(benches);
