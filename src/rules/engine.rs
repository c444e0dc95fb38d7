//! Five-phase round resolution.
//!
//! 1. Defense scan of each seat's program.
//! 2. Scan results committed to the seats.
//! 3. Dry run of each program in isolation.
//! 4. Authoritative run, seeded with the opponent's dry-run intent.
//! 5. Simultaneous damage, healing, and draws.
//!
//! Phases run sequentially; phase 4 for one seat depends on phase 3 of the
//! other. An execution failure zeroes that seat's contribution and is
//! logged; the other seat and the round carry on.

use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::defense::DefenseScan;
use super::result::{GameResult, RoundOutcome, RoundReport};
use crate::cards::CardRegistry;
use crate::core::{Game, GameError, Lifecycle, PlayerId, PlayerMap};
use crate::effects::{ActorView, DefensiveContext, ExecutionMode, ExecutionOutcome, Interpreter};
use crate::events::{dedup_round_events, ExecutionLog, NarrativeEvent};

/// What a seat's dry run intends to do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Intent {
    attacked: bool,
    damage: i32,
}

/// A seat's authoritative contribution to phase 5.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Effects {
    /// Damage after the opponent's defenses.
    damage: i32,
    healing: i32,
    draws: i32,
}

/// Resolves rounds against a card registry.
///
/// ```
/// use code_duel::cards::{build_deck, CardRegistry, StandardCatalog};
/// use code_duel::core::{Game, GameId, GameRng, PlayerId, RulesConfig};
/// use code_duel::program::{NodeDraft, Program};
/// use code_duel::rules::RoundEngine;
///
/// let registry = CardRegistry::from_catalog(&StandardCatalog);
/// let mut rng = GameRng::new(1);
/// let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();
/// let mut game = Game::new(GameId::new("g"), ["a".into(), "b".into()], deck, RulesConfig::default(), rng);
///
/// let attack = Program::build(&[NodeDraft::new("attack")], &registry).unwrap();
/// game.player_mut(PlayerId::FIRST).program = Some(attack);
///
/// let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();
/// assert_eq!(report.round, 1);
/// assert_eq!(game.player(PlayerId::SECOND).hp, 9);
/// assert_eq!(game.player(PlayerId::FIRST).energy, 2);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct RoundEngine<'a> {
    registry: &'a CardRegistry,
}

impl<'a> RoundEngine<'a> {
    #[must_use]
    pub fn new(registry: &'a CardRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the current round of `game`.
    ///
    /// Advances to the next round unless a seat was knocked out, in which
    /// case the game is marked finished.
    pub fn resolve(&self, game: &mut Game) -> Result<RoundReport, GameError> {
        if game.is_over() {
            return Err(GameError::GameOver);
        }
        let round = game.round;
        let config = game.config.clone();
        let interpreter = Interpreter::new(self.registry, &config);
        info!(game = %game.id, round, "resolving round");

        // Phase 1
        let scans = game
            .players
            .map(|_, p| DefenseScan::of(p.active_program(), self.registry));

        // Phase 2
        for (seat, player) in game.players.iter_mut() {
            player.has_hide = scans[seat].has_hide;
            player.dodges_remaining = scans[seat].dodges;
        }
        debug!(game = %game.id, ?scans, "defense scan committed");

        // Phase 3
        let intents = game.players.map(|seat, player| {
            let Some(program) = player.active_program().filter(|p| !p.is_empty()) else {
                return Intent::default();
            };
            let view = ActorView {
                hp: player.hp,
                energy: player.energy,
            };
            match interpreter.execute(program, seat, view, &scans[seat].context(), ExecutionMode::DryRun) {
                Ok(outcome) => Intent {
                    attacked: outcome.attacked(),
                    damage: outcome.damage_dealt,
                },
                Err(err) => {
                    warn!(game = %game.id, %seat, error = %err, "dry run failed");
                    Intent::default()
                }
            }
        });
        debug!(game = %game.id, ?intents, "dry run complete");

        // Phase 4
        let mut effects: PlayerMap<Effects> = PlayerMap::with_default();
        let mut logs: PlayerMap<ExecutionLog> = PlayerMap::with_default();
        let mut events: Vec<NarrativeEvent> = Vec::new();

        for seat in PlayerId::both() {
            let opponent = seat.opponent();
            let player = &game.players[seat];
            let Some(program) = player.active_program().filter(|p| !p.is_empty()).cloned() else {
                logs[seat] = ExecutionLog::idle();
                continue;
            };

            let incoming = intents[opponent];
            let ctx = DefensiveContext {
                opponent_attacked: incoming.attacked,
                opponent_damage: incoming.damage,
                damage_taken: scans[seat].mitigate(incoming.damage),
                ..scans[seat].context()
            };
            let view = ActorView {
                hp: player.hp,
                energy: player.energy,
            };

            match interpreter.execute(&program, seat, view, &ctx, ExecutionMode::Authoritative) {
                Ok(outcome) => {
                    effects[seat] = Effects {
                        damage: scans[opponent].mitigate(outcome.damage_dealt),
                        healing: outcome.healing_requested,
                        draws: outcome.draws_requested,
                    };
                    game.players[seat].energy = outcome.final_energy;
                    debug!(
                        game = %game.id,
                        %seat,
                        raw_damage = outcome.damage_dealt,
                        damage = effects[seat].damage,
                        fuel = outcome.fuel_used,
                        "program executed"
                    );
                    events.extend(outcome.events.iter().cloned());
                    logs[seat] = log_from(outcome);
                }
                Err(err) => {
                    warn!(game = %game.id, %seat, error = %err, "execution failed, contribution dropped");
                    let log = ExecutionLog::failed(seat, &err.to_string());
                    events.extend(log.events.iter().cloned());
                    logs[seat] = log;
                }
            }
        }

        // Phase 5
        for seat in PlayerId::both() {
            let incoming = effects[seat.opponent()].damage;
            let own = effects[seat];
            let deck_len = game.deck.len();
            let player = &mut game.players[seat];

            if incoming > 0 {
                player.hp = (player.hp - incoming).max(0);
            }

            if own.healing > 0 {
                let missing = (config.max_hp - player.hp).max(0);
                let healed = own.healing.min(missing).min(player.energy);
                if healed > 0 {
                    player.hp += healed;
                    player.energy = (player.energy - healed).max(0);
                    events.push(NarrativeEvent::heal(seat));
                }
            }

            if own.draws > 0 {
                let requested = usize::try_from(own.draws).unwrap_or(0);
                let count = requested.min(player.hand_space(&config)).min(deck_len);
                if count > 0 {
                    events.push(NarrativeEvent::draw(seat));
                }
                for _ in 0..count {
                    if let Some(card) = game.deck.pop_front() {
                        game.players[seat].hand.push(card);
                    }
                }
            }
        }

        let knocked_out: SmallVec<[PlayerId; 2]> = game
            .players
            .iter()
            .filter(|(_, p)| p.is_defeated())
            .map(|(seat, _)| seat)
            .collect();

        let outcome = match GameResult::from_knockouts(&knocked_out) {
            Some(result) => {
                info!(game = %game.id, round, ?result, "game over");
                game.lifecycle = Lifecycle::Finished(result);
                RoundOutcome::GameOver(result)
            }
            None => {
                game.advance_round();
                RoundOutcome::Continue
            }
        };

        Ok(RoundReport {
            round,
            logs,
            events: dedup_round_events(events),
            knocked_out,
            outcome,
        })
    }
}

fn log_from(outcome: ExecutionOutcome) -> ExecutionLog {
    ExecutionLog {
        success: true,
        lines: outcome.lines,
        events: outcome.events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{build_deck, StandardCatalog};
    use crate::core::{GameId, GameRng, RulesConfig, TurnPhase};
    use crate::events::EventIcon;
    use crate::program::{NodeDraft, Program};

    fn setup() -> (CardRegistry, Game) {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let mut rng = GameRng::new(11);
        let deck = build_deck(&StandardCatalog, &registry, &mut rng).unwrap();
        let game = Game::new(
            GameId::new("g"),
            ["a".into(), "b".into()],
            deck,
            RulesConfig::default(),
            rng,
        );
        (registry, game)
    }

    fn install(game: &mut Game, registry: &CardRegistry, seat: PlayerId, drafts: Vec<NodeDraft>) {
        game.player_mut(seat).program = Some(Program::build(&drafts, registry).unwrap());
    }

    #[test]
    fn test_round_advances_and_resets() {
        let (registry, mut game) = setup();
        install(&mut game, &registry, PlayerId::FIRST, vec![NodeDraft::new("attack")]);
        game.player_mut(PlayerId::FIRST).ready = true;
        game.player_mut(PlayerId::FIRST).turn_phase = TurnPhase::Building;

        let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();

        assert_eq!(report.outcome, RoundOutcome::Continue);
        assert_eq!(game.round, 2);
        let p = game.player(PlayerId::FIRST);
        assert!(!p.ready);
        assert_eq!(p.turn_phase, TurnPhase::Choose);
        assert!(p.preview.is_some());
    }

    #[test]
    fn test_idle_round_reports_nothing_happened() {
        let (registry, mut game) = setup();
        let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].icon, EventIcon::Info);
        assert!(report.logs[PlayerId::FIRST].success);
    }

    #[test]
    fn test_draw_request_takes_from_deck_front() {
        let (registry, mut game) = setup();
        install(&mut game, &registry, PlayerId::SECOND, vec![NodeDraft::new("draw")]);
        let top = game.deck[0].clone();

        let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();

        assert_eq!(game.player(PlayerId::SECOND).hand, vec![top]);
        assert!(report.events.iter().any(|e| e.icon == EventIcon::Draw));
    }

    #[test]
    fn test_failed_execution_is_contained() {
        let (registry, mut game) = setup();
        install(
            &mut game,
            &registry,
            PlayerId::FIRST,
            vec![NodeDraft::new("if")
                .with_param("condition", "bogus")
                .with_child(NodeDraft::new("attack"))],
        );
        install(&mut game, &registry, PlayerId::SECOND, vec![NodeDraft::new("attack")]);

        let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();

        assert!(!report.logs[PlayerId::FIRST].success);
        assert!(report.logs[PlayerId::SECOND].success);
        assert_eq!(game.player(PlayerId::FIRST).hp, 9);
        assert_eq!(game.player(PlayerId::SECOND).hp, 10);
        assert!(report.events.iter().any(|e| e.icon == EventIcon::Error));
    }

    #[test]
    fn test_simultaneous_knockout_is_a_draw() {
        let (registry, mut game) = setup();
        for seat in PlayerId::both() {
            install(&mut game, &registry, seat, vec![NodeDraft::new("attack")]);
            game.player_mut(seat).hp = 1;
        }

        let report = RoundEngine::new(&registry).resolve(&mut game).unwrap();

        assert_eq!(report.outcome, RoundOutcome::GameOver(GameResult::Draw));
        assert_eq!(report.knocked_out.len(), 2);
        assert!(game.is_over());
        assert_eq!(game.round, 1);
        assert!(matches!(
            RoundEngine::new(&registry).resolve(&mut game),
            Err(GameError::GameOver)
        ));
    }
}
