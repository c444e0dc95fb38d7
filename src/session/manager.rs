//! Owned registry of lobbies and running games.
//!
//! Commands for one game are serialized by that game's mutex; commands for
//! different games run independently. The registry maps are only locked long
//! enough to look up, insert, or remove an entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use rustc_hash::FxHashMap;
use tracing::info;

use super::event::SessionEvent;
use crate::cards::{build_deck, CardCatalog, CardInstance, CardRegistry};
use crate::core::{Game, GameError, GameId, GameRng, GameSnapshot, PlayerId, Result, RulesConfig};
use crate::lobby::{LeaveOutcome, Lobby, LobbyId, LobbyRegistry};
use crate::powerups::apply_powerup;
use crate::program::{NodeDraft, NodeId};
use crate::rules::{self, RoundEngine, RoundOutcome};

type GameHandle = Arc<Mutex<Game>>;

/// Session-facing entry point for lobbies and games.
///
/// Constructed once and shared by reference (or `Arc`) with whatever
/// transport delivers player commands.
pub struct SessionManager {
    registry: CardRegistry,
    catalog: Box<dyn CardCatalog>,
    config: RulesConfig,
    lobbies: RwLock<LobbyRegistry>,
    games: RwLock<FxHashMap<GameId, GameHandle>>,
    /// Base seed for deterministic games; `None` draws from OS entropy.
    seed: Option<u64>,
    started: AtomicU64,
}

impl SessionManager {
    #[must_use]
    pub fn new(catalog: impl CardCatalog + 'static, config: RulesConfig) -> Self {
        let registry = CardRegistry::from_catalog(&catalog);
        Self {
            registry,
            catalog: Box::new(catalog),
            config,
            lobbies: RwLock::new(LobbyRegistry::new()),
            games: RwLock::new(FxHashMap::default()),
            seed: None,
            started: AtomicU64::new(0),
        }
    }

    /// Seed every game deterministically: the n-th started game uses
    /// `seed + n`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &CardRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    // === Lobbies ===

    pub fn create_lobby(&self, id: impl Into<LobbyId>, host: &str) -> Result<Lobby> {
        let mut lobbies = self.lobbies.write().map_err(|_| GameError::LockPoisoned)?;
        let lobby = lobbies.create(id.into(), host)?.clone();
        info!(lobby = %lobby.id, host, "lobby created");
        Ok(lobby)
    }

    pub fn join_lobby(&self, id: &LobbyId, player: &str) -> Result<Lobby> {
        let mut lobbies = self.lobbies.write().map_err(|_| GameError::LockPoisoned)?;
        Ok(lobbies.join(id, player)?.clone())
    }

    pub fn leave_lobby(&self, id: &LobbyId, player: &str) -> Result<LeaveOutcome> {
        let mut lobbies = self.lobbies.write().map_err(|_| GameError::LockPoisoned)?;
        Ok(lobbies.leave(id, player)?)
    }

    pub fn set_lobby_ready(&self, id: &LobbyId, player: &str, ready: bool) -> Result<Lobby> {
        let mut lobbies = self.lobbies.write().map_err(|_| GameError::LockPoisoned)?;
        Ok(lobbies.set_ready(id, player, ready)?.clone())
    }

    pub fn lobby(&self, id: &LobbyId) -> Result<Option<Lobby>> {
        let lobbies = self.lobbies.read().map_err(|_| GameError::LockPoisoned)?;
        Ok(lobbies.get(id).cloned())
    }

    pub fn lobbies(&self) -> Result<Vec<Lobby>> {
        let lobbies = self.lobbies.read().map_err(|_| GameError::LockPoisoned)?;
        Ok(lobbies.iter().cloned().collect())
    }

    // === Game lifecycle ===

    /// Start the lobby's game. Only the host may start, with exactly two
    /// ready members. The game takes the lobby's id.
    pub fn start_game(&self, lobby_id: &LobbyId, host: &str) -> Result<GameId> {
        let names = {
            let lobbies = self.lobbies.read().map_err(|_| GameError::LockPoisoned)?;
            let lobby = lobbies.check_start(lobby_id, host)?;
            [lobby.members[0].name.clone(), lobby.members[1].name.clone()]
        };

        let id = GameId::new(lobby_id.as_str());
        let mut games = self.games.write().map_err(|_| GameError::LockPoisoned)?;
        if games.contains_key(&id) {
            return Err(GameError::GameExists(id.to_string()));
        }

        let mut rng = self.next_rng();
        let deck = build_deck(self.catalog.as_ref(), &self.registry, &mut rng)?;
        let mut game = Game::new(id.clone(), names, deck, self.config.clone(), rng);
        game.deal_opening_hands();
        info!(game = %id, deck = game.deck.len(), "game started");

        games.insert(id.clone(), Arc::new(Mutex::new(game)));
        Ok(id)
    }

    /// Remove the game after `player` left; the opponent is reported as
    /// remaining. The player also leaves the lobby.
    pub fn leave_game(&self, id: &GameId, player: &str) -> Result<SessionEvent> {
        let handle = self.handle(id)?;
        let remaining = {
            let game = lock(&handle)?;
            let seat = seat(&game, player)?;
            game.player(seat.opponent()).name.clone()
        };
        self.games.write().map_err(|_| GameError::LockPoisoned)?.remove(id);

        let lobby_id = LobbyId::new(id.as_str());
        let mut lobbies = self.lobbies.write().map_err(|_| GameError::LockPoisoned)?;
        if lobbies.get(&lobby_id).is_some_and(|l| l.contains(player)) {
            lobbies.leave(&lobby_id, player)?;
        }
        info!(game = %id, player, "player left game");
        Ok(SessionEvent::PlayerLeft {
            game: id.clone(),
            player: player.to_string(),
            remaining,
        })
    }

    /// A copy of the game's current state.
    pub fn game(&self, id: &GameId) -> Result<Game> {
        let handle = self.handle(id)?;
        let game = lock(&handle)?;
        Ok(game.clone())
    }

    pub fn game_count(&self) -> Result<usize> {
        Ok(self.games.read().map_err(|_| GameError::LockPoisoned)?.len())
    }

    /// Binary checkpoint of a running game.
    pub fn snapshot(&self, id: &GameId) -> Result<Vec<u8>> {
        let handle = self.handle(id)?;
        let game = lock(&handle)?;
        game.snapshot().to_bytes()
    }

    /// Register a game from a checkpoint. Fails if the id is already taken.
    pub fn restore(&self, bytes: &[u8]) -> Result<GameId> {
        let game = Game::from_snapshot(GameSnapshot::from_bytes(bytes)?);
        let id = game.id.clone();
        let mut games = self.games.write().map_err(|_| GameError::LockPoisoned)?;
        if games.contains_key(&id) {
            return Err(GameError::GameExists(id.to_string()));
        }
        games.insert(id.clone(), Arc::new(Mutex::new(game)));
        info!(game = %id, "game restored");
        Ok(id)
    }

    // === Player commands ===

    pub fn submit_program(&self, id: &GameId, player: &str, drafts: &[NodeDraft]) -> Result<SessionEvent> {
        self.with_game(id, |game| {
            let seat = seat(game, player)?;
            rules::submit_program(game, seat, drafts, &self.registry)?;
            Ok(SessionEvent::Updated { game: id.clone() })
        })
    }

    pub fn submit_preview(&self, id: &GameId, player: &str, drafts: &[NodeDraft]) -> Result<SessionEvent> {
        self.with_game(id, |game| {
            let seat = seat(game, player)?;
            rules::submit_preview(game, seat, drafts, &self.registry)?;
            Ok(SessionEvent::Updated { game: id.clone() })
        })
    }

    pub fn play_powerup(
        &self,
        id: &GameId,
        player: &str,
        key: &str,
        target: Option<&NodeId>,
    ) -> Result<SessionEvent> {
        self.with_game(id, |game| {
            let seat = seat(game, player)?;
            if game.is_over() {
                return Err(GameError::GameOver);
            }
            let outcome = apply_powerup(game, seat, key, target)?;
            Ok(SessionEvent::PowerupPlayed {
                game: id.clone(),
                player: seat,
                outcome,
            })
        })
    }

    pub fn choose_build(&self, id: &GameId, player: &str) -> Result<SessionEvent> {
        self.with_game(id, |game| {
            let seat = seat(game, player)?;
            rules::choose_build(game, seat)?;
            Ok(SessionEvent::Updated { game: id.clone() })
        })
    }

    pub fn discard_card(&self, id: &GameId, player: &str, hand_index: usize) -> Result<CardInstance> {
        self.with_game(id, |game| {
            let seat = seat(game, player)?;
            rules::discard_card(game, seat, hand_index)
        })
    }

    /// Draw instead of building. The player is marked ready afterwards,
    /// which may resolve the round. A player who could not become ready
    /// does not draw.
    pub fn draw_card(&self, id: &GameId, player: &str) -> Result<(CardInstance, SessionEvent)> {
        let (card, event) = self.with_game(id, |game| {
            let seat = seat(game, player)?;
            rules::ensure_can_ready(game, seat)?;
            let card = rules::draw_card(game, seat)?;
            let event = self.ready_and_resolve(id, game, seat)?;
            Ok((card, event))
        })?;
        self.finish_if_over(&event)?;
        Ok((card, event))
    }

    /// Mark a player ready (or not). Once both players are ready the round
    /// resolves.
    pub fn set_ready(&self, id: &GameId, player: &str, ready: bool) -> Result<SessionEvent> {
        let event = self.with_game(id, |game| {
            let seat = seat(game, player)?;
            if ready {
                self.ready_and_resolve(id, game, seat)
            } else {
                rules::set_ready(game, seat, false)?;
                Ok(SessionEvent::Updated { game: id.clone() })
            }
        })?;
        self.finish_if_over(&event)?;
        Ok(event)
    }

    fn ready_and_resolve(&self, id: &GameId, game: &mut Game, seat: PlayerId) -> Result<SessionEvent> {
        rules::set_ready(game, seat, true)?;
        if !game.all_ready() {
            return Ok(SessionEvent::Updated { game: id.clone() });
        }

        let report = RoundEngine::new(&self.registry).resolve(game)?;
        Ok(match report.outcome {
            RoundOutcome::Continue => SessionEvent::RoundResolved {
                game: id.clone(),
                report,
            },
            RoundOutcome::GameOver(result) => SessionEvent::GameOver {
                game: id.clone(),
                result,
                report,
            },
        })
    }

    /// Drop a finished game and its lobby.
    fn finish_if_over(&self, event: &SessionEvent) -> Result<()> {
        let SessionEvent::GameOver { game, result, .. } = event else {
            return Ok(());
        };
        self.games.write().map_err(|_| GameError::LockPoisoned)?.remove(game);
        self.lobbies
            .write()
            .map_err(|_| GameError::LockPoisoned)?
            .remove(&LobbyId::new(game.as_str()));
        info!(game = %game, ?result, "game over, session closed");
        Ok(())
    }

    fn with_game<T>(&self, id: &GameId, f: impl FnOnce(&mut Game) -> Result<T>) -> Result<T> {
        let handle = self.handle(id)?;
        let mut game = lock(&handle)?;
        f(&mut game)
    }

    fn handle(&self, id: &GameId) -> Result<GameHandle> {
        let games = self.games.read().map_err(|_| GameError::LockPoisoned)?;
        games
            .get(id)
            .cloned()
            .ok_or_else(|| GameError::GameNotFound(id.to_string()))
    }

    fn next_rng(&self) -> GameRng {
        let n = self.started.fetch_add(1, Ordering::Relaxed);
        match self.seed {
            Some(seed) => GameRng::new(seed.wrapping_add(n)),
            None => GameRng::from_entropy(),
        }
    }
}

fn lock(handle: &GameHandle) -> Result<MutexGuard<'_, Game>> {
    handle.lock().map_err(|_| GameError::LockPoisoned)
}

fn seat(game: &Game, player: &str) -> Result<PlayerId> {
    game.seat_of(player)
        .ok_or_else(|| GameError::PlayerNotFound(player.to_string()))
}
