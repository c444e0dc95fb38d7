//! Keyed lobby registry: create, join, leave, ready, start check.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::SEAT_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LobbyError {
    #[error("lobby {0} already exists")]
    AlreadyExists(LobbyId),

    #[error("lobby {0} not found")]
    NotFound(LobbyId),

    #[error("lobby is full")]
    Full,

    #[error("{0} is already in the lobby")]
    AlreadyJoined(String),

    #[error("{0} is not in the lobby")]
    NotInLobby(String),

    #[error("not all players are ready")]
    NotAllReady,

    #[error("only the host can start the game")]
    NotHost,

    #[error("a duel needs exactly {expected} players, the lobby has {actual}")]
    PlayerCount { expected: usize, actual: usize },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LobbyId(String);

impl LobbyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LobbyId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for LobbyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyMember {
    pub name: String,
    pub ready: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lobby {
    pub id: LobbyId,
    pub host: String,
    pub max_players: usize,
    /// In join order; the first member becomes host when the host leaves.
    pub members: Vec<LobbyMember>,
}

impl Lobby {
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name == name)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    /// At least two members, all ready.
    #[must_use]
    pub fn can_start(&self) -> bool {
        self.members.len() >= 2 && self.members.iter().all(|m| m.ready)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The lobby still has members; `host` is the (possibly new) host.
    Left { host: String },
    /// The last member left and the lobby was removed.
    Deleted,
}

#[derive(Debug, Default)]
pub struct LobbyRegistry {
    lobbies: FxHashMap<LobbyId, Lobby>,
}

impl LobbyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a duel lobby with `host` as its first member.
    pub fn create(&mut self, id: LobbyId, host: impl Into<String>) -> Result<&Lobby, LobbyError> {
        self.create_with_capacity(id, host, SEAT_COUNT)
    }

    pub fn create_with_capacity(
        &mut self,
        id: LobbyId,
        host: impl Into<String>,
        max_players: usize,
    ) -> Result<&Lobby, LobbyError> {
        if self.lobbies.contains_key(&id) {
            return Err(LobbyError::AlreadyExists(id));
        }
        let host = host.into();
        let lobby = Lobby {
            id: id.clone(),
            host: host.clone(),
            max_players,
            members: vec![LobbyMember {
                name: host,
                ready: false,
            }],
        };
        Ok(self.lobbies.entry(id).or_insert(lobby))
    }

    pub fn join(&mut self, id: &LobbyId, name: impl Into<String>) -> Result<&Lobby, LobbyError> {
        let lobby = self.get_mut(id)?;
        if lobby.is_full() {
            return Err(LobbyError::Full);
        }
        let name = name.into();
        if lobby.contains(&name) {
            return Err(LobbyError::AlreadyJoined(name));
        }
        lobby.members.push(LobbyMember { name, ready: false });
        Ok(lobby)
    }

    pub fn leave(&mut self, id: &LobbyId, name: &str) -> Result<LeaveOutcome, LobbyError> {
        let lobby = self.get_mut(id)?;
        lobby.members.retain(|m| m.name != name);

        let Some(first) = lobby.members.first() else {
            self.lobbies.remove(id);
            return Ok(LeaveOutcome::Deleted);
        };
        if lobby.host == name {
            lobby.host = first.name.clone();
        }
        Ok(LeaveOutcome::Left {
            host: lobby.host.clone(),
        })
    }

    pub fn set_ready(&mut self, id: &LobbyId, name: &str, ready: bool) -> Result<&Lobby, LobbyError> {
        let lobby = self.get_mut(id)?;
        let member = lobby
            .members
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| LobbyError::NotInLobby(name.to_string()))?;
        member.ready = ready;
        Ok(lobby)
    }

    #[must_use]
    pub fn can_start(&self, id: &LobbyId) -> bool {
        self.lobbies.get(id).is_some_and(Lobby::can_start)
    }

    /// Check that `requester` may start the lobby's game now.
    pub fn check_start(&self, id: &LobbyId, requester: &str) -> Result<&Lobby, LobbyError> {
        let lobby = self.get(id).ok_or_else(|| LobbyError::NotFound(id.clone()))?;
        if lobby.host != requester {
            return Err(LobbyError::NotHost);
        }
        if !lobby.can_start() {
            return Err(LobbyError::NotAllReady);
        }
        if lobby.members.len() != SEAT_COUNT {
            return Err(LobbyError::PlayerCount {
                expected: SEAT_COUNT,
                actual: lobby.members.len(),
            });
        }
        Ok(lobby)
    }

    #[must_use]
    pub fn get(&self, id: &LobbyId) -> Option<&Lobby> {
        self.lobbies.get(id)
    }

    pub fn remove(&mut self, id: &LobbyId) -> Option<Lobby> {
        self.lobbies.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lobby> {
        self.lobbies.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    fn get_mut(&mut self, id: &LobbyId) -> Result<&mut Lobby, LobbyError> {
        self.lobbies.get_mut(id).ok_or_else(|| LobbyError::NotFound(id.clone()))
    }
}
