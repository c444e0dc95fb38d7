//! Pre-game lobbies.
//!
//! A lobby gathers players until everyone is ready and the host starts
//! the game. Lobbies and games share an id.

mod registry;

pub use registry::{LeaveOutcome, Lobby, LobbyError, LobbyId, LobbyMember, LobbyRegistry};
