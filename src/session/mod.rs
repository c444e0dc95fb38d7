//! Session layer: lobbies and running games behind one owned manager.
//!
//! The manager is the only place that maps player names to seats and that
//! decides when a round resolves. Everything below it works on `Game`
//! directly.

mod event;
mod manager;

pub use event::SessionEvent;
pub use manager::SessionManager;
