//! Round narrative: templated events, per-player logs, deduplication.

pub mod event;
pub mod log;

pub use event::{EventIcon, NarrativeEvent, ACTOR_PLACEHOLDER, TARGET_PLACEHOLDER};
pub use log::{dedup_round_events, ExecutionLog};
