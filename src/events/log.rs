//! Per-player execution logs and round-level event deduplication.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::event::NarrativeEvent;
use crate::core::PlayerId;

/// What one seat's authoritative execution produced this round.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub success: bool,
    /// Free-text trace lines, in execution order.
    pub lines: Vec<String>,
    pub events: Vec<NarrativeEvent>,
}

impl ExecutionLog {
    /// Log for a seat that had nothing to run.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Log for a seat whose execution failed.
    #[must_use]
    pub fn failed(player: PlayerId, reason: &str) -> Self {
        Self {
            success: false,
            lines: vec![format!("Execution failed: {reason}")],
            events: vec![NarrativeEvent::execution_failed(player, reason)],
        }
    }
}

/// Keep the first occurrence of each `(icon, message, actor)` triple.
///
/// A round with no events at all reports a single "nothing happened" entry.
#[must_use]
pub fn dedup_round_events(events: impl IntoIterator<Item = NarrativeEvent>) -> Vec<NarrativeEvent> {
    let mut seen = FxHashSet::default();
    let mut out: Vec<NarrativeEvent> = Vec::new();

    for event in events {
        let key = (event.icon, event.message.clone(), event.actor);
        if seen.insert(key) {
            out.push(event);
        }
    }

    if out.is_empty() {
        out.push(NarrativeEvent::nothing_happened());
    }
    out
}
