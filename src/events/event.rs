//! Narrative events shown to both players after a round.
//!
//! Messages are templates: `{playerId}` and `{targetId}` stay in the text
//! and are resolved by the consumer with [`NarrativeEvent::render`], so
//! identical events from different seats stay distinguishable only by
//! their `actor` field.

use serde::{Deserialize, Serialize};

use crate::core::{PlayerId, PlayerMap};

/// Placeholder for the acting seat's display name.
pub const ACTOR_PLACEHOLDER: &str = "{playerId}";
/// Placeholder for the targeted seat's display name.
pub const TARGET_PLACEHOLDER: &str = "{targetId}";

/// Icon category of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventIcon {
    Energy,
    Warning,
    Shield,
    Attack,
    Heal,
    Draw,
    Bug,
    Error,
    Info,
}

impl EventIcon {
    /// Glyph shown by the UI.
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            EventIcon::Energy => "⚡",
            EventIcon::Warning => "⚠️",
            EventIcon::Shield => "🛡️",
            EventIcon::Attack => "⚔️",
            EventIcon::Heal => "💚",
            EventIcon::Draw => "🎴",
            EventIcon::Bug => "🐛",
            EventIcon::Error => "❌",
            EventIcon::Info => "ℹ️",
        }
    }
}

/// One line of round narrative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeEvent {
    pub icon: EventIcon,

    /// Message template with `{playerId}` / `{targetId}` placeholders.
    pub message: String,

    /// Free-form detail (not part of deduplication).
    pub details: Option<String>,

    pub actor: Option<PlayerId>,
    pub target: Option<PlayerId>,
}

impl NarrativeEvent {
    /// Create an event with no actor or target.
    pub fn new(icon: EventIcon, message: impl Into<String>) -> Self {
        Self {
            icon,
            message: message.into(),
            details: None,
            actor: None,
            target: None,
        }
    }

    /// Set the acting seat (builder pattern).
    #[must_use]
    pub fn by(mut self, actor: PlayerId) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Set the targeted seat (builder pattern).
    #[must_use]
    pub fn against(mut self, target: PlayerId) -> Self {
        self.target = Some(target);
        self
    }

    /// Attach details (builder pattern).
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // === Standard events ===

    pub fn insufficient_energy(actor: PlayerId, needed: i32, available: i32) -> Self {
        Self::new(EventIcon::Energy, "⚡{playerId}: not enough energy")
            .by(actor)
            .with_details(format!("need {needed}, have {available}"))
    }

    pub fn consume_failed(actor: PlayerId) -> Self {
        Self::new(EventIcon::Warning, "⚡{playerId}: not enough energy to spend").by(actor)
    }

    pub fn attack_blocked(actor: PlayerId) -> Self {
        Self::new(EventIcon::Energy, "⚔️{playerId}: attack blocked (energy gained)")
            .by(actor)
            .with_details("cannot attack in a round where energy is gained")
    }

    pub fn dodge(actor: PlayerId) -> Self {
        Self::new(EventIcon::Shield, "🛡️{playerId}: dodge").by(actor)
    }

    pub fn hide(actor: PlayerId) -> Self {
        Self::new(EventIcon::Shield, "🛡️{playerId}: hide").by(actor)
    }

    pub fn energy_surge(actor: PlayerId) -> Self {
        Self::new(EventIcon::Energy, "⚡{playerId}: energy gained").by(actor)
    }

    pub fn attack(actor: PlayerId, target: PlayerId) -> Self {
        Self::new(EventIcon::Attack, "{playerId} ⚔️ {targetId}")
            .by(actor)
            .against(target)
    }

    pub fn heal(actor: PlayerId) -> Self {
        Self::new(EventIcon::Heal, "💚{playerId}: healing").by(actor)
    }

    pub fn draw(actor: PlayerId) -> Self {
        Self::new(EventIcon::Draw, "🎴{playerId}: draw").by(actor)
    }

    pub fn no_executable_code(actor: PlayerId) -> Self {
        Self::new(EventIcon::Bug, "🐛{playerId}: no executable code")
            .by(actor)
            .with_details("all blocks are bugged")
    }

    pub fn execution_failed(actor: PlayerId, reason: impl Into<String>) -> Self {
        Self::new(EventIcon::Error, "❌{playerId}: execution failed")
            .by(actor)
            .with_details(reason)
    }

    pub fn nothing_happened() -> Self {
        Self::new(EventIcon::Info, "ℹ️ nothing happened")
    }

    /// Key under which identical events collapse within a round.
    #[must_use]
    pub fn dedup_key(&self) -> (EventIcon, &str, Option<PlayerId>) {
        (self.icon, self.message.as_str(), self.actor)
    }

    /// Resolve placeholders against seat display names.
    #[must_use]
    pub fn render(&self, names: &PlayerMap<String>) -> String {
        let mut text = self.message.clone();
        if let Some(actor) = self.actor {
            text = text.replace(ACTOR_PLACEHOLDER, &names[actor]);
        }
        if let Some(target) = self.target {
            text = text.replace(TARGET_PLACEHOLDER, &names[target]);
        }
        text
    }
}
