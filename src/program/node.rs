//! Program tree types.
//!
//! A `Program` is an ordered forest of `ProgramNode`s held in persistent
//! `im::Vector`s, so the stored program and its preview are independent
//! snapshots that share structure until one of them is rewritten.
//!
//! Clients send `NodeDraft`s. `Program::build` resolves every card key
//! against the registry once, merges default parameters, and assigns ids;
//! from then on a node always refers to its card by `CardKey`.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::validator::ValidationError;
use crate::cards::{CardKey, CardRegistry, Params};

/// Stable identifier of a node, used by powerups to target it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two container block types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    ForLoop,
    If,
}

impl ContainerKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContainerKind::ForLoop => "for_loop",
            ContainerKind::If => "if",
        }
    }
}

impl std::fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One block of a program.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramNode {
    pub id: NodeId,
    pub card: CardKey,

    /// Copied from the card definition so tree rules need no registry.
    pub container: Option<ContainerKind>,

    /// Card defaults overlaid with node overrides.
    pub params: Params,

    /// Disables this node and its whole subtree.
    pub bugged: bool,

    /// Maximum direct children. Zero for non-containers.
    pub capacity: u8,

    pub children: Vector<ProgramNode>,
}

impl ProgramNode {
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.container.is_some()
    }
}

/// A player's program: top-level nodes in execution order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub(crate) nodes: Vector<ProgramNode>,
}

impl Program {
    #[must_use]
    pub fn new(nodes: Vector<ProgramNode>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &Vector<ProgramNode> {
        &self.nodes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve drafts into a program.
    ///
    /// Unknown keys and powerup cards are rejected here; structural rules
    /// are left to `validate`. Nodes without an id get one derived from
    /// their position.
    pub fn build(drafts: &[NodeDraft], registry: &CardRegistry) -> Result<Program, ValidationError> {
        let nodes = build_level(drafts, registry, "node")?;
        Ok(Program { nodes })
    }
}

fn build_level(
    drafts: &[NodeDraft],
    registry: &CardRegistry,
    prefix: &str,
) -> Result<Vector<ProgramNode>, ValidationError> {
    let mut nodes = Vector::new();
    for (index, draft) in drafts.iter().enumerate() {
        let path = format!("{prefix}-{index}");
        let definition = registry
            .get(&draft.card)
            .ok_or_else(|| ValidationError::UnknownCard(draft.card.clone()))?;
        if !definition.category.is_placeable() {
            return Err(ValidationError::NotPlaceable(definition.key.clone()));
        }

        nodes.push_back(ProgramNode {
            id: draft.id.as_deref().map_or_else(|| NodeId::new(path.clone()), NodeId::from),
            card: definition.key.clone(),
            container: definition.container,
            params: definition.defaults.merged(&draft.params),
            bugged: draft.bugged,
            capacity: if definition.is_container() {
                draft.capacity.unwrap_or(definition.base_capacity)
            } else {
                0
            },
            children: build_level(&draft.children, registry, &path)?,
        });
    }
    Ok(nodes)
}

/// Client-side description of a node, before card resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub card: String,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub capacity: Option<u8>,
    #[serde(default)]
    pub bugged: bool,
    #[serde(default)]
    pub children: Vec<NodeDraft>,
}

impl NodeDraft {
    pub fn new(card: impl Into<String>) -> Self {
        Self {
            card: card.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<crate::cards::ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_capacity(mut self, capacity: u8) -> Self {
        self.capacity = Some(capacity);
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: NodeDraft) -> Self {
        self.children.push(child);
        self
    }
}
