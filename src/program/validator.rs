//! Structural program rules.
//!
//! `validate` runs on every submission and preview update. `ensure_ready`
//! adds the empty-container rule checked when a player marks ready.

use rustc_hash::FxHashSet;
use thiserror::Error;

use super::node::{ContainerKind, NodeId, Program, ProgramNode};
use crate::cards::CardKey;
use crate::core::RulesConfig;

/// Capacity a container needs before it may hold another container.
pub const NESTING_CAPACITY: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("program exceeds maximum of {max} total blocks")]
    TooManyNodes { max: usize },

    #[error("nested for_loops are not allowed")]
    NestedForLoop,

    #[error("nested if blocks are not allowed")]
    NestedIf,

    #[error("container blocks inside {parent} require capacity 2")]
    NestingNeedsCapacity { parent: ContainerKind },

    #[error("block {node} holds {children} blocks but has capacity {capacity}")]
    OverCapacity { node: NodeId, capacity: u8, children: usize },

    #[error("block {node} has invalid capacity {capacity}")]
    InvalidCapacity { node: NodeId, capacity: u8 },

    #[error("block {0} is not a container and cannot hold blocks")]
    ChildrenOnNonContainer(NodeId),

    #[error("duplicate block id {0}")]
    DuplicateNodeId(NodeId),

    #[error("empty container block present")]
    EmptyContainer,

    #[error("unknown card '{0}'")]
    UnknownCard(String),

    #[error("{0} is a powerup and cannot be placed in a program")]
    NotPlaceable(CardKey),
}

/// Check the tree rules: node budget, unique ids, capacities, and
/// container nesting.
pub fn validate(program: &Program, config: &RulesConfig) -> Result<(), ValidationError> {
    if program.count_nodes() > config.max_program_nodes {
        return Err(ValidationError::TooManyNodes {
            max: config.max_program_nodes,
        });
    }

    let mut seen = FxHashSet::default();
    let mut duplicate = None;
    program.visit(|node, _| {
        if !seen.insert(node.id.clone()) && duplicate.is_none() {
            duplicate = Some(node.id.clone());
        }
    });
    if let Some(id) = duplicate {
        return Err(ValidationError::DuplicateNodeId(id));
    }

    program
        .nodes()
        .iter()
        .try_for_each(|node| validate_node(node, config))
}

fn validate_node(node: &ProgramNode, config: &RulesConfig) -> Result<(), ValidationError> {
    let Some(kind) = node.container else {
        if node.children.is_empty() {
            return Ok(());
        }
        return Err(ValidationError::ChildrenOnNonContainer(node.id.clone()));
    };

    if node.capacity == 0 || node.capacity > config.max_capacity {
        return Err(ValidationError::InvalidCapacity {
            node: node.id.clone(),
            capacity: node.capacity,
        });
    }

    for child in &node.children {
        match child.container {
            Some(child_kind) if child_kind == kind => {
                return Err(match kind {
                    ContainerKind::ForLoop => ValidationError::NestedForLoop,
                    ContainerKind::If => ValidationError::NestedIf,
                });
            }
            Some(_) if node.capacity < NESTING_CAPACITY => {
                return Err(ValidationError::NestingNeedsCapacity { parent: kind });
            }
            _ => {}
        }
    }

    if node.children.len() > usize::from(node.capacity) {
        return Err(ValidationError::OverCapacity {
            node: node.id.clone(),
            capacity: node.capacity,
            children: node.children.len(),
        });
    }

    node.children.iter().try_for_each(|child| validate_node(child, config))
}

/// Rule checked before a player may mark ready.
pub fn ensure_ready(program: &Program) -> Result<(), ValidationError> {
    if program.has_empty_container() {
        Err(ValidationError::EmptyContainer)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardRegistry, StandardCatalog};
    use crate::program::NodeDraft;

    fn check(drafts: Vec<NodeDraft>) -> Result<(), ValidationError> {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let program = Program::build(&drafts, &registry)?;
        validate(&program, &RulesConfig::default())
    }

    #[test]
    fn test_five_nodes_accepted_six_rejected() {
        let five: Vec<_> = (0..5).map(|_| NodeDraft::new("attack")).collect();
        assert!(check(five).is_ok());

        let six: Vec<_> = (0..6).map(|_| NodeDraft::new("attack")).collect();
        let err = check(six).unwrap_err();
        assert_eq!(err, ValidationError::TooManyNodes { max: 5 });
        assert_eq!(err.to_string(), "program exceeds maximum of 5 total blocks");
    }

    #[test]
    fn test_nested_nodes_count_toward_budget() {
        let drafts = vec![
            NodeDraft::new("attack"),
            NodeDraft::new("attack"),
            NodeDraft::new("attack"),
            NodeDraft::new("for_loop")
                .with_capacity(2)
                .with_child(NodeDraft::new("attack"))
                .with_child(NodeDraft::new("attack")),
        ];
        assert_eq!(check(drafts).unwrap_err(), ValidationError::TooManyNodes { max: 5 });
    }

    #[test]
    fn test_same_type_nesting_rejected_at_any_capacity() {
        for capacity in [1, 2] {
            let loops = vec![NodeDraft::new("for_loop")
                .with_capacity(capacity)
                .with_child(NodeDraft::new("for_loop").with_child(NodeDraft::new("attack")))];
            assert_eq!(check(loops).unwrap_err(), ValidationError::NestedForLoop);

            let ifs = vec![NodeDraft::new("if")
                .with_capacity(capacity)
                .with_child(NodeDraft::new("if").with_child(NodeDraft::new("attack")))];
            assert_eq!(check(ifs).unwrap_err(), ValidationError::NestedIf);
        }
    }

    #[test]
    fn test_cross_type_nesting_needs_capacity_two() {
        let nested = |capacity| {
            vec![NodeDraft::new("if")
                .with_capacity(capacity)
                .with_child(NodeDraft::new("for_loop").with_child(NodeDraft::new("attack")))]
        };

        let err = check(nested(1)).unwrap_err();
        assert_eq!(err.to_string(), "container blocks inside if require capacity 2");
        assert!(check(nested(2)).is_ok());
    }

    #[test]
    fn test_over_capacity_rejected() {
        let drafts = vec![NodeDraft::new("for_loop")
            .with_id("loop")
            .with_child(NodeDraft::new("attack"))
            .with_child(NodeDraft::new("healing"))];
        assert_eq!(
            check(drafts).unwrap_err(),
            ValidationError::OverCapacity {
                node: NodeId::new("loop"),
                capacity: 1,
                children: 2,
            }
        );
    }

    #[test]
    fn test_capacity_above_max_rejected() {
        let drafts = vec![NodeDraft::new("if").with_id("c").with_capacity(3).with_child(NodeDraft::new("attack"))];
        assert_eq!(
            check(drafts).unwrap_err(),
            ValidationError::InvalidCapacity {
                node: NodeId::new("c"),
                capacity: 3,
            }
        );
    }

    #[test]
    fn test_children_on_action_rejected() {
        let drafts = vec![NodeDraft::new("attack").with_id("a").with_child(NodeDraft::new("healing"))];
        assert_eq!(
            check(drafts).unwrap_err(),
            ValidationError::ChildrenOnNonContainer(NodeId::new("a"))
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let drafts = vec![NodeDraft::new("attack").with_id("x"), NodeDraft::new("healing").with_id("x")];
        assert_eq!(check(drafts).unwrap_err(), ValidationError::DuplicateNodeId(NodeId::new("x")));
    }

    #[test]
    fn test_empty_container_blocks_ready() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let program = Program::build(
            &[NodeDraft::new("attack"), NodeDraft::new("for_loop")],
            &registry,
        )
        .unwrap();

        assert!(validate(&program, &RulesConfig::default()).is_ok());
        assert_eq!(ensure_ready(&program).unwrap_err().to_string(), "empty container block present");
    }
}
