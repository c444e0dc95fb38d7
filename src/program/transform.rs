//! Tree transforms shared by the validator, interpreter, turn actions, and
//! powerup resolver.
//!
//! Every rewrite returns a new `Program`; the receiver is never mutated, so
//! a program and its preview can be updated independently.

use im::Vector;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::node::{NodeId, Program, ProgramNode};
use crate::cards::CardKey;

/// Node ids of one subtree. Programs hold at most a handful of nodes.
pub type SubtreeIds = SmallVec<[NodeId; 5]>;

impl Program {
    /// Visit every node pre-order with its depth (top level = 0).
    pub fn visit(&self, mut f: impl FnMut(&ProgramNode, usize)) {
        fn go(nodes: &Vector<ProgramNode>, depth: usize, f: &mut dyn FnMut(&ProgramNode, usize)) {
            for node in nodes {
                f(node, depth);
                go(&node.children, depth + 1, f);
            }
        }
        go(&self.nodes, 0, &mut f);
    }

    /// Fold over every node pre-order.
    pub fn fold<A>(&self, init: A, mut f: impl FnMut(A, &ProgramNode) -> A) -> A {
        fn go<A>(nodes: &Vector<ProgramNode>, acc: A, f: &mut dyn FnMut(A, &ProgramNode) -> A) -> A {
            let mut acc = acc;
            for node in nodes {
                acc = f(acc, node);
                acc = go(&node.children, acc, f);
            }
            acc
        }
        go(&self.nodes, init, &mut f)
    }

    /// Total nodes, descendants included.
    #[must_use]
    pub fn count_nodes(&self) -> usize {
        self.fold(0, |n, _| n + 1)
    }

    #[must_use]
    pub fn find(&self, id: &NodeId) -> Option<&ProgramNode> {
        fn go<'a>(nodes: &'a Vector<ProgramNode>, id: &NodeId) -> Option<&'a ProgramNode> {
            nodes
                .iter()
                .find_map(|n| if &n.id == id { Some(n) } else { go(&n.children, id) })
        }
        go(&self.nodes, id)
    }

    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Whether `id` sits inside another node.
    #[must_use]
    pub fn is_nested(&self, id: &NodeId) -> bool {
        let mut nested = false;
        self.visit(|node, depth| {
            if &node.id == id && depth > 0 {
                nested = true;
            }
        });
        nested
    }

    /// Ids of `id` and all its descendants, pre-order. Empty when absent.
    #[must_use]
    pub fn subtree_ids(&self, id: &NodeId) -> SubtreeIds {
        let mut ids = SubtreeIds::new();
        if let Some(root) = self.find(id) {
            Program::new(Vector::unit(root.clone())).visit(|n, _| ids.push(n.id.clone()));
        }
        ids
    }

    /// Apply `f` to every node.
    #[must_use]
    pub fn map_nodes(&self, mut f: impl FnMut(&mut ProgramNode)) -> Program {
        let mut nodes = self.nodes.clone();
        for node in nodes.iter_mut() {
            apply_all(node, &mut f);
        }
        Program { nodes }
    }

    /// Apply `f` to the node `id` only. `None` when absent.
    #[must_use]
    pub fn update_node(&self, id: &NodeId, mut f: impl FnMut(&mut ProgramNode)) -> Option<Program> {
        let mut nodes = self.nodes.clone();
        update_in(&mut nodes, id, &mut f, false).then_some(Program { nodes })
    }

    /// Apply `f` to the node `id` and all its descendants. `None` when absent.
    #[must_use]
    pub fn update_subtree(&self, id: &NodeId, mut f: impl FnMut(&mut ProgramNode)) -> Option<Program> {
        let mut nodes = self.nodes.clone();
        update_in(&mut nodes, id, &mut f, true).then_some(Program { nodes })
    }

    #[must_use]
    pub fn set_bugged_subtree(&self, id: &NodeId, bugged: bool) -> Option<Program> {
        self.update_subtree(id, |n| n.bugged = bugged)
    }

    /// Drop bugged nodes together with their subtrees.
    #[must_use]
    pub fn without_bugged(&self) -> Program {
        fn strip(nodes: &Vector<ProgramNode>) -> Vector<ProgramNode> {
            nodes
                .iter()
                .filter(|n| !n.bugged)
                .map(|n| ProgramNode {
                    children: strip(&n.children),
                    ..n.clone()
                })
                .collect()
        }
        Program {
            nodes: strip(&self.nodes),
        }
    }

    /// Keep bug marks and capacity upgrades that `previous` holds for nodes
    /// with the same id and card.
    #[must_use]
    pub fn carry_over_from(&self, previous: &Program) -> Program {
        let mut carried: FxHashMap<NodeId, (CardKey, bool, u8)> = FxHashMap::default();
        previous.visit(|n, _| {
            carried.insert(n.id.clone(), (n.card.clone(), n.bugged, n.capacity));
        });
        self.map_nodes(|node| {
            if let Some((card, bugged, capacity)) = carried.get(&node.id) {
                if *card != node.card {
                    return;
                }
                node.bugged |= *bugged;
                if node.is_container() {
                    node.capacity = node.capacity.max(*capacity);
                }
            }
        })
    }

    /// Whether any container, at any depth, has no children.
    #[must_use]
    pub fn has_empty_container(&self) -> bool {
        self.fold(false, |found, n| found || (n.is_container() && n.children.is_empty()))
    }
}

fn apply_all(node: &mut ProgramNode, f: &mut dyn FnMut(&mut ProgramNode)) {
    f(node);
    for child in node.children.iter_mut() {
        apply_all(child, f);
    }
}

fn update_in(
    nodes: &mut Vector<ProgramNode>,
    id: &NodeId,
    f: &mut dyn FnMut(&mut ProgramNode),
    whole_subtree: bool,
) -> bool {
    for node in nodes.iter_mut() {
        if &node.id == id {
            if whole_subtree {
                apply_all(node, f);
            } else {
                f(node);
            }
            return true;
        }
        if update_in(&mut node.children, id, f, whole_subtree) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardRegistry, StandardCatalog};
    use crate::program::NodeDraft;

    fn program() -> Program {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let drafts = vec![
            NodeDraft::new("attack").with_id("a"),
            NodeDraft::new("for_loop")
                .with_id("loop")
                .with_capacity(2)
                .with_child(NodeDraft::new("if").with_id("cond").with_child(NodeDraft::new("healing").with_id("h")))
                .with_child(NodeDraft::new("dodge").with_id("d")),
        ];
        Program::build(&drafts, &registry).unwrap()
    }

    #[test]
    fn test_count_and_find() {
        let p = program();
        assert_eq!(p.count_nodes(), 5);
        assert!(p.contains(&NodeId::new("h")));
        assert!(!p.contains(&NodeId::new("missing")));
        assert!(p.is_nested(&NodeId::new("cond")));
        assert!(!p.is_nested(&NodeId::new("loop")));
    }

    #[test]
    fn test_bug_subtree_leaves_original_untouched() {
        let p = program();
        let bugged = p.set_bugged_subtree(&NodeId::new("cond"), true).unwrap();

        assert!(bugged.find(&NodeId::new("cond")).unwrap().bugged);
        assert!(bugged.find(&NodeId::new("h")).unwrap().bugged);
        assert!(!bugged.find(&NodeId::new("d")).unwrap().bugged);
        assert!(!p.find(&NodeId::new("h")).unwrap().bugged);
    }

    #[test]
    fn test_update_missing_node_is_none() {
        assert!(program().set_bugged_subtree(&NodeId::new("nope"), true).is_none());
    }

    #[test]
    fn test_without_bugged_drops_subtree() {
        let p = program().set_bugged_subtree(&NodeId::new("loop"), true).unwrap();
        let clean = p.without_bugged();
        assert_eq!(clean.count_nodes(), 1);
        assert_eq!(p.count_nodes(), 5);
    }

    #[test]
    fn test_subtree_ids() {
        let ids = program().subtree_ids(&NodeId::new("loop"));
        let ids: Vec<_> = ids.iter().map(NodeId::as_str).collect();
        assert_eq!(ids, vec!["loop", "cond", "h", "d"]);
    }

    #[test]
    fn test_carry_over_keeps_bugs_and_capacity() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let previous = program()
            .set_bugged_subtree(&NodeId::new("a"), true)
            .unwrap()
            .update_node(&NodeId::new("cond"), |n| n.capacity = 2)
            .unwrap();

        let fresh = Program::build(
            &[
                NodeDraft::new("attack").with_id("a"),
                NodeDraft::new("if").with_id("cond").with_child(NodeDraft::new("draw")),
            ],
            &registry,
        )
        .unwrap();
        let carried = fresh.carry_over_from(&previous);

        assert!(carried.find(&NodeId::new("a")).unwrap().bugged);
        assert_eq!(carried.find(&NodeId::new("cond")).unwrap().capacity, 2);
    }

    #[test]
    fn test_empty_container_detection() {
        let registry = CardRegistry::from_catalog(&StandardCatalog);
        let p = Program::build(&[NodeDraft::new("attack"), NodeDraft::new("if")], &registry).unwrap();
        assert!(p.has_empty_container());
        assert!(!program().has_empty_container());
    }
}
