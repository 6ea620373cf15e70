//! Weight maintenance
//!
//! Relaxation runs upward from a changed node over an explicit queue and only
//! continues through nodes whose weight strictly decreased, so it terminates
//! on cyclic forests.

use super::{INFINITE_WEIGHT, Sppf, SppfNodeId, SppfNodeKind, Weight};
use crate::input::Vertex;
use std::collections::VecDeque;

impl<V: Vertex> Sppf<V> {
    /// Sum of the children of a packed node, a missing left part counting 0
    pub(super) fn packed_weight(&self, packed: SppfNodeId) -> Weight {
        match self.nodes[packed.index()].kind {
            SppfNodeKind::Packed { left, right, .. } => left
                .map_or(0, |left| self.nodes[left.index()].weight)
                .saturating_add(self.nodes[right.index()].weight),
            _ => self.nodes[packed.index()].weight,
        }
    }

    /// Minimum over the packed children of an Item or Symbol node
    pub(super) fn min_child_weight(&self, parent: SppfNodeId) -> Weight {
        self.nodes[parent.index()]
            .children
            .iter()
            .map(|child| self.nodes[child.index()].weight)
            .min()
            .unwrap_or(INFINITE_WEIGHT)
    }

    /// Push a weight change of `changed` up through its ancestors
    pub(super) fn propagate(&mut self, changed: SppfNodeId) {
        let mut queue = VecDeque::from([changed]);

        while let Some(id) = queue.pop_front() {
            let parents = self.nodes[id.index()].parents.clone();
            for parent in parents {
                if !self.nodes[parent.index()].alive {
                    continue;
                }
                let current = self.nodes[parent.index()].weight;
                if self.nodes[parent.index()].is_packed() {
                    let weight = self.packed_weight(parent);
                    if weight < current {
                        self.nodes[parent.index()].weight = weight;
                        queue.push_back(parent);
                    }
                } else {
                    let weight = self.min_child_weight(parent);
                    if weight < current {
                        self.nodes[parent.index()].weight = weight;
                        self.prune_heavier(parent, weight);
                        queue.push_back(parent);
                    }
                }
            }
        }
    }

    /// Drop packed children of `parent` that weigh more than `bound`
    fn prune_heavier(&mut self, parent: SppfNodeId, bound: Weight) {
        let heavier: Vec<SppfNodeId> = self.nodes[parent.index()]
            .children
            .iter()
            .copied()
            .filter(|child| self.nodes[child.index()].weight > bound)
            .collect();

        for packed in heavier {
            self.nodes[parent.index()]
                .children
                .retain(|child| *child != packed);
            self.detach_packed(packed);
            self.evict(packed);
        }
    }

    /// Remove `packed` from the parent lists of its children
    pub(super) fn unlink_from_children(&mut self, packed: SppfNodeId) {
        if let SppfNodeKind::Packed { left, right, .. } = self.nodes[packed.index()].kind {
            for child in left.into_iter().chain([right]) {
                self.nodes[child.index()]
                    .parents
                    .retain(|parent| *parent != packed);
            }
        }
    }

    /// Cut `packed` loose from its children and from its parent
    fn detach_packed(&mut self, packed: SppfNodeId) {
        self.unlink_from_children(packed);
        self.nodes[packed.index()].parents.clear();
    }

    /// Recompute the weight of a node from its children
    pub(super) fn recompute_weight(&self, id: SppfNodeId) -> Weight {
        match self.nodes[id.index()].kind {
            SppfNodeKind::Terminal { .. } => self.nodes[id.index()].weight,
            SppfNodeKind::Packed { .. } => self.packed_weight(id),
            SppfNodeKind::Item { .. } | SppfNodeKind::Symbol { .. } => self.min_child_weight(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsm::{Rsm, RsmBuilder};

    /// S -> 'a' | S 'a'
    fn left_recursive() -> Rsm {
        let mut builder = RsmBuilder::new();
        let s = builder.nonterminal("S");
        let q0 = builder.start_state(s, false);
        let q1 = builder.state(s, false, true);
        let q2 = builder.state(s, false, false);
        builder
            .terminal_edge(q0, "a", q1)
            .nonterminal_edge(q0, s, q2)
            .terminal_edge(q2, "a", q1);
        builder.build(s).unwrap()
    }

    #[test]
    fn test_decrease_travels_through_chain() {
        let rsm = left_recursive();
        let q1 = crate::rsm::RsmStateId::from_index(1);
        let q2 = crate::rsm::RsmStateId::from_index(2);
        let mut sppf: Sppf<usize> = Sppf::new();

        let inserted = sppf.terminal(Some("a".into()), 0, 0, 1);
        let inner = sppf.get_node_p(&rsm, q1, None, inserted);
        let item = sppf.get_node_p(&rsm, q2, None, inner);
        let second = sppf.terminal(Some("a".into()), 0, 1, 0);
        let outer = sppf.get_node_p(&rsm, q1, Some(item), second);
        assert_eq!(sppf.weight(outer), 1);

        // A zero-weight derivation of the inner span lowers every ancestor
        let eps = sppf.epsilon(0);
        sppf.get_node_p(&rsm, q1, None, eps);
        assert_eq!(sppf.weight(inner), 0);
        assert_eq!(sppf.weight(item), 0);
        assert_eq!(sppf.weight(outer), 0);
        assert_eq!(sppf.node(inner).packed_children().len(), 1);
    }

    #[test]
    fn test_self_cycle_terminates() {
        let rsm = left_recursive();
        let q1 = crate::rsm::RsmStateId::from_index(1);
        let mut sppf: Sppf<usize> = Sppf::new();

        let a = sppf.terminal(Some("a".into()), 0, 1, 0);
        let symbol = sppf.get_node_p(&rsm, q1, None, a);
        let eps = sppf.epsilon(1);
        assert_eq!(sppf.get_node_p(&rsm, q1, Some(symbol), eps), symbol);
        assert_eq!(sppf.weight(symbol), 0);
        assert_eq!(sppf.node(symbol).packed_children().len(), 2);
    }
}
