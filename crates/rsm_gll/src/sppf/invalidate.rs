//! Invalidation of forest structure after an input edit

use super::{INFINITE_WEIGHT, Sppf, SppfNodeId};
use crate::input::Vertex;
use hashbrown::HashSet;
use std::collections::VecDeque;

impl<V: Vertex> Sppf<V> {
    /// Evict everything built on the outgoing edges of `vertex`.
    ///
    /// Every terminal leaf whose left extent is `vertex` dies. A packed node
    /// dies with any of its children, an Item or Symbol node dies once it has
    /// no packed children left, and the cascade continues upward. Survivors
    /// that lost alternatives get their weight recomputed. Epsilon leaves
    /// stay, since they do not depend on any edge.
    ///
    /// Returns the number of evicted nodes. A vertex that no terminal leaf
    /// starts at is a no-op.
    pub fn invalidate(&mut self, vertex: V) -> usize {
        let Some(seeds) = self.terminals_at.remove(&vertex) else {
            return 0;
        };

        let mut queue: VecDeque<SppfNodeId> = VecDeque::new();
        let mut evicted = 0;
        for leaf in seeds {
            if self.nodes[leaf.index()].alive {
                self.evict(leaf);
                evicted += 1;
                queue.push_back(leaf);
            }
        }

        let mut touched: Vec<SppfNodeId> = Vec::new();
        while let Some(dead) = queue.pop_front() {
            let parents = std::mem::take(&mut self.nodes[dead.index()].parents);
            for parent in parents {
                if !self.nodes[parent.index()].alive {
                    continue;
                }
                if self.nodes[parent.index()].is_packed() {
                    self.unlink_from_children(parent);
                    self.evict(parent);
                    evicted += 1;
                    queue.push_back(parent);
                } else {
                    let node = &mut self.nodes[parent.index()];
                    node.children.retain(|child| *child != dead);
                    if node.children.is_empty() {
                        self.evict(parent);
                        evicted += 1;
                        queue.push_back(parent);
                    } else {
                        touched.push(parent);
                    }
                }
            }
        }

        self.reweigh(touched);
        evicted
    }

    /// Recompute weights of survivors and everything above them.
    ///
    /// The upward closure of `touched` is reset to infinity and relaxed back
    /// down to a fixpoint. Nodes outside the closure keep their weights,
    /// since none of their descendants changed.
    fn reweigh(&mut self, touched: Vec<SppfNodeId>) {
        let mut closure: HashSet<SppfNodeId, ahash::RandomState> =
            HashSet::with_hasher(ahash::RandomState::new());
        let mut stack = touched;
        while let Some(id) = stack.pop() {
            if !self.nodes[id.index()].alive || !closure.insert(id) {
                continue;
            }
            stack.extend(self.nodes[id.index()].parents.iter().copied());
        }

        for &id in &closure {
            self.nodes[id.index()].weight = INFINITE_WEIGHT;
        }

        let mut queue: VecDeque<SppfNodeId> = closure.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            let weight = self.recompute_weight(id);
            if weight < self.nodes[id.index()].weight {
                self.nodes[id.index()].weight = weight;
                queue.extend(
                    self.nodes[id.index()]
                        .parents
                        .iter()
                        .copied()
                        .filter(|parent| closure.contains(parent)),
                );
            }
        }
    }
}
