//! Read-only walks over a forest

use super::{Sppf, SppfNodeId, SppfNodeKind};
use crate::input::Vertex;
use crate::rsm::Terminal;
use hashbrown::{HashMap, HashSet};

/// Node counts of the sub-forest reachable from a root.
///
/// Two forests with equal statistics and equal root weight are considered
/// structurally equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SppfStats {
    pub terminal_nodes: usize,
    pub item_nodes: usize,
    pub symbol_nodes: usize,
    pub packed_nodes: usize,
    /// Nodes of any kind with a non-zero weight
    pub weighted_nodes: usize,
}

impl SppfStats {
    /// Total number of reachable nodes
    #[must_use]
    pub const fn total(&self) -> usize {
        self.terminal_nodes + self.item_nodes + self.symbol_nodes + self.packed_nodes
    }
}

enum Frame {
    Enter(SppfNodeId),
    Exit(SppfNodeId),
}

type IdSet = HashSet<SppfNodeId, ahash::RandomState>;

impl<V: Vertex> Sppf<V> {
    /// Terminals of the cheapest derivation under `root`, left to right.
    ///
    /// Inserted terminals are part of the yield, skipped input edges are not.
    /// Alternatives that would re-enter a node already on the current path
    /// are never chosen.
    #[must_use]
    pub fn terminal_yield(&self, root: SppfNodeId) -> Vec<Terminal> {
        let mut out = Vec::new();
        let mut path = IdSet::with_hasher(ahash::RandomState::new());
        let mut stack = vec![Frame::Enter(root)];

        while let Some(frame) = stack.pop() {
            let id = match frame {
                Frame::Exit(id) => {
                    path.remove(&id);
                    continue;
                }
                Frame::Enter(id) => id,
            };
            match self.node(id).kind() {
                SppfNodeKind::Terminal { terminal } => out.extend(terminal.clone()),
                SppfNodeKind::Packed { left, right, .. } => {
                    path.insert(id);
                    stack.push(Frame::Exit(id));
                    stack.push(Frame::Enter(*right));
                    if let Some(left) = left {
                        stack.push(Frame::Enter(*left));
                    }
                }
                SppfNodeKind::Item { .. } | SppfNodeKind::Symbol { .. } => {
                    path.insert(id);
                    if let Some(best) = self.cheapest_acyclic_child(id, &path) {
                        stack.push(Frame::Exit(id));
                        stack.push(Frame::Enter(best));
                    } else {
                        path.remove(&id);
                    }
                }
            }
        }
        out
    }

    fn cheapest_acyclic_child(&self, id: SppfNodeId, path: &IdSet) -> Option<SppfNodeId> {
        self.node(id)
            .packed_children()
            .iter()
            .copied()
            .filter(|packed| {
                self.node(*packed)
                    .successors()
                    .iter()
                    .all(|child| !path.contains(child))
            })
            .min_by_key(|packed| self.weight(*packed))
    }

    /// Smallest number of input edges spanned by a derivation under `root`.
    ///
    /// Zero-width leaves (epsilon, inserted terminals) do not count.
    #[must_use]
    pub fn min_distance(&self, root: SppfNodeId) -> usize {
        let mut memo: HashMap<SppfNodeId, Option<usize>, ahash::RandomState> =
            HashMap::with_hasher(ahash::RandomState::new());
        let mut on_stack = IdSet::with_hasher(ahash::RandomState::new());
        let mut stack = vec![Frame::Enter(root)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id) => {
                    if memo.contains_key(&id) || !on_stack.insert(id) {
                        continue;
                    }
                    stack.push(Frame::Exit(id));
                    for child in self.node(id).successors() {
                        if !memo.contains_key(&child) && !on_stack.contains(&child) {
                            stack.push(Frame::Enter(child));
                        }
                    }
                }
                Frame::Exit(id) => {
                    on_stack.remove(&id);
                    let node = self.node(id);
                    // Children still missing from the memo sit on a cycle
                    let of = |child: &SppfNodeId| memo.get(child).copied().flatten();
                    let distance = match node.kind() {
                        SppfNodeKind::Terminal { .. } => {
                            Some(usize::from(node.left_extent() != node.right_extent()))
                        }
                        SppfNodeKind::Packed { left, right, .. } => {
                            let left = match left {
                                Some(left) => of(left),
                                None => Some(0),
                            };
                            left.zip(of(right)).map(|(l, r)| l + r)
                        }
                        SppfNodeKind::Item { .. } | SppfNodeKind::Symbol { .. } => {
                            node.packed_children().iter().filter_map(of).min()
                        }
                    };
                    memo.insert(id, distance);
                }
            }
        }

        memo.get(&root).copied().flatten().unwrap_or_default()
    }

    /// Count the nodes reachable from `root` by kind
    #[must_use]
    pub fn stats(&self, root: SppfNodeId) -> SppfStats {
        let mut stats = SppfStats::default();
        let mut visited = IdSet::with_hasher(ahash::RandomState::new());
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = self.node(id);
            match node.kind() {
                SppfNodeKind::Terminal { .. } => stats.terminal_nodes += 1,
                SppfNodeKind::Item { .. } => stats.item_nodes += 1,
                SppfNodeKind::Symbol { .. } => stats.symbol_nodes += 1,
                SppfNodeKind::Packed { .. } => stats.packed_nodes += 1,
            }
            if node.weight() > 0 {
                stats.weighted_nodes += 1;
            }
            stack.extend(node.successors());
        }
        stats
    }
}
