//! # Shared Packed Parse Forest
//!
//! The forest is an arena of hash-consed nodes addressed by [`SppfNodeId`].
//! Every logical node (same kind, same key, same extents) exists once per
//! parse session, so derivations that share a sub-span share the node.
//!
//! ## Node kinds
//!
//! - **Terminal**: a consumed input edge, an inserted terminal (recovery), a
//!   skipped edge (recovery) or the epsilon leaf of a nullable automaton
//! - **Item**: partial derivation ending in a non-final RSM state
//! - **Symbol**: complete derivation of a nonterminal over a span
//! - **Packed**: one way of splitting a parent's span into `(left?, right)`.
//!   A parent with several packed children is ambiguous.
//!
//! ## Weights
//!
//! Every node carries an edit weight: 0 for exact matches, the recovery cost
//! otherwise. A packed node weighs the sum of its children, an Item or Symbol
//! node the minimum over its packed children. Weights are kept up to date
//! incrementally by [`Sppf::get_node_p`] and dominated alternatives are
//! dropped as soon as a strictly cheaper one appears.
//!
//! Links in both directions are plain ids. Nodes are never freed; evicted
//! nodes are marked dead and their ids are not reused.

mod dot;
mod invalidate;
mod traverse;
mod weight;

pub use dot::{dot_string, write_dot};
pub use traverse::SppfStats;

use crate::input::Vertex;
use crate::rsm::{NonterminalId, Rsm, RsmStateId, Terminal};
use hashbrown::HashMap;
use smallvec::SmallVec;

/// Edit weight of a derivation.
pub type Weight = u32;

/// Weight of a node that has no derivation yet.
pub const INFINITE_WEIGHT: Weight = Weight::MAX;

/// Index of a node inside its [`Sppf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SppfNodeId(u32);

impl SppfNodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("SPPF node count exceeds u32::MAX"))
    }

    /// Dense index of this node
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The four node shapes of the forest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SppfNodeKind<V> {
    /// Leaf for one input edge, or a recovery edit. `terminal` is `None` for
    /// unlabeled input edges, skipped tokens and the epsilon leaf.
    Terminal { terminal: Option<Terminal> },
    /// Partial derivation up to a non-final RSM state
    Item { state: RsmStateId },
    /// Complete derivation of a nonterminal
    Symbol { nonterminal: NonterminalId },
    /// Split of the parent's span at `pivot`
    Packed {
        state: RsmStateId,
        pivot: V,
        left: Option<SppfNodeId>,
        right: SppfNodeId,
    },
}

/// A node of the forest.
#[derive(Debug, Clone)]
pub struct SppfNode<V> {
    kind: SppfNodeKind<V>,
    left: V,
    right: V,
    weight: Weight,
    parents: SmallVec<[SppfNodeId; 2]>,
    /// Packed children of an Item or Symbol node
    children: SmallVec<[SppfNodeId; 2]>,
    alive: bool,
}

impl<V: Vertex> SppfNode<V> {
    fn new(kind: SppfNodeKind<V>, left: V, right: V, weight: Weight) -> Self {
        Self {
            kind,
            left,
            right,
            weight,
            parents: SmallVec::new(),
            children: SmallVec::new(),
            alive: true,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &SppfNodeKind<V> {
        &self.kind
    }

    #[must_use]
    pub const fn left_extent(&self) -> V {
        self.left
    }

    #[must_use]
    pub const fn right_extent(&self) -> V {
        self.right
    }

    #[must_use]
    pub const fn weight(&self) -> Weight {
        self.weight
    }

    /// Nodes that use this node: packed nodes for leaves, Items and Symbols,
    /// the owning Item or Symbol for packed nodes
    #[must_use]
    pub fn parents(&self) -> &[SppfNodeId] {
        &self.parents
    }

    /// Alternatives of an Item or Symbol node. Empty for other kinds.
    #[must_use]
    pub fn packed_children(&self) -> &[SppfNodeId] {
        &self.children
    }

    /// Whether the node is still part of the forest
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self.kind, SppfNodeKind::Symbol { .. })
    }

    #[must_use]
    pub const fn is_packed(&self) -> bool {
        matches!(self.kind, SppfNodeKind::Packed { .. })
    }

    /// The zero-width leaf produced for nullable automata
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        matches!(self.kind, SppfNodeKind::Terminal { terminal: None }) && self.left == self.right
    }

    /// Children as they appear in the derivation, left to right
    pub(crate) fn successors(&self) -> SmallVec<[SppfNodeId; 2]> {
        match &self.kind {
            SppfNodeKind::Terminal { .. } => SmallVec::new(),
            SppfNodeKind::Item { .. } | SppfNodeKind::Symbol { .. } => self.children.clone(),
            SppfNodeKind::Packed { left, right, .. } => {
                let mut out = SmallVec::new();
                out.extend(*left);
                out.push(*right);
                out
            }
        }
    }

    fn key(&self) -> SppfKey<V> {
        match &self.kind {
            SppfNodeKind::Terminal { terminal } => {
                SppfKey::Terminal(terminal.clone(), self.left, self.right, self.weight)
            }
            SppfNodeKind::Item { state } => SppfKey::Item(*state, self.left, self.right),
            SppfNodeKind::Symbol { nonterminal } => {
                SppfKey::Symbol(*nonterminal, self.left, self.right)
            }
            SppfNodeKind::Packed {
                state,
                pivot,
                left,
                right,
            } => SppfKey::Packed(*state, *pivot, *left, *right),
        }
    }
}

/// Hash-cons key. Recovery weight is part of the terminal key so edited
/// leaves never alias exact ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SppfKey<V> {
    Terminal(Option<Terminal>, V, V, Weight),
    Item(RsmStateId, V, V),
    Symbol(NonterminalId, V, V),
    Packed(RsmStateId, V, Option<SppfNodeId>, SppfNodeId),
}

/// Arena holding every node built during a parse session.
#[derive(Debug)]
pub struct Sppf<V: Vertex> {
    nodes: Vec<SppfNode<V>>,
    index: HashMap<SppfKey<V>, SppfNodeId, ahash::RandomState>,
    /// Non-epsilon terminal leaves by left extent, for invalidation
    terminals_at: HashMap<V, Vec<SppfNodeId>, ahash::RandomState>,
    live: usize,
}

impl<V: Vertex> Sppf<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::with_hasher(ahash::RandomState::new()),
            terminals_at: HashMap::with_hasher(ahash::RandomState::new()),
            live: 0,
        }
    }

    /// Get a node by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this forest.
    #[must_use]
    pub fn node(&self, id: SppfNodeId) -> &SppfNode<V> {
        &self.nodes[id.index()]
    }

    #[must_use]
    pub fn get(&self, id: SppfNodeId) -> Option<&SppfNode<V>> {
        self.nodes.get(id.index())
    }

    #[must_use]
    pub fn weight(&self, id: SppfNodeId) -> Weight {
        self.nodes[id.index()].weight
    }

    #[must_use]
    pub fn is_alive(&self, id: SppfNodeId) -> bool {
        self.nodes.get(id.index()).is_some_and(|node| node.alive)
    }

    /// Number of nodes ever allocated, dead ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes still part of the forest
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live
    }

    /// Iterate over live nodes
    pub fn nodes(&self) -> impl Iterator<Item = (SppfNodeId, &SppfNode<V>)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.alive)
            .map(|(index, node)| (SppfNodeId::from_index(index), node))
    }

    /// Look up the Symbol node of `nonterminal` over `left..right`
    #[must_use]
    pub fn find_symbol(&self, nonterminal: NonterminalId, left: V, right: V) -> Option<SppfNodeId> {
        self.index
            .get(&SppfKey::Symbol(nonterminal, left, right))
            .copied()
    }

    /// Look up the Item node of `state` over `left..right`
    #[must_use]
    pub fn find_item(&self, state: RsmStateId, left: V, right: V) -> Option<SppfNodeId> {
        self.index.get(&SppfKey::Item(state, left, right)).copied()
    }

    /// Get or create a terminal leaf
    pub fn terminal(
        &mut self,
        terminal: Option<Terminal>,
        left: V,
        right: V,
        weight: Weight,
    ) -> SppfNodeId {
        let key = SppfKey::Terminal(terminal.clone(), left, right, weight);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let node = SppfNode::new(SppfNodeKind::Terminal { terminal }, left, right, weight);
        let epsilon = node.is_epsilon();
        let id = self.alloc(key, node);
        if !epsilon {
            self.terminals_at.entry(left).or_default().push(id);
        }
        id
    }

    /// Get or create the epsilon leaf at `position`
    pub fn epsilon(&mut self, position: V) -> SppfNodeId {
        self.terminal(None, position, position, 0)
    }

    /// Combine a partial derivation with the next node.
    ///
    /// Builds the packed node for `(left, right)` under the Symbol node of
    /// `state`'s nonterminal when `state` is final, and under the Item node of
    /// `state` otherwise. The parent spans from the start of `left` (or of
    /// `right` when there is no left part) to the end of `right`. Returns the
    /// parent.
    pub fn get_node_p(
        &mut self,
        rsm: &Rsm,
        state: RsmStateId,
        left: Option<SppfNodeId>,
        right: SppfNodeId,
    ) -> SppfNodeId {
        let right_node = &self.nodes[right.index()];
        let pivot = right_node.left;
        let right_extent = right_node.right;
        let left_extent = left.map_or(pivot, |id| self.nodes[id.index()].left);

        let rsm_state = rsm.state(state);
        let parent = if rsm_state.is_final() {
            self.intern(
                SppfNodeKind::Symbol {
                    nonterminal: rsm_state.nonterminal(),
                },
                left_extent,
                right_extent,
            )
        } else {
            self.intern(SppfNodeKind::Item { state }, left_extent, right_extent)
        };

        // A bare unit step back into the same node would make it its own child
        if left.is_none() && parent == right {
            return parent;
        }

        let packed_kind = SppfNodeKind::Packed {
            state,
            pivot,
            left,
            right,
        };
        let key = SppfKey::Packed(state, pivot, left, right);
        if self.index.contains_key(&key) {
            return parent;
        }

        let packed = self.alloc(
            key,
            SppfNode::new(packed_kind, left_extent, right_extent, INFINITE_WEIGHT),
        );
        if let Some(left) = left {
            self.nodes[left.index()].parents.push(packed);
        }
        self.nodes[right.index()].parents.push(packed);
        self.nodes[packed.index()].parents.push(parent);
        self.nodes[parent.index()].children.push(packed);

        self.nodes[packed.index()].weight = self.packed_weight(packed);
        self.propagate(packed);
        parent
    }

    /// Get or create an Item or Symbol node
    fn intern(&mut self, kind: SppfNodeKind<V>, left: V, right: V) -> SppfNodeId {
        let node = SppfNode::new(kind, left, right, INFINITE_WEIGHT);
        let key = node.key();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        self.alloc(key, node)
    }

    fn alloc(&mut self, key: SppfKey<V>, node: SppfNode<V>) -> SppfNodeId {
        let id = SppfNodeId::from_index(self.nodes.len());
        self.nodes.push(node);
        self.index.insert(key, id);
        self.live += 1;
        id
    }

    /// Mark a node dead and forget its key
    fn evict(&mut self, id: SppfNodeId) {
        let node = &mut self.nodes[id.index()];
        if !node.alive {
            return;
        }
        node.alive = false;
        let key = node.key();
        if self.index.get(&key) == Some(&id) {
            self.index.remove(&key);
        }
        self.live -= 1;
    }
}

impl<V: Vertex> Default for Sppf<V> {
    fn default() -> Self {
        Self::new()
    }
}
