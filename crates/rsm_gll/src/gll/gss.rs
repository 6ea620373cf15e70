//! Graph-structured stack
//!
//! One node per `(nonterminal, position)`: every call of a nonterminal at a
//! position shares the node, and the callers waiting for it hang off its
//! edges. Nodes are never removed, so they survive incremental edits.

use crate::input::Vertex;
use crate::rsm::{NonterminalId, RsmStateId};
use crate::sppf::{SppfNodeId, Weight};
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

/// Index of a node inside its [`Gss`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GssNodeId(u32);

impl GssNodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("GSS node count exceeds u32::MAX"))
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where to continue once the callee returns: the caller's continuation state
/// and its partial derivation at the call site
pub type GssEdgeLabel = (RsmStateId, Option<SppfNodeId>);

type Callers = SmallVec<[GssNodeId; 2]>;

#[derive(Debug, Clone)]
pub struct GssNode<V> {
    nonterminal: NonterminalId,
    position: V,
    min_weight: Weight,
    edges: HashMap<GssEdgeLabel, Callers, ahash::RandomState>,
}

impl<V: Vertex> GssNode<V> {
    #[must_use]
    pub const fn nonterminal(&self) -> NonterminalId {
        self.nonterminal
    }

    #[must_use]
    pub const fn position(&self) -> V {
        self.position
    }

    /// Cheapest known cost of the input consumed before this call
    #[must_use]
    pub const fn min_weight(&self) -> Weight {
        self.min_weight
    }

    pub fn edges(&self) -> impl Iterator<Item = (&GssEdgeLabel, &[GssNodeId])> {
        self.edges
            .iter()
            .map(|(label, callers)| (label, callers.as_slice()))
    }

    /// Add a caller edge, returning whether it is new
    fn add_edge(&mut self, label: GssEdgeLabel, caller: GssNodeId) -> bool {
        let callers = self.edges.entry(label).or_default();
        if callers.contains(&caller) {
            return false;
        }
        callers.push(caller);
        true
    }
}

#[derive(Debug)]
pub struct Gss<V: Vertex> {
    nodes: Vec<GssNode<V>>,
    index: HashMap<(NonterminalId, V), GssNodeId, ahash::RandomState>,
    popped: HashMap<GssNodeId, HashSet<SppfNodeId, ahash::RandomState>, ahash::RandomState>,
}

impl<V: Vertex> Gss<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::with_hasher(ahash::RandomState::new()),
            popped: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    #[must_use]
    pub fn node(&self, id: GssNodeId) -> &GssNode<V> {
        &self.nodes[id.index()]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find or create the node for `nonterminal` called at `position`.
    ///
    /// An existing node's weight is lowered to `weight` but never raised.
    pub fn get_or_create(
        &mut self,
        nonterminal: NonterminalId,
        position: V,
        weight: Weight,
    ) -> GssNodeId {
        if let Some(&id) = self.index.get(&(nonterminal, position)) {
            let node = &mut self.nodes[id.index()];
            node.min_weight = node.min_weight.min(weight);
            return id;
        }
        let id = GssNodeId::from_index(self.nodes.len());
        self.nodes.push(GssNode {
            nonterminal,
            position,
            min_weight: weight,
            edges: HashMap::with_hasher(ahash::RandomState::new()),
        });
        self.index.insert((nonterminal, position), id);
        id
    }

    /// Record that `caller` waits for `callee` and continues with `label`.
    ///
    /// Returns whether the edge is new.
    pub fn add_edge(&mut self, callee: GssNodeId, label: GssEdgeLabel, caller: GssNodeId) -> bool {
        self.nodes[callee.index()].add_edge(label, caller)
    }

    /// Snapshot of a node's edges, one entry per caller
    #[must_use]
    pub fn callers(&self, id: GssNodeId) -> Vec<(GssEdgeLabel, GssNodeId)> {
        self.nodes[id.index()]
            .edges
            .iter()
            .flat_map(|(label, callers)| callers.iter().map(move |caller| (*label, *caller)))
            .collect()
    }

    /// Remember a completed derivation of `id`
    pub fn record_popped(&mut self, id: GssNodeId, sppf: SppfNodeId) {
        self.popped.entry(id).or_default().insert(sppf);
    }

    /// Derivations already produced by completed calls of `id`
    #[must_use]
    pub fn popped(&self, id: GssNodeId) -> Vec<SppfNodeId> {
        self.popped
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop every edge label and popped result referring to a forest node
    /// for which `alive` is false
    pub fn retain_sppf(&mut self, alive: impl Fn(SppfNodeId) -> bool) {
        for node in &mut self.nodes {
            node.edges
                .retain(|(_, sppf), _| sppf.is_none_or(|id| alive(id)));
        }
        self.popped.retain(|_, set| {
            set.retain(|id| alive(*id));
            !set.is_empty()
        });
    }
}

impl<V: Vertex> Default for Gss<V> {
    fn default() -> Self {
        Self::new()
    }
}
