//! # Input Graphs
//!
//! The parser reads its input as a directed graph of positions. Each edge
//! consumes one terminal, or nothing when its label is `None`. A plain token
//! stream is the special case of a chain.
//!
//! - [`LinearInput`]: a chain of `usize` positions, final where no edge leaves
//! - [`GraphInput`]: an arbitrary graph with explicit start and final sets
//!
//! Both support local edits (adding and removing edges at a vertex) while
//! keeping existing vertex identities, which is what incremental reparsing
//! via [`GllParser::parse_from`](crate::gll::GllParser::parse_from) relies on.

mod graph;
mod linear;

pub use graph::GraphInput;
pub use linear::LinearInput;

use crate::rsm::Terminal;
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements on input graph vertices.
///
/// Implemented for every `Copy + Eq + Hash + Debug` type.
pub trait Vertex: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> Vertex for T {}

/// An outgoing edge of an input vertex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputEdge<V> {
    /// Terminal consumed by the edge, `None` for a structural edge
    pub label: Option<Terminal>,
    pub target: V,
}

impl<V> InputEdge<V> {
    #[must_use]
    pub const fn new(label: Option<Terminal>, target: V) -> Self {
        Self { label, target }
    }

    /// An edge consuming `terminal`
    #[must_use]
    pub fn terminal(terminal: impl Into<Terminal>, target: V) -> Self {
        Self::new(Some(terminal.into()), target)
    }

    /// An edge consuming nothing
    #[must_use]
    pub const fn structural(target: V) -> Self {
        Self::new(None, target)
    }
}

/// A graph of input positions.
pub trait InputGraph {
    /// Vertex identity; must stay stable across edits
    type Vertex: Vertex;

    /// Vertices a complete parse may start at
    fn start_vertices(&self) -> Vec<Self::Vertex>;

    fn is_start(&self, vertex: Self::Vertex) -> bool;

    /// Whether a complete parse may end at `vertex`
    fn is_final(&self, vertex: Self::Vertex) -> bool;

    /// Outgoing edges of `vertex`, empty for unknown vertices
    fn edges(&self, vertex: Self::Vertex) -> &[InputEdge<Self::Vertex>];
}
