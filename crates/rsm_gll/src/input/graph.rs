//! General input graph

use super::{InputEdge, InputGraph, Vertex};
use crate::rsm::Terminal;
use hashbrown::{HashMap, HashSet};

/// An input graph over arbitrary vertex identities with explicit start and
/// final vertex sets.
#[derive(Debug, Clone)]
pub struct GraphInput<V: Vertex> {
    edges: HashMap<V, Vec<InputEdge<V>>, ahash::RandomState>,
    start_vertices: Vec<V>,
    final_vertices: HashSet<V, ahash::RandomState>,
}

impl<V: Vertex> GraphInput<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            edges: HashMap::with_hasher(ahash::RandomState::new()),
            start_vertices: Vec::new(),
            final_vertices: HashSet::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Register a vertex without edges
    pub fn add_vertex(&mut self, vertex: V) {
        self.edges.entry(vertex).or_default();
    }

    pub fn add_edge(&mut self, from: V, label: Option<Terminal>, to: V) {
        self.add_vertex(to);
        let edges = self.edges.entry(from).or_default();
        let edge = InputEdge::new(label, to);
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }

    /// Remove one edge, returning whether it existed
    pub fn remove_edge(&mut self, from: V, label: Option<&Terminal>, to: V) -> bool {
        let Some(edges) = self.edges.get_mut(&from) else {
            return false;
        };
        let before = edges.len();
        edges.retain(|edge| !(edge.target == to && edge.label.as_ref() == label));
        edges.len() != before
    }

    pub fn add_start_vertex(&mut self, vertex: V) {
        self.add_vertex(vertex);
        if !self.start_vertices.contains(&vertex) {
            self.start_vertices.push(vertex);
        }
    }

    pub fn add_final_vertex(&mut self, vertex: V) {
        self.add_vertex(vertex);
        self.final_vertices.insert(vertex);
    }

    pub fn remove_final_vertex(&mut self, vertex: V) -> bool {
        self.final_vertices.remove(&vertex)
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.edges.len()
    }
}

impl<V: Vertex> Default for GraphInput<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Vertex> InputGraph for GraphInput<V> {
    type Vertex = V;

    fn start_vertices(&self) -> Vec<V> {
        self.start_vertices.clone()
    }

    fn is_start(&self, vertex: V) -> bool {
        self.start_vertices.contains(&vertex)
    }

    fn is_final(&self, vertex: V) -> bool {
        self.final_vertices.contains(&vertex)
    }

    fn edges(&self, vertex: V) -> &[InputEdge<V>] {
        self.edges.get(&vertex).map_or(&[][..], Vec::as_slice)
    }
}
