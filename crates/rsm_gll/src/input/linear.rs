//! Chain of token positions

use super::{InputEdge, InputGraph};
use crate::rsm::Terminal;

/// A linear input: vertices `0..n`, usually one edge from each vertex to the
/// next.
///
/// Vertex `0` is the start vertex unless others are added. A vertex is final
/// when no edge leaves it, so appending a token moves the end of the input.
///
/// # Examples
///
/// ```
/// use rsm_gll::input::{InputGraph, LinearInput};
///
/// let mut input = LinearInput::from_chars("ab");
/// assert_eq!(input.vertex_count(), 3);
/// assert!(input.is_final(2));
///
/// let end = input.last_vertex();
/// let next = input.add_vertex();
/// input.add_edge(end, Some("c".into()), next);
/// assert!(!input.is_final(2));
/// assert!(input.is_final(3));
/// ```
#[derive(Debug, Clone)]
pub struct LinearInput {
    edges: Vec<Vec<InputEdge<usize>>>,
    start_vertices: Vec<usize>,
}

impl LinearInput {
    /// An input with a single vertex `0`, which is both start and final
    #[must_use]
    pub fn new() -> Self {
        Self {
            edges: vec![Vec::new()],
            start_vertices: vec![0],
        }
    }

    /// One edge per token, labeled with the token
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Terminal>,
    {
        let mut input = Self::new();
        for token in tokens {
            let from = input.last_vertex();
            let to = input.add_vertex();
            input.add_edge(from, Some(token.into()), to);
        }
        input
    }

    /// One edge per character
    #[must_use]
    pub fn from_chars(text: &str) -> Self {
        Self::from_tokens(text.chars())
    }

    /// Add a fresh vertex and return it
    pub fn add_vertex(&mut self) -> usize {
        self.edges.push(Vec::new());
        self.edges.len() - 1
    }

    /// Add an edge, creating missing vertices up to `from` and `to`
    pub fn add_edge(&mut self, from: usize, label: Option<Terminal>, to: usize) {
        let needed = from.max(to) + 1;
        if self.edges.len() < needed {
            self.edges.resize_with(needed, Vec::new);
        }
        let edge = InputEdge::new(label, to);
        if !self.edges[from].contains(&edge) {
            self.edges[from].push(edge);
        }
    }

    /// Remove and return every edge leaving `vertex`
    pub fn remove_edges(&mut self, vertex: usize) -> Vec<InputEdge<usize>> {
        self.edges
            .get_mut(vertex)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    /// Remove one edge, returning whether it existed
    pub fn remove_edge(&mut self, from: usize, label: Option<&Terminal>, to: usize) -> bool {
        let Some(edges) = self.edges.get_mut(from) else {
            return false;
        };
        let before = edges.len();
        edges.retain(|edge| !(edge.target == to && edge.label.as_ref() == label));
        edges.len() != before
    }

    pub fn add_start_vertex(&mut self, vertex: usize) {
        if !self.start_vertices.contains(&vertex) {
            self.start_vertices.push(vertex);
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.edges.len()
    }

    /// The most recently added vertex
    #[must_use]
    pub fn last_vertex(&self) -> usize {
        self.edges.len() - 1
    }
}

impl Default for LinearInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputGraph for LinearInput {
    type Vertex = usize;

    fn start_vertices(&self) -> Vec<usize> {
        self.start_vertices.clone()
    }

    fn is_start(&self, vertex: usize) -> bool {
        self.start_vertices.contains(&vertex)
    }

    fn is_final(&self, vertex: usize) -> bool {
        self.edges(vertex).is_empty()
    }

    fn edges(&self, vertex: usize) -> &[InputEdge<usize>] {
        self.edges.get(vertex).map_or(&[][..], Vec::as_slice)
    }
}
