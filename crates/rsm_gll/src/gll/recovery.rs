//! Synthesis of recovery edges
//!
//! Recovery edges are edits of the input that let a stuck automaton move on
//! at a cost. Two kinds exist, each with weight 1:
//!
//! - **Insertion**: pretend `t` occurs at the current position. Offered for
//!   the recovery labels of the state that lead somewhere the actual next
//!   token does not.
//! - **Skip**: drop the next input token and stay in the same state.
//!
//! At the end of the input only insertions are possible.

use crate::input::{InputGraph, Vertex};
use crate::rsm::{RsmState, Terminal};
use crate::sppf::Weight;
use smallvec::SmallVec;

/// Cost of a single inserted or skipped token
pub const RECOVERY_WEIGHT: Weight = 1;

/// A synthesized edit of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryEdge<V> {
    /// Inserted terminal, or `None` for a skip
    pub terminal: Option<Terminal>,
    pub target: V,
    pub weight: Weight,
}

/// Recovery edges available to `state` at `position`
pub fn recovery_edges<G: InputGraph>(
    state: &RsmState,
    input: &G,
    position: G::Vertex,
) -> SmallVec<[RecoveryEdge<G::Vertex>; 4]> {
    let mut edges: SmallVec<[RecoveryEdge<G::Vertex>; 4]> = SmallVec::new();
    let input_edges = input.edges(position);

    if input_edges.is_empty() {
        for label in state.error_recovery_labels() {
            if !state.targets_on(label).is_empty() {
                push_unique(&mut edges, insertion(label, position));
            }
        }
        return edges;
    }

    for edge in input_edges {
        let Some(current) = &edge.label else {
            continue;
        };
        let covered = state.targets_on(current);
        for label in state.error_recovery_labels() {
            if label == current {
                continue;
            }
            let reaches_elsewhere = state
                .targets_on(label)
                .iter()
                .any(|target| !covered.contains(target));
            if reaches_elsewhere {
                push_unique(&mut edges, insertion(label, position));
            }
        }
        push_unique(
            &mut edges,
            RecoveryEdge {
                terminal: None,
                target: edge.target,
                weight: RECOVERY_WEIGHT,
            },
        );
    }
    edges
}

fn insertion<V>(label: &Terminal, position: V) -> RecoveryEdge<V> {
    RecoveryEdge {
        terminal: Some(label.clone()),
        target: position,
        weight: RECOVERY_WEIGHT,
    }
}

fn push_unique<V: Vertex>(edges: &mut SmallVec<[RecoveryEdge<V>; 4]>, edge: RecoveryEdge<V>) {
    if !edges.contains(&edge) {
        edges.push(edge);
    }
}
