//! Graphviz export of a forest

use super::{Sppf, SppfNodeId, SppfNodeKind};
use crate::error::GllResult;
use crate::input::Vertex;
use crate::rsm::Rsm;
use hashbrown::HashSet;
use std::fmt::Write as _;
use std::io::Write;

/// Render the sub-forest reachable from `root` as a DOT digraph.
///
/// Symbol nodes are ellipses, Item nodes boxes, packed nodes points and
/// terminal leaves filled boxes. Nodes with a non-zero weight are drawn red.
#[must_use]
pub fn dot_string<V: Vertex>(sppf: &Sppf<V>, rsm: &Rsm, root: SppfNodeId) -> String {
    let mut output = String::new();
    // Writing to a String cannot fail
    let _ = writeln!(output, "digraph Sppf {{");
    let _ = writeln!(output, "  rankdir=TB;");

    let mut visited: HashSet<SppfNodeId, ahash::RandomState> =
        HashSet::with_hasher(ahash::RandomState::new());
    let mut stack = vec![root];
    let mut edges = Vec::new();

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let node = sppf.node(id);
        let range = format!("{:?}, {:?}", node.left_extent(), node.right_extent());
        let (label, shape) = match node.kind() {
            SppfNodeKind::Terminal { terminal: Some(terminal) } => (
                format!("{terminal}, {range}"),
                "shape=box, style=filled, fillcolor=lightblue",
            ),
            SppfNodeKind::Terminal { terminal: None } if node.is_epsilon() => {
                (format!("eps, {range}"), "shape=box, style=dashed")
            }
            SppfNodeKind::Terminal { terminal: None } => {
                (format!("skip, {range}"), "shape=box, style=dashed")
            }
            SppfNodeKind::Item { state } => {
                (format!("q{}, {range}", state.index()), "shape=box")
            }
            SppfNodeKind::Symbol { nonterminal } => (
                format!("{}, {range}", rsm.nonterminal_name(*nonterminal)),
                "shape=ellipse",
            ),
            SppfNodeKind::Packed { state, pivot, .. } => {
                (format!("q{}, {pivot:?}", state.index()), "shape=point")
            }
        };
        let color = if node.weight() > 0 { ", color=red" } else { "" };
        let _ = writeln!(
            output,
            "  n{} [label=\"{}\", {}{}];",
            id.index(),
            escape(&label),
            shape,
            color
        );

        for child in node.successors() {
            edges.push((id, child));
            stack.push(child);
        }
    }

    let _ = writeln!(output);
    for (from, to) in edges {
        let _ = writeln!(output, "  n{} -> n{};", from.index(), to.index());
    }
    let _ = writeln!(output, "}}");
    output
}

/// Write the DOT rendering of the forest under `root`
///
/// # Errors
///
/// Propagates failures of `writer`.
pub fn write_dot<V: Vertex, W: Write>(
    sppf: &Sppf<V>,
    rsm: &Rsm,
    root: SppfNodeId,
    mut writer: W,
) -> GllResult<()> {
    writer.write_all(dot_string(sppf, rsm, root).as_bytes())?;
    Ok(())
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
