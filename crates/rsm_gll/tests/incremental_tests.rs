//! Resuming a parse after local edits of the input

mod common;

use common::{
    a_star, a_then_b, dyck, exact, expressions, recovering, recovering_on, root_stats, single_a,
    yield_text,
};
use rsm_gll::gll::{GllParser, ParseStatus};
use rsm_gll::input::{GraphInput, LinearInput};

fn append(parser: &mut GllParser<LinearInput>, token: &str) -> usize {
    let end = parser.input().last_vertex();
    let next = parser.input_mut().add_vertex();
    parser.input_mut().add_edge(end, Some(token.into()), next);
    end
}

#[test]
fn test_append_matches_fresh_parse() {
    let rsm = a_star();
    let (mut parser, _) = exact(&rsm, "aa");
    let edited = append(&mut parser, "a");
    let resumed = parser.parse_from(edited);

    let (fresh_parser, fresh) = exact(&rsm, "aaa");
    assert_eq!(resumed.status, ParseStatus::Accepted);
    assert_eq!(resumed.weight, fresh.weight);
    assert_eq!(root_stats(&parser, &resumed), root_stats(&fresh_parser, &fresh));
    assert_eq!(yield_text(&parser, &resumed), "aaa");
}

#[test]
fn test_closing_a_dyck_word() {
    let rsm = dyck();
    let (mut parser, first) = exact(&rsm, "(()");
    assert_eq!(first.status, ParseStatus::Rejected);

    let edited = append(&mut parser, ")");
    let resumed = parser.parse_from(edited);
    assert_eq!(resumed.status, ParseStatus::Accepted);

    let (fresh_parser, fresh) = exact(&rsm, "(())");
    assert_eq!(root_stats(&parser, &resumed), root_stats(&fresh_parser, &fresh));
}

#[test]
fn test_appending_breaks_and_repairs() {
    let rsm = expressions();
    let (mut parser, first) = exact(&rsm, "x");
    assert_eq!(first.status, ParseStatus::Accepted);

    let plus = append(&mut parser, "+");
    assert_eq!(parser.parse_from(plus).status, ParseStatus::Rejected);

    let operand = append(&mut parser, "x");
    let resumed = parser.parse_from(operand);
    assert_eq!(resumed.status, ParseStatus::Accepted);
    assert_eq!(yield_text(&parser, &resumed), "x+x");

    let (fresh_parser, fresh) = exact(&rsm, "x+x");
    assert_eq!(root_stats(&parser, &resumed), root_stats(&fresh_parser, &fresh));
}

#[test]
fn test_replacing_an_edge() {
    let (mut parser, _) = exact(&a_star(), "aa");

    assert!(parser.input_mut().remove_edge(1, Some(&"a".into()), 2));
    parser.input_mut().add_edge(1, Some("b".into()), 2);
    let broken = parser.parse_from(1);
    assert_eq!(broken.status, ParseStatus::Rejected);
    assert!(broken.root.is_none());

    assert!(parser.input_mut().remove_edge(1, Some(&"b".into()), 2));
    parser.input_mut().add_edge(1, Some("a".into()), 2);
    let repaired = parser.parse_from(1);
    assert_eq!(repaired.status, ParseStatus::Accepted);
    assert_eq!(yield_text(&parser, &repaired), "aa");
}

#[test]
fn test_edit_evicts_stale_forest() {
    let (mut parser, first) = exact(&a_star(), "aa");
    let old_root = first.root.unwrap();
    let live_before = first.stats.sppf_nodes;

    parser.input_mut().remove_edges(1);
    let result = parser.parse_from(1);
    assert!(!parser.sppf().is_alive(old_root));
    assert!(result.stats.sppf_nodes < live_before);

    // Vertex 1 is final again, so "a" is accepted
    assert_eq!(result.status, ParseStatus::Accepted);
    let root = parser.sppf().node(result.root.unwrap());
    assert_eq!(root.right_extent(), 1);
}

#[test]
fn test_edit_at_unvisited_vertex_is_a_no_op() {
    let mut graph: GraphInput<u32> = GraphInput::new();
    graph.add_start_vertex(0);
    graph.add_edge(0, Some("a".into()), 1);
    graph.add_final_vertex(1);

    let mut parser = GllParser::new(single_a(), graph);
    let first = parser.parse();
    assert_eq!(first.status, ParseStatus::Accepted);

    parser.input_mut().add_edge(7, Some("a".into()), 8);
    let resumed = parser.parse_from(7);
    assert_eq!(resumed.status, ParseStatus::Accepted);
    assert_eq!(resumed.root, first.root);
    assert_eq!(
        resumed.stats.default_descriptors,
        first.stats.default_descriptors
    );
}

#[test]
fn test_resume_with_recovery() {
    let rsm = dyck();
    let (mut parser, first) = recovering(&rsm, "((");
    assert_eq!(first.status, ParseStatus::Recovered);
    assert_eq!(first.weight, Some(2));

    let edited = append(&mut parser, ")");
    let resumed = parser.parse_from(edited);
    assert_eq!(resumed.status, ParseStatus::Recovered);
    assert_eq!(resumed.weight, Some(1));

    let edited = append(&mut parser, ")");
    let resumed = parser.parse_from(edited);
    assert_eq!(resumed.status, ParseStatus::Accepted);
    assert_eq!(resumed.weight, Some(0));
    assert_eq!(yield_text(&parser, &resumed), "(())");
}

#[test]
fn test_reachability_survives_edits() {
    let rsm = a_star();
    let (mut parser, first) = exact(&rsm, "a");
    assert_eq!(first.reachability.get(&(0, 1)), Some(&1));

    let edited = append(&mut parser, "a");
    let resumed = parser.parse_from(edited);
    assert_eq!(resumed.reachability.get(&(0, 1)), Some(&1));
    assert_eq!(resumed.reachability.get(&(0, 2)), Some(&2));
}

/// `0 -a-> 1 -a-> 2` and `0 -a-> 3 -a-> 2`, accepting at 2
fn diamond() -> GraphInput<u32> {
    let mut graph = GraphInput::new();
    graph.add_start_vertex(0);
    graph.add_edge(0, Some("a".into()), 1);
    graph.add_edge(1, Some("a".into()), 2);
    graph.add_edge(0, Some("a".into()), 3);
    graph.add_edge(3, Some("a".into()), 2);
    graph.add_final_vertex(2);
    graph
}

#[test]
fn test_surviving_branch_matches_fresh_parse() {
    let rsm = a_star();
    let mut parser = GllParser::new(rsm.clone(), diamond());
    let first = parser.parse();
    assert_eq!(first.status, ParseStatus::Accepted);
    let old_root = first.root.unwrap();
    assert_eq!(parser.sppf().node(old_root).packed_children().len(), 2);

    assert!(parser.input_mut().remove_edge(3, Some(&"a".into()), 2));
    parser.input_mut().add_edge(3, Some("b".into()), 2);
    let resumed = parser.parse_from(3);

    let mut edited = diamond();
    assert!(edited.remove_edge(3, Some(&"a".into()), 2));
    edited.add_edge(3, Some("b".into()), 2);
    let mut fresh_parser = GllParser::new(rsm, edited);
    let fresh = fresh_parser.parse();

    assert_eq!(resumed.status, ParseStatus::Accepted);
    assert_eq!(resumed.root, Some(old_root));
    assert_eq!(resumed.weight, fresh.weight);
    assert_eq!(root_stats(&parser, &resumed), root_stats(&fresh_parser, &fresh));
    assert_eq!(yield_text(&parser, &resumed), "aa");
}

/// `0 -a-> 1 -z-> 3` and a dead end `0 -a-> 4`, accepting at 3
fn detour() -> GraphInput<u32> {
    let mut graph = GraphInput::new();
    graph.add_start_vertex(0);
    graph.add_edge(0, Some("a".into()), 1);
    graph.add_edge(1, Some("z".into()), 3);
    graph.add_edge(0, Some("a".into()), 4);
    graph.add_final_vertex(3);
    graph
}

fn extend_detour(graph: &mut GraphInput<u32>) {
    graph.add_edge(4, Some("x".into()), 6);
    graph.add_edge(6, Some("b".into()), 3);
}

#[test]
fn test_edit_opens_a_cheaper_repair() {
    let rsm = a_then_b();
    let (mut parser, first) = recovering_on(&rsm, detour());
    assert_eq!(first.status, ParseStatus::Recovered);
    assert_eq!(first.weight, Some(2));

    extend_detour(parser.input_mut());
    let resumed = parser.parse_from(4);

    let mut edited = detour();
    extend_detour(&mut edited);
    let (fresh_parser, fresh) = recovering_on(&rsm, edited);
    assert_eq!(fresh.weight, Some(1));

    assert_eq!(resumed.status, ParseStatus::Recovered);
    assert_eq!(resumed.weight, fresh.weight);
    assert_eq!(yield_text(&parser, &resumed), yield_text(&fresh_parser, &fresh));
}
