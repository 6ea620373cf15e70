//! Inputs without an exact derivation

mod common;

use common::{a_star, c_a_star_b_star, dyck, exact, expressions, single_a};
use rsm_gll::gll::{GllConfig, GllParser, ParseStatus, RecoveryMode};
use rsm_gll::input::{GraphInput, LinearInput};

#[test]
fn test_unbalanced_dyck_words() {
    let rsm = dyck();
    for word in ["(", ")", ")(", "(()", "())", "(()))("] {
        let (_, result) = exact(&rsm, word);
        assert_eq!(result.status, ParseStatus::Rejected, "{word:?}");
        assert!(result.root.is_none());
        assert!(result.weight.is_none());
        assert_eq!(result.stats.recovery_descriptors, 0);
    }
}

#[test]
fn test_single_token_grammar() {
    let rsm = single_a();
    for word in ["", "aa", "b", "ab"] {
        let (_, result) = exact(&rsm, word);
        assert_eq!(result.status, ParseStatus::Rejected, "{word:?}");
    }
}

#[test]
fn test_foreign_tokens() {
    assert_eq!(exact(&a_star(), "aab").1.status, ParseStatus::Rejected);
    assert_eq!(exact(&c_a_star_b_star(), "cba").1.status, ParseStatus::Rejected);
    assert_eq!(exact(&c_a_star_b_star(), "ab").1.status, ParseStatus::Rejected);
    assert_eq!(exact(&expressions(), "x+").1.status, ParseStatus::Rejected);
    assert_eq!(exact(&expressions(), "(x").1.status, ParseStatus::Rejected);
}

#[test]
fn test_rejected_input_keeps_no_reachability() {
    let (_, result) = exact(&single_a(), "b");
    assert!(result.reachability.is_empty());
}

#[test]
fn test_recovery_without_final_vertices_is_exhausted() {
    let mut graph: GraphInput<u32> = GraphInput::new();
    graph.add_start_vertex(0);
    graph.add_edge(0, Some("a".into()), 1);

    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    let mut parser = GllParser::with_config(single_a(), graph, config);
    let result = parser.parse();
    assert_eq!(result.status, ParseStatus::RecoveryExhausted);
    assert!(result.root.is_none());
    assert!(result.stats.recovery_descriptors > 0);
}

#[test]
fn test_descriptor_budget() {
    let config = GllConfig::new().with_descriptor_budget(Some(5));
    let mut parser =
        GllParser::with_config(dyck(), LinearInput::from_chars("((((()))))"), config);
    let result = parser.parse();
    assert_eq!(result.status, ParseStatus::BudgetExhausted);
    assert!(result.root.is_none());
    assert_eq!(result.stats.default_descriptors, 5);
}
