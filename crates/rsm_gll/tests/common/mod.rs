//! Grammars and helpers shared by the integration tests

#![allow(dead_code)]

use rsm_gll::gll::{GllConfig, GllParser, ParseResult, RecoveryMode};
use rsm_gll::input::{InputGraph, LinearInput};
use rsm_gll::rsm::{Rsm, RsmBuilder};
use rsm_gll::sppf::SppfStats;
use std::sync::Arc;

/// `S -> '(' S ')' S | epsilon`
pub fn dyck() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, true);
    let q1 = builder.state(s, false, false);
    let q2 = builder.state(s, false, false);
    let q3 = builder.state(s, false, false);
    let q4 = builder.state(s, false, true);
    builder
        .terminal_edge(q0, "(", q1)
        .nonterminal_edge(q1, s, q2)
        .terminal_edge(q2, ")", q3)
        .nonterminal_edge(q3, s, q4);
    Arc::new(builder.build(s).unwrap())
}

/// `S -> 'a' S | epsilon`
pub fn a_star() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, true);
    let q1 = builder.state(s, false, false);
    let q2 = builder.state(s, false, true);
    builder
        .terminal_edge(q0, "a", q1)
        .nonterminal_edge(q1, s, q2);
    Arc::new(builder.build(s).unwrap())
}

/// `S -> S S | 'a'`
pub fn ambiguous_pairs() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, false);
    let q1 = builder.state(s, false, true);
    let q2 = builder.state(s, false, false);
    let q3 = builder.state(s, false, true);
    builder
        .terminal_edge(q0, "a", q1)
        .nonterminal_edge(q0, s, q2)
        .nonterminal_edge(q2, s, q3);
    Arc::new(builder.build(s).unwrap())
}

/// `S -> 'a'`
pub fn single_a() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, false);
    let q1 = builder.state(s, false, true);
    builder.terminal_edge(q0, "a", q1);
    Arc::new(builder.build(s).unwrap())
}

/// `S -> 'a' 'b'`
pub fn a_then_b() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let q0 = builder.start_state(s, false);
    let q1 = builder.state(s, false, false);
    let q2 = builder.state(s, false, true);
    builder.terminal_edge(q0, "a", q1).terminal_edge(q1, "b", q2);
    Arc::new(builder.build(s).unwrap())
}

/// `S -> 'c' A B`, `A -> 'a' A | epsilon`, `B -> 'b' B | epsilon`
pub fn c_a_star_b_star() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let s = builder.nonterminal("S");
    let a = builder.nonterminal("A");
    let b = builder.nonterminal("B");

    let s0 = builder.start_state(s, false);
    let s1 = builder.state(s, false, false);
    let s2 = builder.state(s, false, false);
    let s3 = builder.state(s, false, true);
    builder
        .terminal_edge(s0, "c", s1)
        .nonterminal_edge(s1, a, s2)
        .nonterminal_edge(s2, b, s3);

    let a0 = builder.start_state(a, true);
    let a1 = builder.state(a, false, false);
    let a2 = builder.state(a, false, true);
    builder
        .terminal_edge(a0, "a", a1)
        .nonterminal_edge(a1, a, a2);

    let b0 = builder.start_state(b, true);
    let b1 = builder.state(b, false, false);
    let b2 = builder.state(b, false, true);
    builder
        .terminal_edge(b0, "b", b1)
        .nonterminal_edge(b1, b, b2);

    Arc::new(builder.build(s).unwrap())
}

/// `E -> T | T '+' E`, `T -> 'x' | '(' E ')'`
pub fn expressions() -> Arc<Rsm> {
    let mut builder = RsmBuilder::new();
    let e = builder.nonterminal("E");
    let t = builder.nonterminal("T");

    let e0 = builder.start_state(e, false);
    let e1 = builder.state(e, false, true);
    let e2 = builder.state(e, false, false);
    let e3 = builder.state(e, false, true);
    builder
        .nonterminal_edge(e0, t, e1)
        .terminal_edge(e1, "+", e2)
        .nonterminal_edge(e2, e, e3);

    let t0 = builder.start_state(t, false);
    let t1 = builder.state(t, false, true);
    let t2 = builder.state(t, false, false);
    let t3 = builder.state(t, false, false);
    builder
        .terminal_edge(t0, "x", t1)
        .terminal_edge(t0, "(", t2)
        .nonterminal_edge(t2, e, t3)
        .terminal_edge(t3, ")", t1);

    Arc::new(builder.build(e).unwrap())
}

pub fn exact(rsm: &Arc<Rsm>, text: &str) -> (GllParser<LinearInput>, ParseResult<usize>) {
    let mut parser = GllParser::new(Arc::clone(rsm), LinearInput::from_chars(text));
    let result = parser.parse();
    (parser, result)
}

pub fn recovering(rsm: &Arc<Rsm>, text: &str) -> (GllParser<LinearInput>, ParseResult<usize>) {
    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    let mut parser = GllParser::with_config(Arc::clone(rsm), LinearInput::from_chars(text), config);
    let result = parser.parse();
    (parser, result)
}

pub fn recovering_on<G: InputGraph>(
    rsm: &Arc<Rsm>,
    input: G,
) -> (GllParser<G>, ParseResult<G::Vertex>) {
    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    let mut parser = GllParser::with_config(Arc::clone(rsm), input, config);
    let result = parser.parse();
    (parser, result)
}

/// Terminals of the cheapest derivation, concatenated
pub fn yield_text<G: InputGraph>(
    parser: &GllParser<G>,
    result: &ParseResult<G::Vertex>,
) -> String {
    let root = result.root.expect("parse produced a root");
    parser
        .sppf()
        .terminal_yield(root)
        .iter()
        .map(|terminal| terminal.as_str())
        .collect()
}

pub fn root_stats<G: InputGraph>(
    parser: &GllParser<G>,
    result: &ParseResult<G::Vertex>,
) -> SppfStats {
    let root = result.root.expect("parse produced a root");
    parser.sppf().stats(root)
}

pub fn is_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => return false,
        }
        if depth < 0 {
            return false;
        }
    }
    depth == 0
}
