#![no_main]
use libfuzzer_sys::fuzz_target;
use rsm_gll::gll::{GllConfig, GllParser, ParseStatus, RecoveryMode};
use rsm_gll::input::LinearInput;
use rsm_gll::rsm::{Rsm, RsmBuilder};

/// E -> T | T '+' E, T -> 'x' | '(' E ')'
fn expressions() -> Rsm {
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

    builder.build(e).unwrap()
}

fuzz_target!(|data: &[u8]| {
    // Keep inputs short, recovery explores many edits per position
    let tokens: Vec<&str> = data
        .iter()
        .take(24)
        .map(|byte| match byte % 5 {
            0 => "x",
            1 => "+",
            2 => "(",
            3 => ")",
            _ => "y",
        })
        .collect();

    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    let input = LinearInput::from_tokens(tokens.iter().copied());
    let mut parser = GllParser::with_config(expressions(), input, config);
    let result = parser.parse();

    // Recovery always reaches some repair of a non-empty machine
    assert!(matches!(
        result.status,
        ParseStatus::Accepted | ParseStatus::Recovered
    ));
    let root = result.root.unwrap();
    let weight = result.weight.unwrap();
    assert_eq!(weight == 0, result.status == ParseStatus::Accepted);
    assert!(weight as usize <= 2 * tokens.len() + 1);
    assert_eq!(parser.sppf().weight(root), weight);
});
