//! Repair a bracket word and print the chosen derivation as Graphviz.
//!
//! ```text
//! cargo run --example repair_brackets -- "(()"
//! ```

use rsm_gll::gll::{GllConfig, GllParser, RecoveryMode};
use rsm_gll::input::LinearInput;
use rsm_gll::rsm::read_rsm_from_str;
use rsm_gll::sppf::dot_string;

const DYCK: &str = r#"
StartState(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
State(id=0,nonterminal=Nonterminal("S"),isStart=true,isFinal=true)
State(id=1,nonterminal=Nonterminal("S"),isStart=false,isFinal=false)
State(id=2,nonterminal=Nonterminal("S"),isStart=false,isFinal=false)
State(id=3,nonterminal=Nonterminal("S"),isStart=false,isFinal=false)
State(id=4,nonterminal=Nonterminal("S"),isStart=false,isFinal=true)
TerminalEdge(tail=0,head=1,terminal=Terminal("("))
TerminalEdge(tail=2,head=3,terminal=Terminal(")"))
NonterminalEdge(tail=1,head=2,nonterminal=Nonterminal("S"))
NonterminalEdge(tail=3,head=4,nonterminal=Nonterminal("S"))
"#;

fn main() -> rsm_gll::GllResult<()> {
    let word = std::env::args().nth(1).unwrap_or_else(|| "(()".to_string());
    let rsm = read_rsm_from_str(DYCK)?;

    let config = GllConfig::new().with_recovery(RecoveryMode::On);
    let mut parser = GllParser::with_config(rsm, LinearInput::from_chars(&word), config);
    let result = parser.parse();

    println!("status: {:?}", result.status);
    println!("stats:  {:?}", result.stats);
    let Some(root) = result.root else {
        return Ok(());
    };
    let repaired: String = parser
        .sppf()
        .terminal_yield(root)
        .iter()
        .map(|terminal| terminal.as_str())
        .collect();
    println!("weight: {}", parser.sppf().weight(root));
    println!("repair: {repaired}");
    println!("{}", dot_string(parser.sppf(), parser.rsm(), root));
    Ok(())
}
