//! # rsm_gll
//!
//! Generalized LL parsing of input graphs against recursive state machines,
//! with weight-based error recovery and incremental reparsing.
//!
//! ## Overview
//!
//! - **Grammars as automata**: a grammar is given as a recursive state
//!   machine ([`rsm::Rsm`]), one automaton per nonterminal. RSMs can be built
//!   in code or loaded from a line-oriented text format.
//! - **Graph input**: the parser reads any [`input::InputGraph`]. A token
//!   stream is a chain; arbitrary graphs parse every path at once.
//! - **Shared forests**: all derivations end up in one shared packed parse
//!   forest ([`sppf::Sppf`]) where common sub-derivations are stored once.
//! - **Error recovery**: optionally, the parser inserts and skips tokens at a
//!   cost and reports the cheapest derivation it can reach.
//! - **Incremental reparsing**: after editing the edges at a vertex, only
//!   the work depending on those edges is redone.
//!
//! ## Quick Start
//!
//! ```rust
//! use rsm_gll::{GllConfig, GllParser, LinearInput, ParseStatus, RecoveryMode, Rsm};
//! use std::sync::Arc;
//!
//! // S -> '(' S ')' S | epsilon
//! let mut builder = Rsm::builder();
//! let s = builder.nonterminal("S");
//! let q0 = builder.start_state(s, true);
//! let q1 = builder.state(s, false, false);
//! let q2 = builder.state(s, false, false);
//! let q3 = builder.state(s, false, false);
//! let q4 = builder.state(s, false, true);
//! builder
//!     .terminal_edge(q0, "(", q1)
//!     .nonterminal_edge(q1, s, q2)
//!     .terminal_edge(q2, ")", q3)
//!     .nonterminal_edge(q3, s, q4);
//! let rsm = Arc::new(builder.build(s)?);
//!
//! // Balanced input parses exactly
//! let mut parser = GllParser::new(Arc::clone(&rsm), LinearInput::from_chars("(())"));
//! assert_eq!(parser.parse().status, ParseStatus::Accepted);
//!
//! // An unclosed bracket is repaired at weight 1
//! let config = GllConfig::new().with_recovery(RecoveryMode::On);
//! let mut parser = GllParser::with_config(rsm, LinearInput::from_chars("(()"), config);
//! let result = parser.parse();
//! assert_eq!(result.status, ParseStatus::Recovered);
//! assert_eq!(result.weight, Some(1));
//! # Ok::<(), rsm_gll::GllError>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (parse start and finish, incremental
//! invalidation, recovery edges) and never installs a subscriber.

pub mod error;
pub mod gll;
pub mod input;
pub mod rsm;
pub mod sppf;

pub use error::{GllError, GllResult};
pub use gll::{GllConfig, GllParser, ParseResult, ParseStats, ParseStatus, RecoveryMode};
pub use input::{GraphInput, InputEdge, InputGraph, LinearInput};
pub use rsm::{NonterminalId, Rsm, RsmBuilder, RsmState, RsmStateId, Terminal};
pub use sppf::{Sppf, SppfNode, SppfNodeId, SppfNodeKind, Weight};
