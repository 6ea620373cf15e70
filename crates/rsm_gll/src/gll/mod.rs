//! # GLL Parser
//!
//! Generalized LL parsing driven by a recursive state machine over an input
//! graph, producing a shared packed parse forest.
//!
//! ## Overview
//!
//! The parser explores every derivation at once. Units of work
//! ([`Descriptor`]s) say where the automaton is, which call it is in (a node
//! of the graph-structured stack) and what it has derived so far (a forest
//! node). Calls of the same nonterminal at the same position share one stack
//! node, so left recursion and ambiguity terminate and share work.
//!
//! ## Error recovery
//!
//! With [`RecoveryMode::On`], descriptors that are stuck also try inserting a
//! terminal or skipping a token, each at weight 1. Exact work always runs
//! first; costed work is drained cheapest first until an accepting
//! derivation exists, so the reported root has the minimal edit weight
//! reachable by the search.
//!
//! ## Incremental reparsing
//!
//! After the edges leaving a vertex are edited through
//! [`GllParser::input_mut`], [`GllParser::parse_from`] evicts the forest built
//! on the old edges and resumes from the descriptors that were processed at
//! that vertex, reusing everything else.
//!
//! ## Example
//!
//! ```
//! use rsm_gll::gll::{GllParser, ParseStatus};
//! use rsm_gll::input::LinearInput;
//! use rsm_gll::rsm::Rsm;
//!
//! // S -> 'a' S | epsilon
//! let mut builder = Rsm::builder();
//! let s = builder.nonterminal("S");
//! let q0 = builder.start_state(s, true);
//! let q1 = builder.state(s, false, false);
//! let q2 = builder.state(s, false, true);
//! builder.terminal_edge(q0, "a", q1);
//! builder.nonterminal_edge(q1, s, q2);
//! let rsm = builder.build(s)?;
//!
//! let mut parser = GllParser::new(rsm, LinearInput::from_chars("aa"));
//! let result = parser.parse();
//! assert_eq!(result.status, ParseStatus::Accepted);
//! assert_eq!(result.weight, Some(0));
//! # Ok::<(), rsm_gll::error::GllError>(())
//! ```

mod gss;
mod parser;
mod recovery;
mod state;
mod worklist;

pub use gss::{Gss, GssEdgeLabel, GssNode, GssNodeId};
pub use recovery::{RECOVERY_WEIGHT, RecoveryEdge, recovery_edges};
pub use state::{GllState, Reachability};
pub use worklist::{Descriptor, Pool, Worklist};

use crate::input::InputGraph;
use crate::rsm::Rsm;
use crate::sppf::{Sppf, SppfNodeId, Weight};
use std::sync::Arc;

/// Whether stuck descriptors may edit the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum RecoveryMode {
    /// Only exact derivations
    #[default]
    Off,
    /// Insertions and skips at weight 1 each
    On,
}

impl RecoveryMode {
    #[must_use]
    pub const fn is_enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Configuration options for the GLL parser
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct GllConfig {
    /// Error recovery mode
    pub recovery: RecoveryMode,

    /// Maximum number of descriptors processed per run
    pub descriptor_budget: Option<usize>,

    /// Record minimal accepted path lengths per start/final vertex pair
    pub track_reachability: bool,
}

impl Default for GllConfig {
    fn default() -> Self {
        Self {
            recovery: RecoveryMode::Off,
            descriptor_budget: None,
            track_reachability: true,
        }
    }
}

impl GllConfig {
    /// Create a new configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the error recovery mode
    #[must_use]
    pub const fn with_recovery(mut self, recovery: RecoveryMode) -> Self {
        self.recovery = recovery;
        self
    }

    /// Limit the number of descriptors processed per run
    #[must_use]
    pub const fn with_descriptor_budget(mut self, budget: Option<usize>) -> Self {
        self.descriptor_budget = budget;
        self
    }

    /// Enable or disable reachability tracking
    #[must_use]
    pub const fn with_reachability(mut self, enabled: bool) -> Self {
        self.track_reachability = enabled;
        self
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ParseStatus {
    /// An exact derivation exists
    Accepted,
    /// Only derivations with edits exist; the root is the cheapest found
    Recovered,
    /// No derivation and recovery is off
    Rejected,
    /// Recovery ran out of work without an accepting derivation
    RecoveryExhausted,
    /// The descriptor budget ran out; the root is the best found so far
    BudgetExhausted,
}

impl ParseStatus {
    /// Whether the run produced a usable root
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Accepted | Self::Recovered)
    }
}

/// Counters of a parse session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseStats {
    /// Descriptors taken from the default pool
    pub default_descriptors: usize,
    /// Descriptors taken from the recovery pool
    pub recovery_descriptors: usize,
    /// Stack nodes created so far
    pub gss_nodes: usize,
    /// Live forest nodes
    pub sppf_nodes: usize,
}

/// Outcome of [`GllParser::parse`] or [`GllParser::parse_from`]
#[derive(Debug, Clone)]
pub struct ParseResult<V: crate::input::Vertex> {
    /// Symbol node of the cheapest accepted derivation
    pub root: Option<SppfNodeId>,
    /// Edit weight of `root`
    pub weight: Option<Weight>,
    /// How the run ended
    pub status: ParseStatus,
    /// Minimal accepted path length per start/final vertex pair
    pub reachability: Reachability<V>,
    /// Counters of the whole session
    pub stats: ParseStats,
}

impl<V: crate::input::Vertex> ParseResult<V> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// GLL parser over an owned input graph.
///
/// The parser keeps its session state between calls: [`parse`](Self::parse)
/// runs to completion once, and after editing the input via
/// [`input_mut`](Self::input_mut), [`parse_from`](Self::parse_from) resumes
/// from the edited vertex.
pub struct GllParser<G: InputGraph> {
    rsm: Arc<Rsm>,
    input: G,
    config: GllConfig,
    state: GllState<G::Vertex>,
}

impl<G: InputGraph> GllParser<G> {
    /// Create a parser with the default configuration
    #[must_use]
    pub fn new(rsm: impl Into<Arc<Rsm>>, input: G) -> Self {
        Self::with_config(rsm, input, GllConfig::default())
    }

    #[must_use]
    pub fn with_config(rsm: impl Into<Arc<Rsm>>, input: G, config: GllConfig) -> Self {
        Self {
            rsm: rsm.into(),
            input,
            config,
            state: GllState::new(),
        }
    }

    /// Parse the input from its start vertices
    pub fn parse(&mut self) -> ParseResult<G::Vertex> {
        let status = parser::parse(&self.rsm, &self.input, &self.config, &mut self.state);
        self.result(status)
    }

    /// Reparse after the edges leaving `vertex` changed.
    ///
    /// Forest nodes built on the old edges are evicted, the descriptors
    /// processed at `vertex` are queued again and the run continues. A
    /// vertex the parser never reached costs nothing.
    pub fn parse_from(&mut self, vertex: G::Vertex) -> ParseResult<G::Vertex> {
        let status = parser::parse_from(
            &self.rsm,
            &self.input,
            &self.config,
            &mut self.state,
            vertex,
        );
        self.result(status)
    }

    fn result(&self, status: ParseStatus) -> ParseResult<G::Vertex> {
        let root = self.state.result();
        ParseResult {
            root,
            weight: root.map(|root| self.state.sppf().weight(root)),
            status,
            reachability: self.state.reachability().clone(),
            stats: self.state.stats(),
        }
    }

    #[must_use]
    pub const fn input(&self) -> &G {
        &self.input
    }

    /// Mutable access to the input; follow edits with
    /// [`parse_from`](Self::parse_from) at every edited vertex
    pub fn input_mut(&mut self) -> &mut G {
        &mut self.input
    }

    #[must_use]
    pub const fn sppf(&self) -> &Sppf<G::Vertex> {
        self.state.sppf()
    }

    #[must_use]
    pub fn rsm(&self) -> &Rsm {
        &self.rsm
    }

    #[must_use]
    pub const fn config(&self) -> &GllConfig {
        &self.config
    }

    #[must_use]
    pub const fn state(&self) -> &GllState<G::Vertex> {
        &self.state
    }
}
