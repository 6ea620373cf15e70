//! # Recursive State Machines
//!
//! A recursive state machine (RSM) is a network of automata, one per
//! nonterminal. Edges are labeled either with a terminal or with a reference
//! to another nonterminal's automaton ("call that automaton here").
//!
//! ## Overview
//!
//! - [`Rsm`]: the immutable machine consumed by the parser
//! - [`RsmBuilder`]: creates states and edges, derives error recovery labels
//! - [`read_rsm`] / [`write_rsm`]: the line-oriented persisted text format
//!
//! ## Example
//!
//! ```rust
//! use rsm_gll::rsm::RsmBuilder;
//!
//! // S -> 'a' S | eps
//! let mut builder = RsmBuilder::new();
//! let s = builder.nonterminal("S");
//! let q0 = builder.start_state(s, true);
//! builder.terminal_edge(q0, "a", q0);
//! let rsm = builder.build(s).expect("valid RSM");
//!
//! assert_eq!(rsm.state_count(), 1);
//! assert!(rsm.state(rsm.start_state()).is_final());
//! ```

mod builder;
mod text;

pub use builder::RsmBuilder;
pub use text::{
    read_rsm, read_rsm_from_path, read_rsm_from_str, write_rsm, write_rsm_to_path,
    write_rsm_to_string,
};

use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Key, Rodeo, Spur};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Destination states of an RSM edge.
pub type TargetStates = SmallVec<[RsmStateId; 2]>;

/// A terminal symbol, shared by RSM edges and input graph labels.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Terminal(CompactString);

impl Terminal {
    /// Create a terminal from its text
    #[must_use]
    pub fn new(text: impl Into<CompactString>) -> Self {
        Self(text.into())
    }

    /// Text of the terminal
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Terminal({:?})", self.0.as_str())
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Terminal {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Terminal {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<char> for Terminal {
    fn from(c: char) -> Self {
        let mut buf = [0u8; 4];
        Self::new(&*c.encode_utf8(&mut buf))
    }
}

/// Interned nonterminal name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonterminalId(Spur);

impl NonterminalId {
    pub(crate) const fn from_spur(spur: Spur) -> Self {
        Self(spur)
    }

    /// Dense index of this nonterminal, in interning order
    #[must_use]
    pub fn index(self) -> usize {
        self.0.into_usize()
    }
}

impl fmt::Debug for NonterminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NonterminalId({})", self.index())
    }
}

/// Index of a state inside its [`Rsm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RsmStateId(u32);

impl RsmStateId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("RSM state count exceeds u32::MAX"))
    }

    /// Dense index of this state
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One state of a nonterminal's automaton.
#[derive(Debug, Clone)]
pub struct RsmState {
    id: RsmStateId,
    nonterminal: NonterminalId,
    is_start: bool,
    is_final: bool,
    terminal_edges: HashMap<Terminal, TargetStates, ahash::RandomState>,
    nonterminal_edges: HashMap<NonterminalId, TargetStates, ahash::RandomState>,
    /// Edges in insertion order, so the text format can reproduce the
    /// recovery labels exactly.
    terminal_edge_list: Vec<(Terminal, RsmStateId)>,
    nonterminal_edge_list: Vec<(NonterminalId, RsmStateId)>,
    error_recovery_labels: Vec<Terminal>,
}

impl RsmState {
    fn new(id: RsmStateId, nonterminal: NonterminalId, is_start: bool, is_final: bool) -> Self {
        Self {
            id,
            nonterminal,
            is_start,
            is_final,
            terminal_edges: HashMap::with_hasher(ahash::RandomState::new()),
            nonterminal_edges: HashMap::with_hasher(ahash::RandomState::new()),
            terminal_edge_list: Vec::new(),
            nonterminal_edge_list: Vec::new(),
            error_recovery_labels: Vec::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> RsmStateId {
        self.id
    }

    /// Nonterminal whose automaton owns this state
    #[must_use]
    pub const fn nonterminal(&self) -> NonterminalId {
        self.nonterminal
    }

    #[must_use]
    pub const fn is_start(&self) -> bool {
        self.is_start
    }

    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.is_final
    }

    /// Outgoing terminal edges: terminal -> destination states
    #[must_use]
    pub const fn terminal_edges(
        &self,
    ) -> &HashMap<Terminal, TargetStates, ahash::RandomState> {
        &self.terminal_edges
    }

    /// Outgoing nonterminal (call) edges: nonterminal -> return states
    #[must_use]
    pub const fn nonterminal_edges(
        &self,
    ) -> &HashMap<NonterminalId, TargetStates, ahash::RandomState> {
        &self.nonterminal_edges
    }

    /// Destination states reachable over `terminal`, empty if there is no such edge
    #[must_use]
    pub fn targets_on(&self, terminal: &Terminal) -> &[RsmStateId] {
        self.terminal_edges
            .get(terminal)
            .map_or(&[][..], |targets| targets.as_slice())
    }

    /// Terminal edges in the order they were added
    #[must_use]
    pub fn terminal_edge_list(&self) -> &[(Terminal, RsmStateId)] {
        &self.terminal_edge_list
    }

    /// Nonterminal edges in the order they were added
    #[must_use]
    pub fn nonterminal_edge_list(&self) -> &[(NonterminalId, RsmStateId)] {
        &self.nonterminal_edge_list
    }

    /// Representative terminals offered during error recovery.
    ///
    /// A terminal is a label iff its edge was the first one added towards
    /// some destination state.
    #[must_use]
    pub fn error_recovery_labels(&self) -> &[Terminal] {
        &self.error_recovery_labels
    }

    fn add_terminal_edge(&mut self, terminal: Terminal, head: RsmStateId) {
        let first_to_head = !self.terminal_edge_list.iter().any(|(_, h)| *h == head);
        let targets = self.terminal_edges.entry(terminal.clone()).or_default();
        if targets.contains(&head) {
            return;
        }
        targets.push(head);
        if first_to_head && !self.error_recovery_labels.contains(&terminal) {
            self.error_recovery_labels.push(terminal.clone());
        }
        self.terminal_edge_list.push((terminal, head));
    }

    fn add_nonterminal_edge(&mut self, nonterminal: NonterminalId, head: RsmStateId) {
        let targets = self.nonterminal_edges.entry(nonterminal).or_default();
        if targets.contains(&head) {
            return;
        }
        targets.push(head);
        self.nonterminal_edge_list.push((nonterminal, head));
    }
}

/// An immutable recursive state machine.
#[derive(Debug)]
pub struct Rsm {
    names: Rodeo,
    /// Start state per nonterminal, indexed by [`NonterminalId::index`]
    start_states: Vec<RsmStateId>,
    states: Vec<RsmState>,
    start_nonterminal: NonterminalId,
}

impl Rsm {
    /// Start building a new machine
    #[must_use]
    pub fn builder() -> RsmBuilder {
        RsmBuilder::new()
    }

    /// Get a state by id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued for this machine.
    #[must_use]
    pub fn state(&self, id: RsmStateId) -> &RsmState {
        &self.states[id.index()]
    }

    #[must_use]
    pub fn get_state(&self, id: RsmStateId) -> Option<&RsmState> {
        self.states.get(id.index())
    }

    pub fn states(&self) -> impl Iterator<Item = &RsmState> {
        self.states.iter()
    }

    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The nonterminal a complete parse must derive
    #[must_use]
    pub const fn start_nonterminal(&self) -> NonterminalId {
        self.start_nonterminal
    }

    /// Start state of the start nonterminal
    #[must_use]
    pub fn start_state(&self) -> RsmStateId {
        self.start_state_of(self.start_nonterminal)
    }

    /// Start state of any nonterminal of this machine
    #[must_use]
    pub fn start_state_of(&self, nonterminal: NonterminalId) -> RsmStateId {
        self.start_states[nonterminal.index()]
    }

    #[must_use]
    pub fn nonterminal_name(&self, nonterminal: NonterminalId) -> &str {
        self.names.resolve(&nonterminal.0)
    }

    /// Look a nonterminal up by name
    #[must_use]
    pub fn nonterminal(&self, name: &str) -> Option<NonterminalId> {
        self.names.get(name).map(NonterminalId::from_spur)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = NonterminalId> + '_ {
        self.names.iter().map(|(spur, _)| NonterminalId::from_spur(spur))
    }
}
