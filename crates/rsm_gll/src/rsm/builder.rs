//! Builder for [`Rsm`]

use super::{NonterminalId, Rsm, RsmState, RsmStateId, Terminal};
use crate::error::{GllError, GllResult};
use lasso::Rodeo;
use smallvec::SmallVec;

enum PendingEdge {
    Terminal(RsmStateId, Terminal, RsmStateId),
    Nonterminal(RsmStateId, NonterminalId, RsmStateId),
}

/// Incrementally assembles a recursive state machine.
///
/// States are created eagerly and identified by the returned [`RsmStateId`].
/// Edges are validated when [`build`](Self::build) is called.
///
/// # Examples
///
/// ```
/// use rsm_gll::rsm::RsmBuilder;
///
/// // S -> 'a'
/// let mut builder = RsmBuilder::new();
/// let s = builder.nonterminal("S");
/// let q0 = builder.start_state(s, false);
/// let q1 = builder.state(s, false, true);
/// builder.terminal_edge(q0, "a", q1);
///
/// let rsm = builder.build(s).unwrap();
/// assert_eq!(rsm.state(q0).error_recovery_labels().len(), 1);
/// ```
pub struct RsmBuilder {
    names: Rodeo,
    start_states: Vec<SmallVec<[RsmStateId; 1]>>,
    states: Vec<RsmState>,
    edges: Vec<PendingEdge>,
}

impl RsmBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: Rodeo::new(),
            start_states: Vec::new(),
            states: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Intern a nonterminal name, returning the existing id if already known
    pub fn nonterminal(&mut self, name: &str) -> NonterminalId {
        let id = NonterminalId::from_spur(self.names.get_or_intern(name));
        if id.index() >= self.start_states.len() {
            self.start_states.resize_with(id.index() + 1, SmallVec::new);
        }
        id
    }

    /// Add a state to `nonterminal`'s automaton
    pub fn state(&mut self, nonterminal: NonterminalId, is_start: bool, is_final: bool) -> RsmStateId {
        let id = RsmStateId::from_index(self.states.len());
        self.states
            .push(RsmState::new(id, nonterminal, is_start, is_final));
        if is_start {
            self.start_states[nonterminal.index()].push(id);
        }
        id
    }

    /// Add the start state of `nonterminal`'s automaton
    pub fn start_state(&mut self, nonterminal: NonterminalId, is_final: bool) -> RsmStateId {
        self.state(nonterminal, true, is_final)
    }

    /// Add an edge consuming `terminal`
    pub fn terminal_edge(
        &mut self,
        tail: RsmStateId,
        terminal: impl Into<Terminal>,
        head: RsmStateId,
    ) -> &mut Self {
        self.edges
            .push(PendingEdge::Terminal(tail, terminal.into(), head));
        self
    }

    /// Add an edge that calls `nonterminal` and continues at `head`
    pub fn nonterminal_edge(
        &mut self,
        tail: RsmStateId,
        nonterminal: NonterminalId,
        head: RsmStateId,
    ) -> &mut Self {
        self.edges
            .push(PendingEdge::Nonterminal(tail, nonterminal, head));
        self
    }

    /// Number of states created so far
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Validate and freeze the machine.
    ///
    /// # Errors
    ///
    /// Fails if an edge refers to a state of another builder, or if any known
    /// nonterminal does not have exactly one start state.
    pub fn build(mut self, start: NonterminalId) -> GllResult<Rsm> {
        let state_count = self.states.len();
        let check = |id: RsmStateId| {
            if id.index() < state_count {
                Ok(())
            } else {
                Err(GllError::unknown_state(id.index()))
            }
        };

        for edge in std::mem::take(&mut self.edges) {
            match edge {
                PendingEdge::Terminal(tail, terminal, head) => {
                    check(tail)?;
                    check(head)?;
                    self.states[tail.index()].add_terminal_edge(terminal, head);
                }
                PendingEdge::Nonterminal(tail, nonterminal, head) => {
                    check(tail)?;
                    check(head)?;
                    self.states[tail.index()].add_nonterminal_edge(nonterminal, head);
                }
            }
        }

        if start.index() >= self.start_states.len() {
            return Err(GllError::unknown_nonterminal(format!("#{}", start.index())));
        }

        let mut start_states = vec![RsmStateId::from_index(0); self.start_states.len()];
        for (spur, name) in self.names.iter() {
            let id = NonterminalId::from_spur(spur);
            match self.start_states[id.index()].as_slice() {
                [only] => start_states[id.index()] = *only,
                [] => return Err(GllError::missing_start_state(name)),
                _ => return Err(GllError::duplicate_start_state(name)),
            }
        }

        Ok(Rsm {
            names: self.names,
            start_states,
            states: self.states,
            start_nonterminal: start,
        })
    }
}

impl Default for RsmBuilder {
    fn default() -> Self {
        Self::new()
    }
}
