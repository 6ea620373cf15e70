//! Parse session state
//!
//! Every table the algorithm grows lives here, so independent parsers never
//! share anything and a finished parse can be resumed after an input edit.

use super::ParseStats;
use super::gss::Gss;
use super::worklist::Worklist;
use crate::input::Vertex;
use crate::sppf::{Sppf, SppfNodeId};
use hashbrown::HashMap;

/// Minimal number of input edges of an accepted derivation, per
/// `(start vertex, final vertex)` pair
pub type Reachability<V> = HashMap<(V, V), usize, ahash::RandomState>;

#[derive(Debug)]
pub struct GllState<V: Vertex> {
    pub(crate) worklist: Worklist<V>,
    pub(crate) gss: Gss<V>,
    pub(crate) sppf: Sppf<V>,
    /// Cheapest accepted derivation found so far
    pub(crate) result: Option<SppfNodeId>,
    pub(crate) reachability: Reachability<V>,
    pub(crate) stats: ParseStats,
}

impl<V: Vertex> GllState<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            worklist: Worklist::new(),
            gss: Gss::new(),
            sppf: Sppf::new(),
            result: None,
            reachability: HashMap::with_hasher(ahash::RandomState::new()),
            stats: ParseStats::default(),
        }
    }

    #[must_use]
    pub const fn sppf(&self) -> &Sppf<V> {
        &self.sppf
    }

    #[must_use]
    pub const fn gss(&self) -> &Gss<V> {
        &self.gss
    }

    #[must_use]
    pub const fn result(&self) -> Option<SppfNodeId> {
        self.result
    }

    #[must_use]
    pub const fn reachability(&self) -> &Reachability<V> {
        &self.reachability
    }

    /// Statistics with the table sizes filled in
    #[must_use]
    pub fn stats(&self) -> ParseStats {
        ParseStats {
            gss_nodes: self.gss.len(),
            sppf_nodes: self.sppf.live_count(),
            ..self.stats
        }
    }
}

impl<V: Vertex> Default for GllState<V> {
    fn default() -> Self {
        Self::new()
    }
}
