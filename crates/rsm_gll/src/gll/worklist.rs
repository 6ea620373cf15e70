//! Descriptors and their two-tier scheduler

use super::gss::GssNodeId;
use crate::input::Vertex;
use crate::rsm::RsmStateId;
use crate::sppf::{SppfNodeId, Weight};
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeMap;

/// One unit of parsing work: continue the automaton at `state`, inside the
/// call recorded by `gss`, with the partial derivation `sppf`, at input
/// `position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor<V> {
    pub state: RsmStateId,
    pub gss: GssNodeId,
    pub sppf: Option<SppfNodeId>,
    pub position: V,
}

impl<V> Descriptor<V> {
    #[must_use]
    pub const fn new(
        state: RsmStateId,
        gss: GssNodeId,
        sppf: Option<SppfNodeId>,
        position: V,
    ) -> Self {
        Self {
            state,
            gss,
            sppf,
            position,
        }
    }
}

/// Pool a descriptor was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Default,
    /// Recovery pool, with the weight the descriptor was queued at
    Recovery(Weight),
}

type HandledSet<V> = HashSet<Descriptor<V>, ahash::RandomState>;

/// Pending and handled descriptors.
///
/// Zero-weight descriptors go to the default pool. Anything more expensive
/// waits in the recovery pool, bucketed by weight and drained cheapest
/// first, and is only handed out once the default pool is empty.
#[derive(Debug)]
pub struct Worklist<V: Vertex> {
    default: Vec<Descriptor<V>>,
    recovery: BTreeMap<Weight, Vec<Descriptor<V>>>,
    handled: HashMap<V, HandledSet<V>, ahash::RandomState>,
}

impl<V: Vertex> Worklist<V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            default: Vec::new(),
            recovery: BTreeMap::new(),
            handled: HashMap::with_hasher(ahash::RandomState::new()),
        }
    }

    /// Queue `descriptor` unless it was already handled.
    ///
    /// Returns whether it was queued.
    pub fn add(&mut self, descriptor: Descriptor<V>, weight: Weight) -> bool {
        if self.is_handled(&descriptor) {
            return false;
        }
        if weight == 0 {
            self.default.push(descriptor);
        } else {
            self.recovery.entry(weight).or_default().push(descriptor);
        }
        true
    }

    /// Next unhandled zero-weight descriptor
    pub fn next_default(&mut self) -> Option<Descriptor<V>> {
        while let Some(descriptor) = self.default.pop() {
            if !self.is_handled(&descriptor) {
                return Some(descriptor);
            }
        }
        None
    }

    /// Next unhandled descriptor from the cheapest recovery bucket, with the
    /// bucket's weight
    pub fn next_recovery(&mut self) -> Option<(Descriptor<V>, Weight)> {
        while let Some(mut bucket) = self.recovery.first_entry() {
            let weight = *bucket.key();
            let Some(descriptor) = bucket.get_mut().pop() else {
                bucket.remove();
                continue;
            };
            if bucket.get().is_empty() {
                bucket.remove();
            }
            if !self.is_handled(&descriptor) {
                return Some((descriptor, weight));
            }
        }
        None
    }

    /// Next descriptor, default pool first
    pub fn next(&mut self) -> Option<(Descriptor<V>, Pool)> {
        if let Some(descriptor) = self.next_default() {
            return Some((descriptor, Pool::Default));
        }
        self.next_recovery()
            .map(|(descriptor, weight)| (descriptor, Pool::Recovery(weight)))
    }

    pub fn mark_handled(&mut self, descriptor: Descriptor<V>) {
        self.handled
            .entry(descriptor.position)
            .or_default()
            .insert(descriptor);
    }

    pub fn unmark_handled(&mut self, descriptor: &Descriptor<V>) -> bool {
        self.handled
            .get_mut(&descriptor.position)
            .is_some_and(|set| set.remove(descriptor))
    }

    #[must_use]
    pub fn is_handled(&self, descriptor: &Descriptor<V>) -> bool {
        self.handled
            .get(&descriptor.position)
            .is_some_and(|set| set.contains(descriptor))
    }

    /// Forget every descriptor handled at `position` and return them, so they
    /// can be queued again
    pub fn take_handled_at(&mut self, position: V) -> Vec<Descriptor<V>> {
        self.handled
            .remove(&position)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default()
    }

    /// Drop queued and handled descriptors for which `keep` is false
    pub fn retain(&mut self, mut keep: impl FnMut(&Descriptor<V>) -> bool) {
        self.default.retain(|descriptor| keep(descriptor));
        self.recovery.retain(|_, bucket| {
            bucket.retain(|descriptor| keep(descriptor));
            !bucket.is_empty()
        });
        self.handled.retain(|_, set| {
            set.retain(|descriptor| keep(descriptor));
            !set.is_empty()
        });
    }

    /// Weight of the cheapest queued descriptor that is not yet handled.
    ///
    /// Handled leftovers in front of it are dropped on the way.
    pub fn cheapest_pending(&mut self) -> Option<Weight> {
        let handled = &self.handled;
        let is_handled = |descriptor: &Descriptor<V>| {
            handled
                .get(&descriptor.position)
                .is_some_and(|set| set.contains(descriptor))
        };

        self.default.retain(|descriptor| !is_handled(descriptor));
        if !self.default.is_empty() {
            return Some(0);
        }
        while let Some(mut bucket) = self.recovery.first_entry() {
            bucket.get_mut().retain(|descriptor| !is_handled(descriptor));
            if bucket.get().is_empty() {
                bucket.remove();
            } else {
                return Some(*bucket.key());
            }
        }
        None
    }

    #[must_use]
    pub fn has_default(&self) -> bool {
        !self.default.is_empty()
    }

    /// Number of queued descriptors in both pools, stale ones included
    #[must_use]
    pub fn pending(&self) -> usize {
        self.default.len() + self.recovery.values().map(Vec::len).sum::<usize>()
    }
}

impl<V: Vertex> Default for Worklist<V> {
    fn default() -> Self {
        Self::new()
    }
}
