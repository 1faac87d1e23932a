//! Candidate generation through the inverted index.
//!
//! Two items whose user sets are disjoint have Jaccard similarity exactly 0,
//! so only items reachable via a shared user can score above zero:
//!
//! ```text
//! target ──users_of──▶ {u1, u2, …} ──items_of──▶ candidates
//! ```
//!
//! This is exact pruning, not an approximation. Work is proportional to the
//! two-hop neighbourhood of the target, never to catalog size.

use crate::graph::InteractionGraph;
use crate::registry::ItemHandle;
use std::collections::HashSet;

/// Outcome of candidate generation.
///
/// `Empty` is the cold-start signal: the caller must fall back to another
/// ranking source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates {
    /// Non-empty candidate items, ascending by handle.
    Found(Vec<ItemHandle>),
    Empty,
}

impl Candidates {
    fn from_set(set: HashSet<ItemHandle>) -> Self {
        if set.is_empty() {
            return Candidates::Empty;
        }
        let mut items: Vec<ItemHandle> = set.into_iter().collect();
        items.sort_unstable();
        Candidates::Found(items)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Candidates::Empty)
    }

    pub fn len(&self) -> usize {
        match self {
            Candidates::Found(items) => items.len(),
            Candidates::Empty => 0,
        }
    }

    /// Candidate items as a slice; empty for `Empty`.
    pub fn as_slice(&self) -> &[ItemHandle] {
        match self {
            Candidates::Found(items) => items.as_slice(),
            Candidates::Empty => &[],
        }
    }
}

/// Finds items that share at least one user with a target.
#[derive(Debug, Clone, Copy)]
pub struct CandidateFinder<'g> {
    graph: &'g InteractionGraph,
}

impl<'g> CandidateFinder<'g> {
    pub fn new(graph: &'g InteractionGraph) -> Self {
        Self { graph }
    }

    /// Items co-interacted with `target`, excluding `target` itself.
    pub fn candidates_for(&self, target: ItemHandle) -> Candidates {
        let mut set = HashSet::new();
        for &user in self.graph.users_for(target) {
            set.extend(self.graph.items_for(user).iter().copied());
        }
        set.remove(&target);
        Candidates::from_set(set)
    }
}
