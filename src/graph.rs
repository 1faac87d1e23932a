//! Bipartite user↔item interaction graph.
//!
//! Two adjacency directions are kept in lockstep:
//!
//! ```text
//! items_of[user] : sorted items the user interacted with
//! users_of[item] : sorted users that interacted with the item   (inverted index)
//! ```
//!
//! Invariant: `u ∈ users_of[i] ⟺ i ∈ items_of[u]`. The graph is append-only,
//! so an item's degree only ever grows. Callers that need to detect change
//! (e.g. the strict similarity cache) can use the degree as a version.
//!
//! Most users touch a handful of items, so adjacency lists are `SmallVec`s
//! that stay inline until they outgrow a few entries.

use crate::popularity::PopularityIndex;
use crate::registry::{ItemHandle, UserHandle};
use smallvec::SmallVec;
use tracing::trace;

pub type ItemList = SmallVec<[ItemHandle; 4]>;
pub type UserList = SmallVec<[UserHandle; 4]>;

/// Summary counters for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Users with at least one interaction slot allocated.
    pub user_count: usize,
    /// Items with at least one interaction slot allocated.
    pub item_count: usize,
    /// Distinct (user, item) edges.
    pub interaction_count: usize,
    /// Raw insert calls, duplicates included.
    pub events: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionGraph {
    items_of: Vec<ItemList>,
    users_of: Vec<UserList>,
    popularity: PopularityIndex,
    interactions: usize,
    events: u64,
}

impl InteractionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `user` interacted with `item`.
    ///
    /// Returns `true` if the pair is new. Duplicates leave both adjacency
    /// lists and the popularity count untouched.
    pub fn insert(&mut self, user: UserHandle, item: ItemHandle) -> bool {
        self.events += 1;

        if user.index() >= self.items_of.len() {
            self.items_of.resize_with(user.index() + 1, ItemList::new);
        }
        if item.index() >= self.users_of.len() {
            self.users_of.resize_with(item.index() + 1, UserList::new);
        }

        let items = &mut self.items_of[user.index()];
        let Err(item_pos) = items.binary_search(&item) else {
            return false;
        };
        items.insert(item_pos, item);

        let users = &mut self.users_of[item.index()];
        match users.binary_search(&user) {
            Err(user_pos) => users.insert(user_pos, user),
            Ok(_) => debug_assert!(false, "adjacency out of sync for {user:?}/{item:?}"),
        }

        self.popularity.record(item);
        self.interactions += 1;
        trace!(user = user.0, item = item.0, "new interaction");
        true
    }

    /// Items `user` interacted with, ascending. Empty for unknown users.
    pub fn items_for(&self, user: UserHandle) -> &[ItemHandle] {
        self.items_of
            .get(user.index())
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Users that interacted with `item`, ascending. Empty for unseen items.
    pub fn users_for(&self, item: ItemHandle) -> &[UserHandle] {
        self.users_of
            .get(item.index())
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, user: UserHandle, item: ItemHandle) -> bool {
        self.items_for(user).binary_search(&item).is_ok()
    }

    /// Number of distinct users of `item`.
    pub fn item_degree(&self, item: ItemHandle) -> usize {
        self.users_for(item).len()
    }

    pub fn popularity(&self) -> &PopularityIndex {
        &self.popularity
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            user_count: self.items_of.len(),
            item_count: self.users_of.len(),
            interaction_count: self.interactions,
            events: self.events,
        }
    }
}
