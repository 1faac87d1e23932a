//! Per-item interaction counts used as the cold-start fallback.
//!
//! The owning [`InteractionGraph`](crate::graph::InteractionGraph) calls
//! [`PopularityIndex::record`] once per *new* (user, item) pair, never for a
//! duplicate. A count therefore always equals the number of distinct users
//! that interacted with the item.

use crate::registry::ItemHandle;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

/// Heap entry ordered so that "better" ranks higher: larger count first,
/// then smaller handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ranked {
    count: u32,
    item: ItemHandle,
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.item.cmp(&self.item))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PopularityIndex {
    counts: Vec<u32>,
    items: usize,
}

impl PopularityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the count of `item`.
    pub fn record(&mut self, item: ItemHandle) {
        let idx = item.index();
        if idx >= self.counts.len() {
            self.counts.resize(idx + 1, 0);
        }
        if self.counts[idx] == 0 {
            self.items += 1;
        }
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn count(&self, item: ItemHandle) -> u32 {
        self.counts.get(item.index()).copied().unwrap_or(0)
    }

    /// Number of items with a non-zero count.
    pub fn len(&self) -> usize {
        self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items == 0
    }

    /// The `k` most popular items, ties broken by ascending handle.
    pub fn top_k(&self, k: usize) -> Vec<(ItemHandle, u32)> {
        self.top_k_filtered(k, |_| true)
    }

    /// Like [`top_k`](Self::top_k), skipping `excluded` before truncation.
    pub fn top_k_excluding(
        &self,
        k: usize,
        excluded: &HashSet<ItemHandle>,
    ) -> Vec<(ItemHandle, u32)> {
        self.top_k_filtered(k, |item| !excluded.contains(&item))
    }

    fn top_k_filtered(
        &self,
        k: usize,
        keep: impl Fn(ItemHandle) -> bool,
    ) -> Vec<(ItemHandle, u32)> {
        if k == 0 || self.items == 0 {
            return Vec::new();
        }

        // Min-heap of the best k seen so far; the root is the weakest survivor.
        let mut heap: BinaryHeap<Reverse<Ranked>> =
            BinaryHeap::with_capacity(k.min(self.items) + 1);
        for (idx, &count) in self.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let item = ItemHandle(idx as u32);
            if !keep(item) {
                continue;
            }
            let entry = Ranked { count, item };
            if heap.len() < k {
                heap.push(Reverse(entry));
            } else if let Some(Reverse(weakest)) = heap.peek() {
                if entry > *weakest {
                    heap.pop();
                    heap.push(Reverse(entry));
                }
            }
        }

        // Ascending order of Reverse<_> is descending rank.
        heap.into_sorted_vec()
            .into_iter()
            .map(|Reverse(r)| (r.item, r.count))
            .collect()
    }
}
