//! Jaccard similarity between items, memoized per unordered pair.
//!
//! J(A,B) = |A ∩ B| / |A ∪ B| over the two items' user sets, defined as 0
//! when both sets are empty. Adjacency lists are sorted, so the intersection
//! is a single linear merge.
//!
//! The cache key is `(min(a,b), max(a,b))`: `similarity(a, b)` and
//! `similarity(b, a)` share one entry and one computation.
//!
//! The cache is split into [`CacheConfig::shards`] independently locked LRU
//! shards, and a pair always maps to the same shard. A shard's lock is held
//! across lookup, compute and insert, so concurrent callers asking for the
//! same uncached pair compute it once, while pairs in other shards are scored
//! in parallel. The capacity is divided between shards, so eviction is LRU
//! within a shard; one shard gives exact global LRU.

use crate::config::{CacheConfig, CacheConsistency};
use crate::error::Result;
use crate::graph::InteractionGraph;
use crate::registry::ItemHandle;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

/// Exact Jaccard similarity of two ascending, deduplicated slices.
pub fn jaccard<T: Ord>(a: &[T], b: &[T]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }

    let (mut i, mut j, mut intersection) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
        }
    }

    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(ItemHandle, ItemHandle);

impl PairKey {
    fn new(a: ItemHandle, b: ItemHandle) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Fibonacci hash of the packed pair, reduced to `[0, shards)`.
    fn shard(&self, shards: usize) -> usize {
        let packed = (u64::from(self.0.0) << 32) | u64::from(self.1.0);
        let mixed = packed.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 32;
        (mixed % shards as u64) as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    score: f64,
    /// Degrees of the key's items at compute time.
    degrees: (usize, usize),
}

/// Cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    /// Jaccard computations performed.
    pub misses: u64,
    pub evictions: u64,
    pub len: usize,
    pub capacity: Option<usize>,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Shard {
    entries: LruCache<PairKey, Entry>,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl Shard {
    fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: match capacity {
                Some(cap) => LruCache::new(cap),
                None => LruCache::unbounded(),
            },
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }
}

/// Memoizing Jaccard scorer.
#[derive(Debug)]
pub struct SimilarityScorer {
    shards: Box<[Mutex<Shard>]>,
    config: CacheConfig,
}

impl SimilarityScorer {
    /// # Errors
    ///
    /// `InvalidArgument` for a zero capacity or zero shards.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;
        let shards: Box<[Mutex<Shard>]> = match config.capacity {
            // Every shard holds at least one entry and the total is `cap`.
            Some(cap) => {
                let count = config.shards.min(cap);
                (0..count)
                    .map(|i| {
                        let size = cap / count + usize::from(i < cap % count);
                        Mutex::new(Shard::new(NonZeroUsize::new(size)))
                    })
                    .collect()
            }
            None => (0..config.shards)
                .map(|_| Mutex::new(Shard::new(None)))
                .collect(),
        };
        Ok(Self { shards, config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Similarity of `a` and `b` in `[0, 1]`.
    pub fn similarity(&self, graph: &InteractionGraph, a: ItemHandle, b: ItemHandle) -> f64 {
        let key = PairKey::new(a, b);
        let degrees = (graph.item_degree(key.0), graph.item_degree(key.1));
        let mut state = self.shards[key.shard(self.shards.len())].lock();

        if let Some(entry) = state.entries.get(&key).copied() {
            let fresh = match self.config.consistency {
                CacheConsistency::Relaxed => true,
                CacheConsistency::Strict => entry.degrees == degrees,
            };
            if fresh {
                state.hits += 1;
                return entry.score;
            }
        }

        let score = jaccard(graph.users_for(key.0), graph.users_for(key.1));
        state.misses += 1;
        if let Some((evicted, _)) = state.entries.push(key, Entry { score, degrees }) {
            if evicted != key {
                state.evictions += 1;
                debug!(a = evicted.0.0, b = evicted.1.0, "evicted similarity entry");
            }
        }
        score
    }

    /// Counters summed over all shards.
    pub fn cache_stats(&self) -> CacheStats {
        self.shards.iter().fold(
            CacheStats {
                capacity: self.config.capacity,
                ..CacheStats::default()
            },
            |mut acc, shard| {
                let shard = shard.lock();
                acc.hits += shard.hits;
                acc.misses += shard.misses;
                acc.evictions += shard.evictions;
                acc.len += shard.entries.len();
                acc
            },
        )
    }

    /// Drop every cached score. Counters are kept.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().entries.clear();
        }
    }
}
