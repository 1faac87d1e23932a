//! Recommendation orchestration and the external string-keyed contract.
//!
//! # Ranking
//!
//! - **Item target**: candidates from the inverted index, each scored by
//!   Jaccard against the target.
//! - **User target**: every item the user has contributes its candidates;
//!   a candidate's score is the sum of its similarities to the user's items.
//!   With `exclude_seen` (the default) items the user already has never
//!   appear, whether scored or from the fallback.
//!
//! Both sort by score descending, then ascending item handle, then truncate
//! to `k`. When no candidate exists (unknown target, isolated item, user with
//! no history) the popularity ranking is returned instead. That fallback is
//! the only reason a result can be short, and it is empty only when the
//! catalog is.
//!
//! # Concurrency
//!
//! Writes take `&mut self` and reads take `&self`, so one writer excludes all
//! readers at compile time. [`SharedRecommender`] moves the same discipline
//! behind a read-write lock for callers that ingest and query from
//! different threads.

use crate::candidates::{CandidateFinder, Candidates};
use crate::config::RecommenderConfig;
use crate::error::{RecommendError, Result};
use crate::graph::InteractionGraph;
use crate::registry::{IdentifierRegistry, ItemHandle, UserHandle};
use crate::similarity::{CacheStats, SimilarityScorer};
use parking_lot::{RwLock, RwLockReadGuard};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Where a recommended item's score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Jaccard score (summed over the user's items for user targets).
    Similarity,
    /// Interaction count from the cold-start fallback.
    Popularity,
}

/// A ranked item handle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub item: ItemHandle,
    pub score: f64,
    pub source: Source,
}

/// A ranked item translated back to its external identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item: String,
    pub score: f64,
    pub source: Source,
}

/// Snapshot of recommender size and cache behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecommenderStats {
    pub user_count: usize,
    pub item_count: usize,
    /// Distinct (user, item) pairs.
    pub interaction_count: usize,
    /// Ingest calls, duplicates included.
    pub events: u64,
    pub cache: CacheStats,
}

/// Owns the registry, interaction graph and similarity cache of one dataset.
#[derive(Debug)]
pub struct Recommender {
    registry: IdentifierRegistry,
    graph: InteractionGraph,
    scorer: SimilarityScorer,
    config: RecommenderConfig,
}

impl Recommender {
    /// # Errors
    ///
    /// `InvalidArgument` if the configuration does not validate.
    pub fn new(config: RecommenderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: IdentifierRegistry::new(),
            graph: InteractionGraph::new(),
            scorer: SimilarityScorer::new(config.cache)?,
            config,
        })
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn registry(&self) -> &IdentifierRegistry {
        &self.registry
    }

    pub fn graph(&self) -> &InteractionGraph {
        &self.graph
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    /// Record that `user` interacted with `item`.
    ///
    /// Never fails. Returns `true` if the pair had not been seen before.
    pub fn ingest(&mut self, user: &str, item: &str) -> bool {
        let user = self.registry.resolve_user(user);
        let item = self.registry.resolve_item(item);
        self.graph.insert(user, item)
    }

    /// Ingest many interactions; returns how many were new.
    pub fn ingest_batch<I, U, T>(&mut self, interactions: I) -> usize
    where
        I: IntoIterator<Item = (U, T)>,
        U: AsRef<str>,
        T: AsRef<str>,
    {
        let mut added = 0;
        for (user, item) in interactions {
            if self.ingest(user.as_ref(), item.as_ref()) {
                added += 1;
            }
        }
        debug!(added, total = self.graph.interaction_count(), "ingested batch");
        added
    }

    /// Top-`k` items for an external user id.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `k == 0`
    /// - `UnknownUser` if the user was never ingested and strict mode is on
    pub fn recommend(&self, user: &str, k: usize) -> Result<Vec<Recommendation>> {
        check_k(k)?;
        let ranked = match self.registry.lookup_user(user) {
            Some(handle) => self.recommend_for_user(handle, k)?,
            None if self.config.strict => {
                return Err(RecommendError::UnknownUser(user.to_string()))
            }
            None => {
                debug!(user, "unknown user, using popularity");
                self.popularity_fallback(k, &HashSet::new())
            }
        };
        self.externalize(ranked)
    }

    /// Top-`k` items similar to an external item id.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `k == 0`
    /// - `UnknownItem` if the item was never ingested and strict mode is on
    pub fn recommend_similar(&self, item: &str, k: usize) -> Result<Vec<Recommendation>> {
        check_k(k)?;
        let ranked = match self.registry.lookup_item(item) {
            Some(handle) => self.recommend_for_item(handle, k)?,
            None if self.config.strict => {
                return Err(RecommendError::UnknownItem(item.to_string()))
            }
            None => {
                debug!(item, "unknown item, using popularity");
                self.popularity_fallback(k, &HashSet::new())
            }
        };
        self.externalize(ranked)
    }

    /// Items most similar to `target`, falling back to popularity when it has
    /// no candidates.
    pub fn recommend_for_item(&self, target: ItemHandle, k: usize) -> Result<Vec<Scored>> {
        check_k(k)?;
        match CandidateFinder::new(&self.graph).candidates_for(target) {
            Candidates::Found(candidates) => {
                let scores = candidates
                    .into_iter()
                    .map(|c| (c, self.scorer.similarity(&self.graph, target, c)));
                Ok(rank(scores, k))
            }
            Candidates::Empty => {
                debug!(item = target.0, "no candidates, using popularity");
                // The target is excluded so it never recommends itself.
                let excluded: HashSet<_> = [target].into_iter().collect();
                Ok(self.popularity_fallback(k, &excluded))
            }
        }
    }

    /// Items for `user`, scored by summed similarity to what they already
    /// have. With `exclude_seen`, owned items are excluded before truncation.
    pub fn recommend_for_user(&self, user: UserHandle, k: usize) -> Result<Vec<Scored>> {
        check_k(k)?;
        let owned = self.graph.items_for(user);
        let excluded: HashSet<ItemHandle> = if self.config.exclude_seen {
            owned.iter().copied().collect()
        } else {
            HashSet::new()
        };
        let finder = CandidateFinder::new(&self.graph);

        // Only (owned, candidate) pairs sharing a user can score above zero,
        // so summing over each owned item's candidates loses nothing.
        let mut scores: HashMap<ItemHandle, f64> = HashMap::new();
        for &mine in owned {
            if let Candidates::Found(candidates) = finder.candidates_for(mine) {
                for c in candidates {
                    if excluded.contains(&c) {
                        continue;
                    }
                    let sim = self.scorer.similarity(&self.graph, mine, c);
                    *scores.entry(c).or_insert(0.0) += sim;
                }
            }
        }

        if scores.is_empty() {
            debug!(
                user = user.0,
                owned = owned.len(),
                "no candidates, using popularity"
            );
            return Ok(self.popularity_fallback(k, &excluded));
        }
        Ok(rank(scores, k))
    }

    fn popularity_fallback(&self, k: usize, excluded: &HashSet<ItemHandle>) -> Vec<Scored> {
        let popularity = self.graph.popularity();
        let top = if excluded.is_empty() {
            popularity.top_k(k)
        } else {
            popularity.top_k_excluding(k, excluded)
        };
        top.into_iter()
            .map(|(item, count)| Scored {
                item,
                score: f64::from(count),
                source: Source::Popularity,
            })
            .collect()
    }

    fn externalize(&self, ranked: Vec<Scored>) -> Result<Vec<Recommendation>> {
        ranked
            .into_iter()
            .map(|s| {
                Ok(Recommendation {
                    item: self.registry.item_external(s.item)?.to_string(),
                    score: s.score,
                    source: s.source,
                })
            })
            .collect()
    }

    pub fn stats(&self) -> RecommenderStats {
        let graph = self.graph.stats();
        RecommenderStats {
            user_count: self.registry.user_count(),
            item_count: self.registry.item_count(),
            interaction_count: graph.interaction_count,
            events: graph.events,
            cache: self.scorer.cache_stats(),
        }
    }
}

fn check_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(RecommendError::InvalidArgument("k must be positive".into()));
    }
    Ok(())
}

/// Sort by score descending, then handle ascending, and keep `k`.
fn rank(scores: impl IntoIterator<Item = (ItemHandle, f64)>, k: usize) -> Vec<Scored> {
    let mut ranked: Vec<Scored> = scores
        .into_iter()
        .map(|(item, score)| Scored {
            item,
            score,
            source: Source::Similarity,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item)));
    ranked.truncate(k);
    ranked
}

/// A [`Recommender`] behind a read-write lock.
///
/// Ingest takes the write lock, so a graph insert and its popularity update
/// are observed together. Queries share the read lock.
#[derive(Debug, Clone)]
pub struct SharedRecommender {
    inner: Arc<RwLock<Recommender>>,
}

impl SharedRecommender {
    pub fn new(recommender: Recommender) -> Self {
        Self {
            inner: Arc::new(RwLock::new(recommender)),
        }
    }

    pub fn ingest(&self, user: &str, item: &str) -> bool {
        self.inner.write().ingest(user, item)
    }

    pub fn ingest_batch<I, U, T>(&self, interactions: I) -> usize
    where
        I: IntoIterator<Item = (U, T)>,
        U: AsRef<str>,
        T: AsRef<str>,
    {
        self.inner.write().ingest_batch(interactions)
    }

    pub fn recommend(&self, user: &str, k: usize) -> Result<Vec<Recommendation>> {
        self.inner.read().recommend(user, k)
    }

    pub fn recommend_similar(&self, item: &str, k: usize) -> Result<Vec<Recommendation>> {
        self.inner.read().recommend_similar(item, k)
    }

    pub fn stats(&self) -> RecommenderStats {
        self.inner.read().stats()
    }

    /// Hold the read lock for several queries against one graph state.
    pub fn read(&self) -> RwLockReadGuard<'_, Recommender> {
        self.inner.read()
    }
}
