//! Recommender configuration.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// How cached similarity scores relate to later writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CacheConsistency {
    /// Cached scores are served as-is even after the user sets of either item
    /// grow. Cheapest; scores can lag behind the graph.
    #[default]
    Relaxed,
    /// Each entry remembers the degree of both items when computed and is
    /// recomputed if either has changed since.
    Strict,
}

/// Similarity cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum cached pairs. `None` means unbounded; otherwise least recently
    /// used pairs are evicted.
    pub capacity: Option<usize>,
    pub consistency: CacheConsistency,
    /// Independently locked cache shards. Clamped to `capacity` when bounded.
    pub shards: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: Some(10_000),
            consistency: CacheConsistency::Relaxed,
            shards: 16,
        }
    }
}

impl CacheConfig {
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_consistency(mut self, consistency: CacheConsistency) -> Self {
        self.consistency = consistency;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == Some(0) {
            return Err(RecommendError::InvalidArgument(
                "cache capacity must be positive (use None for unbounded)".into(),
            ));
        }
        if self.shards == 0 {
            return Err(RecommendError::InvalidArgument(
                "cache shard count must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration for [`Recommender`](crate::recommend::Recommender).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommenderConfig {
    pub cache: CacheConfig,
    /// Reject queries for unknown users/items instead of falling back to
    /// popularity.
    pub strict: bool,
    /// Drop items the user already has from user recommendations, on both the
    /// similarity path and the popularity fallback.
    pub exclude_seen: bool,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            strict: false,
            exclude_seen: true,
        }
    }
}

impl RecommenderConfig {
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn exclude_seen(mut self, exclude: bool) -> Self {
        self.exclude_seen = exclude;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.cache.validate()
    }
}
