//! affinity: item-to-item recommendation over sparse binary interactions.
//!
//! Given a log of "user touched item" events, recommends items by Jaccard
//! similarity of their user sets, without comparing against the whole
//! catalog.
//!
//! - `registry`: external string ids ↔ dense `u32` handles (one space per kind)
//! - `graph`: user→items and item→users adjacency (the inverted index)
//! - `candidates`: two-hop candidate generation with exact pruning
//! - `similarity`: memoized Jaccard with an optional LRU bound
//! - `popularity`: interaction counts for the cold-start fallback
//! - `recommend`: ranking, fallback, and the string-keyed external API
//!
//! # Example
//!
//! ```rust
//! use affinity::{Recommender, RecommenderConfig};
//!
//! # fn main() -> affinity::Result<()> {
//! let mut rec = Recommender::new(RecommenderConfig::default())?;
//! rec.ingest("alice", "tea");
//! rec.ingest("alice", "biscuits");
//! rec.ingest("bob", "tea");
//! rec.ingest("bob", "honey");
//!
//! let recs = rec.recommend("alice", 3)?;
//! assert_eq!(recs[0].item, "honey");
//! # Ok(())
//! # }
//! ```
//!
//! # Critical Nuances
//!
//! ## Pruning is exact
//!
//! An item that shares no user with the target has Jaccard 0, so skipping it
//! cannot change the ranking. Cost scales with the target's two-hop
//! neighbourhood. Hub users (who touched a large share of the catalog) widen
//! that neighbourhood for every item they touched.
//!
//! ## Cache staleness
//!
//! With the default [`CacheConsistency::Relaxed`], a cached pair keeps its
//! score after either item gains users. Use [`CacheConsistency::Strict`] when
//! ingest and queries interleave and scores must track the graph.
//!
//! ## Popularity counts distinct users
//!
//! Re-ingesting a pair does not raise the item's popularity, so the fallback
//! ranking is the number of distinct users per item.

pub mod candidates;
pub mod config;
pub mod graph;
pub mod popularity;
pub mod recommend;
pub mod registry;
pub mod similarity;

pub mod benchmark;
pub mod error;

// Re-exports
pub use candidates::{CandidateFinder, Candidates};
pub use config::{CacheConfig, CacheConsistency, RecommenderConfig};
pub use error::{RecommendError, Result};
pub use graph::{GraphStats, InteractionGraph};
pub use popularity::PopularityIndex;
pub use recommend::{
    Recommendation, Recommender, RecommenderStats, Scored, SharedRecommender, Source,
};
pub use registry::{EntityKind, IdentifierRegistry, ItemHandle, UserHandle};
pub use similarity::{jaccard, CacheStats, SimilarityScorer};
