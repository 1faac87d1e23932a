//! Benchmark utilities for recommendation workloads.
//!
//! Provides reproducible synthetic interaction streams and an exhaustive
//! (non-pruned) similarity ranking to check candidate pruning against:
//!
//! - **Uniform**: every user/item equally likely, as in a plain stress test
//! - **Skewed**: a few head items attract most interactions, closer to real
//!   purchase logs
//! - **Ground truth**: Jaccard against every item in the catalog

pub mod datasets;

pub use datasets::{
    create_skewed_dataset, create_uniform_dataset, exhaustive_similar, InteractionDataset,
};
