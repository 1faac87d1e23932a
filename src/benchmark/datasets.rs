//! Synthetic interaction datasets for benchmarking.

use crate::graph::InteractionGraph;
use crate::registry::ItemHandle;
use crate::similarity::jaccard;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A stream of `(user, item)` interactions with external string ids.
#[derive(Debug, Clone)]
pub struct InteractionDataset {
    pub interactions: Vec<(String, String)>,
    /// Size of the user id space the generator drew from.
    pub num_users: usize,
    /// Size of the item id space the generator drew from.
    pub num_items: usize,
}

impl InteractionDataset {
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// External id of the `n`th user in the generator's id space.
    pub fn user_id(n: usize) -> String {
        format!("User{n}")
    }

    /// External id of the `n`th item in the generator's id space.
    pub fn item_id(n: usize) -> String {
        format!("Item{n}")
    }
}

/// Interactions with users and items drawn uniformly.
///
/// Duplicates are kept: a real event log repeats pairs, and ingest must
/// absorb them.
///
/// # Arguments
///
/// * `num_users` - Size of the user id space
/// * `num_items` - Size of the item id space
/// * `num_interactions` - Number of events to generate
/// * `seed` - Random seed for reproducibility
pub fn create_uniform_dataset(
    num_users: usize,
    num_items: usize,
    num_interactions: usize,
    seed: u64,
) -> InteractionDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let interactions = (0..num_interactions)
        .map(|_| {
            let u = rng.random_range(0..num_users.max(1));
            let i = rng.random_range(0..num_items.max(1));
            (InteractionDataset::user_id(u), InteractionDataset::item_id(i))
        })
        .collect();

    InteractionDataset {
        interactions,
        num_users,
        num_items,
    }
}

/// Interactions where item popularity follows a power law.
///
/// Item index is `floor(n * r^skew)` for uniform `r`, so `skew = 1.0` is
/// uniform and larger values concentrate mass on low indices.
pub fn create_skewed_dataset(
    num_users: usize,
    num_items: usize,
    num_interactions: usize,
    skew: f64,
    seed: u64,
) -> InteractionDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let n_items = num_items.max(1);
    let interactions = (0..num_interactions)
        .map(|_| {
            let u = rng.random_range(0..num_users.max(1));
            let r: f64 = rng.random();
            let i = ((n_items as f64) * r.powf(skew)) as usize;
            (
                InteractionDataset::user_id(u),
                InteractionDataset::item_id(i.min(n_items - 1)),
            )
        })
        .collect();

    InteractionDataset {
        interactions,
        num_users,
        num_items,
    }
}

/// Rank every item in `0..num_items` by Jaccard against `target`.
///
/// No pruning and no cache: this is the reference the inverted-index path
/// must agree with. Zero scores and the target itself are dropped; order is
/// score descending, then handle ascending.
pub fn exhaustive_similar(
    graph: &InteractionGraph,
    target: ItemHandle,
    num_items: usize,
    k: usize,
) -> Vec<(ItemHandle, f64)> {
    let target_users = graph.users_for(target);
    let mut scored: Vec<(ItemHandle, f64)> = (0..num_items as u32)
        .map(ItemHandle)
        .filter(|&item| item != target)
        .map(|item| (item, jaccard(target_users, graph.users_for(item))))
        .filter(|&(_, score)| score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(k);
    scored
}
