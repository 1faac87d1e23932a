//! End-to-end tests: ingest a log, query through the external API.

use affinity::benchmark::{create_skewed_dataset, create_uniform_dataset, exhaustive_similar};
use affinity::{
    CacheConfig, CacheConsistency, Recommender, RecommenderConfig, SharedRecommender, Source,
};
use std::sync::{Arc, Barrier};
use std::thread;

fn scenario() -> Recommender {
    let mut rec = Recommender::new(RecommenderConfig::default()).expect("Failed to create");
    rec.ingest("u1", "i1");
    rec.ingest("u1", "i2");
    rec.ingest("u2", "i1");
    rec.ingest("u2", "i3");
    rec
}

#[test]
fn worked_example() {
    let rec = scenario();

    let similar = rec.recommend_similar("i1", 5).unwrap();
    let ids: Vec<&str> = similar.iter().map(|r| r.item.as_str()).collect();
    assert_eq!(ids, vec!["i2", "i3"]);
    assert!(similar.iter().all(|r| r.score == 0.5));

    // Tie at 0.5 resolves to the smaller handle.
    let top = rec.recommend_similar("i1", 1).unwrap();
    assert_eq!(top[0].item, "i2");
}

#[test]
fn cold_item_falls_back() {
    let rec = scenario();
    let recs = rec.recommend_similar("i5", 3).unwrap();
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].item, "i1");
    assert!(recs.iter().all(|r| r.source == Source::Popularity));
}

#[test]
fn repeated_queries_hit_cache() {
    let rec = scenario();
    rec.recommend("u1", 3).unwrap();
    let first = rec.stats().cache;
    rec.recommend("u1", 3).unwrap();
    let second = rec.stats().cache;

    assert_eq!(second.misses, first.misses, "second query recomputed a pair");
    assert!(second.hits > first.hits);
}

#[test]
fn strict_consistency_tracks_new_interactions() {
    let config = RecommenderConfig::default()
        .with_cache(CacheConfig::unbounded().with_consistency(CacheConsistency::Strict));
    let mut rec = Recommender::new(config).unwrap();
    rec.ingest("u1", "a");
    rec.ingest("u1", "b");
    rec.ingest("u2", "a");
    assert_eq!(rec.recommend_similar("a", 1).unwrap()[0].score, 0.5);

    rec.ingest("u2", "b");
    assert_eq!(rec.recommend_similar("a", 1).unwrap()[0].score, 1.0);
}

#[test]
fn relaxed_consistency_keeps_cached_score() {
    let mut rec = Recommender::new(RecommenderConfig::default()).unwrap();
    rec.ingest("u1", "a");
    rec.ingest("u1", "b");
    rec.ingest("u2", "a");
    assert_eq!(rec.recommend_similar("a", 1).unwrap()[0].score, 0.5);

    rec.ingest("u2", "b");
    assert_eq!(rec.recommend_similar("a", 1).unwrap()[0].score, 0.5);
}

#[test]
fn synthetic_uniform_matches_exhaustive() {
    let dataset = create_uniform_dataset(300, 60, 2_000, 42);
    let mut rec = Recommender::new(RecommenderConfig::default()).unwrap();
    rec.ingest_batch(dataset.interactions.iter().map(|(u, i)| (u, i)));

    let n_items = rec.registry().item_count();
    for n in [0usize, 7, 31] {
        let name = affinity::benchmark::InteractionDataset::item_id(n);
        let Some(target) = rec.registry().lookup_item(&name) else {
            continue;
        };
        let expected = exhaustive_similar(rec.graph(), target, n_items, 10);
        let got: Vec<_> = rec
            .recommend_for_item(target, 10)
            .unwrap()
            .into_iter()
            .map(|s| (s.item, s.score))
            .collect();
        assert_eq!(got, expected, "mismatch for {name}");
    }
}

#[test]
fn synthetic_skewed_stats_and_bounded_cache() {
    let dataset = create_skewed_dataset(500, 200, 5_000, 2.0, 7);
    let config = RecommenderConfig::default().with_cache(CacheConfig::default().with_capacity(64));
    let mut rec = Recommender::new(config).unwrap();
    rec.ingest_batch(dataset.interactions.iter().map(|(u, i)| (u, i)));

    let stats = rec.stats();
    assert_eq!(stats.events, 5_000);
    assert!(stats.interaction_count <= 5_000);
    assert!(stats.user_count <= 500);
    assert!(stats.item_count <= 200);

    for u in 0..50 {
        let user = affinity::benchmark::InteractionDataset::user_id(u);
        let recs = rec.recommend(&user, 5).unwrap();
        assert!(!recs.is_empty());
    }
    assert!(rec.stats().cache.len <= 64);
}

#[test]
fn concurrent_readers_agree() {
    let dataset = create_uniform_dataset(200, 40, 1_500, 3);
    let shared = SharedRecommender::new(Recommender::new(RecommenderConfig::default()).unwrap());
    shared.ingest_batch(dataset.interactions.iter().map(|(u, i)| (u, i)));

    let expected: Vec<_> = (0..20)
        .map(|u| shared.recommend(&format!("User{u}"), 5).unwrap())
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            thread::spawn(move || {
                (0..20)
                    .map(|u| shared.recommend(&format!("User{u}"), 5).unwrap())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

#[test]
fn concurrent_callers_compute_shared_pair_once() {
    let dataset = create_uniform_dataset(200, 40, 1_500, 11);
    let shared = SharedRecommender::new(Recommender::new(RecommenderConfig::default()).unwrap());
    shared.ingest_batch(dataset.interactions.iter().map(|(u, i)| (u, i)));

    let (a, b) = {
        let rec = shared.read();
        let a = rec.registry().lookup_item("Item0").unwrap();
        let b = rec.registry().lookup_item("Item1").unwrap();
        (a, b)
    };
    let threads = 16;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let (shared, barrier) = (shared.clone(), barrier.clone());
            thread::spawn(move || {
                let rec = shared.read();
                barrier.wait();
                let (x, y) = if t % 2 == 0 { (a, b) } else { (b, a) };
                rec.scorer().similarity(rec.graph(), x, y)
            })
        })
        .collect();

    let scores: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] == w[1]));

    let cache = shared.stats().cache;
    assert_eq!(cache.misses, 1);
    assert_eq!(cache.hits, threads as u64 - 1);
}

#[test]
fn concurrent_ingest_and_query() {
    let shared = SharedRecommender::new(Recommender::new(RecommenderConfig::default()).unwrap());
    let writer = {
        let shared = shared.clone();
        thread::spawn(move || {
            for n in 0..500 {
                shared.ingest(&format!("u{}", n % 50), &format!("i{}", n % 17));
            }
        })
    };
    let reader = {
        let shared = shared.clone();
        thread::spawn(move || {
            for n in 0..200 {
                // Any state is acceptable; the call must simply succeed.
                shared.recommend(&format!("u{}", n % 50), 3).unwrap();
            }
        })
    };
    writer.join().unwrap();
    reader.join().unwrap();

    let stats = shared.stats();
    assert_eq!(stats.events, 500);
    let graph_state = shared.read();
    for item in 0..graph_state.registry().item_count() as u32 {
        let item = affinity::ItemHandle(item);
        assert_eq!(
            graph_state.graph().popularity().count(item) as usize,
            graph_state.graph().users_for(item).len()
        );
    }
}
