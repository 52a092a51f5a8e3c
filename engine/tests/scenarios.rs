//! End-to-end generation scenarios

use keyset_engine::rng::{delete_stream, insert_stream, search_stream};
use keyset_engine::{
    compose_search_keys, generate, generate_insert_keys, select_delete_keys, DeletePolicy,
    GeneratorConfig, InsertDistKind, InsertDistribution, KeyGenError, KeyRange, MembershipSet,
    MissDistKind, MissPolicy, OffsetFallback,
};
use std::collections::HashSet;

fn small_config() -> GeneratorConfig {
    GeneratorConfig {
        seed: 1,
        key_min: 0,
        key_max: 99,
        n_insert: 10,
        n_search: 10,
        hit_ratio: 0.5,
        insert_dist: InsertDistKind::UniqueUniform,
        delete_mode: DeletePolicy::ShuffleAll,
        search_miss_dist: MissDistKind::Offset,
        ..Default::default()
    }
}

#[test]
fn test_small_unique_scenario() {
    let sets = generate(&small_config()).unwrap();

    // 10 distinct keys in [0, 99]
    assert_eq!(sets.insert.len(), 10);
    let inserted: HashSet<_> = sets.insert.iter().copied().collect();
    assert_eq!(inserted.len(), 10);
    assert!(sets.insert.iter().all(|k| (0..=99).contains(k)));

    // Delete is a permutation of insert
    let mut delete = sets.delete.clone();
    let mut insert = sets.insert.clone();
    delete.sort_unstable();
    insert.sort_unstable();
    assert_eq!(delete, insert);

    // 5 hits, 5 misses
    assert_eq!(sets.search.len(), 10);
    assert_eq!(sets.expected_hits, 5);
    let hits = sets.search.iter().filter(|k| inserted.contains(k)).count();
    assert_eq!(hits, 5);
    assert_eq!(sets.realized_hits(), 5);
}

#[test]
fn test_unique_request_larger_than_range_fails() {
    let config = GeneratorConfig {
        n_insert: 5,
        key_min: 0,
        key_max: 3,
        ..small_config()
    };
    assert!(matches!(
        generate(&config),
        Err(KeyGenError::RangeExhausted {
            requested: 5,
            available: 4
        })
    ));
}

#[test]
fn test_random_subset_over_request_fails() {
    let config = GeneratorConfig {
        delete_mode: DeletePolicy::RandomSubset,
        n_delete: Some(11),
        ..small_config()
    };
    assert!(matches!(generate(&config), Err(KeyGenError::InvalidConfig(_))));
}

#[test]
fn test_random_subset_partial_delete() {
    let config = GeneratorConfig {
        key_max: 1_000_000,
        n_insert: 1000,
        delete_mode: DeletePolicy::RandomSubset,
        n_delete: Some(250),
        ..small_config()
    };
    let sets = generate(&config).unwrap();
    assert_eq!(sets.delete.len(), 250);
    let inserted: HashSet<_> = sets.insert.iter().collect();
    let deleted: HashSet<_> = sets.delete.iter().collect();
    assert_eq!(deleted.len(), 250, "unique inserts give unique deletes");
    assert!(deleted.is_subset(&inserted));
}

#[test]
fn test_streams_are_order_independent() {
    let range = KeyRange::new(0, 9_999).unwrap();
    let insert = generate_insert_keys(
        &mut insert_stream(42),
        200,
        range,
        &InsertDistribution::UniqueUniform,
    )
    .unwrap();
    let policy = MissPolicy::UniformRetry;

    // search first, then delete
    let search_a =
        compose_search_keys(&insert, &mut search_stream(42), 100, 0.5, &policy, range).unwrap();
    let delete_a =
        select_delete_keys(&insert, &mut delete_stream(42), None, DeletePolicy::ShuffleAll).unwrap();

    // delete first, then search
    let delete_b =
        select_delete_keys(&insert, &mut delete_stream(42), None, DeletePolicy::ShuffleAll).unwrap();
    let search_b =
        compose_search_keys(&insert, &mut search_stream(42), 100, 0.5, &policy, range).unwrap();

    assert_eq!(search_a, search_b);
    assert_eq!(delete_a, delete_b);

    // Same streams as a full run with the same seed
    let sets = generate(&GeneratorConfig {
        seed: 42,
        key_min: 0,
        key_max: 9_999,
        n_insert: 200,
        n_search: 100,
        search_miss_dist: MissDistKind::UniformRetry,
        ..Default::default()
    })
    .unwrap();
    assert_eq!(sets.insert, insert);
    assert_eq!(sets.delete, delete_a);
    assert_eq!(sets.search, search_a.queries);
}

#[test]
fn test_every_distribution_and_policy_combination_runs() {
    let dists = InsertDistKind::ALL;
    let deletes = [
        DeletePolicy::ShuffleAll,
        DeletePolicy::InOrder,
        DeletePolicy::RandomSubset,
    ];
    let misses = [
        MissDistKind::Offset,
        MissDistKind::UniformRetry,
        MissDistKind::NormalRetry,
    ];

    for dist in dists {
        for delete_mode in deletes {
            for miss in misses {
                let config = GeneratorConfig {
                    seed: 7,
                    key_min: -5_000,
                    key_max: 5_000,
                    n_insert: 300,
                    n_search: 200,
                    n_delete: Some(150),
                    insert_dist: dist,
                    centers: vec![-2_000.0, 0.0, 2_000.0],
                    std: 300.0,
                    lambd: 0.01,
                    delete_mode,
                    search_miss_dist: miss,
                    hit_ratio: 0.25,
                    ..Default::default()
                };
                let sets = generate(&config)
                    .unwrap_or_else(|e| panic!("{:?}/{:?}/{:?}: {}", dist, delete_mode, miss, e));
                assert_eq!(sets.insert.len(), 300);
                assert_eq!(sets.delete.len(), 150);
                assert_eq!(sets.search.len(), 200);
                assert_eq!(sets.expected_hits, 50);
                assert_eq!(sets.realized_hits(), 50, "{:?}/{:?}", dist, miss);
            }
        }
    }
}

#[test]
fn test_offset_collision_at_top_of_key_space() {
    // Every key of the range is inserted, including i32::MAX, so each offset
    // candidate clamps onto an inserted key and has to be redrawn.
    let config = GeneratorConfig {
        key_min: i32::MAX - 9,
        key_max: i32::MAX,
        n_insert: 10,
        n_search: 200,
        insert_dist: InsertDistKind::UniqueUniform,
        hit_ratio: 0.0,
        search_miss_dist: MissDistKind::Offset,
        offset_fallback: OffsetFallback::Fail,
        ..Default::default()
    };
    let sets = generate(&config).unwrap();
    let set = MembershipSet::from_keys(&sets.insert);
    assert_eq!(set.len(), 10);
    assert_eq!(sets.search.len(), 200);
    assert!(sets.search.iter().all(|&k| !set.contains(k)));
}
