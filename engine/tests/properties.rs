//! Property tests for samplers, order transforms and query composition

use keyset_engine::order::{nearly_sorted, reverse_sorted, sorted};
use keyset_engine::rng::{delete_stream, search_stream};
use keyset_engine::sampler::unique_uniform;
use keyset_engine::{
    compose_search_keys, select_delete_keys, DeletePolicy, Key, KeyGenError, KeyRange,
    MembershipSet, MissPolicy, OffsetFallback,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};

fn multiset(keys: &[Key]) -> HashMap<Key, usize> {
    let mut counts = HashMap::new();
    for &k in keys {
        *counts.entry(k).or_insert(0) += 1;
    }
    counts
}

fn range_strategy() -> impl Strategy<Value = KeyRange> {
    (-1_000_000i32..1_000_000, 0i32..50_000)
        .prop_map(|(lo, span)| KeyRange::new(lo, lo + span).unwrap())
}

fn policy_strategy() -> impl Strategy<Value = MissPolicy> {
    prop_oneof![
        Just(MissPolicy::Offset {
            fallback: OffsetFallback::Fail
        }),
        Just(MissPolicy::UniformRetry),
        (-1000.0f64..1000.0, 1.0f64..5000.0)
            .prop_map(|(mean, std)| MissPolicy::NormalRetry { mean, std }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn unique_uniform_is_distinct_and_in_range(
        seed in any::<u64>(),
        range in range_strategy(),
        n in 0usize..500,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        match unique_uniform(&mut rng, n, range) {
            Ok(keys) => {
                prop_assert_eq!(keys.len(), n);
                prop_assert_eq!(keys.iter().collect::<HashSet<_>>().len(), n);
                prop_assert!(keys.iter().all(|&k| range.contains(k)));
            }
            Err(KeyGenError::RangeExhausted { requested, available }) => {
                prop_assert!(requested > available);
                prop_assert_eq!(available, range.width());
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    #[test]
    fn order_transforms_are_permutations(
        seed in any::<u64>(),
        keys in prop::collection::vec(any::<i32>(), 0..300),
        swap_frac in 0.0f64..=1.0,
    ) {
        let expected = multiset(&keys);

        let asc = sorted(&keys);
        prop_assert!(asc.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(multiset(&asc), expected.clone());

        let desc = reverse_sorted(&keys);
        prop_assert!(desc.windows(2).all(|w| w[0] >= w[1]));
        prop_assert_eq!(multiset(&desc), expected.clone());

        let mut rng = StdRng::seed_from_u64(seed);
        let nearly = nearly_sorted(&mut rng, &keys, swap_frac);
        prop_assert_eq!(nearly.len(), keys.len());
        prop_assert_eq!(multiset(&nearly), expected);
    }

    #[test]
    fn search_meets_hit_target(
        seed in any::<u64>(),
        range in range_strategy(),
        n_insert in 1usize..300,
        n_search in 0usize..300,
        hit_ratio in 0.0f64..=1.0,
        policy in policy_strategy(),
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let insert: Vec<Key> = (0..n_insert)
            .map(|_| rand::Rng::gen_range(&mut rng, range.lo()..=range.hi()))
            .collect();
        let set = MembershipSet::from_keys(&insert);

        let out = compose_search_keys(
            &insert,
            &mut search_stream(seed),
            n_search,
            hit_ratio,
            &policy,
            range,
        )
        .unwrap();

        prop_assert_eq!(out.queries.len(), n_search);
        prop_assert_eq!(
            out.expected_hits,
            (hit_ratio * n_search as f64).round_ties_even() as usize
        );
        let realized = out.queries.iter().filter(|&&k| set.contains(k)).count();
        prop_assert_eq!(realized, out.expected_hits);
    }

    #[test]
    fn random_subset_is_a_sub_multiset(
        seed in any::<u64>(),
        insert in prop::collection::vec(-100i32..100, 0..200),
        frac in 0.0f64..=1.0,
    ) {
        let n_delete = (insert.len() as f64 * frac) as usize;
        let out = select_delete_keys(
            &insert,
            &mut delete_stream(seed),
            Some(n_delete),
            DeletePolicy::RandomSubset,
        )
        .unwrap();

        prop_assert_eq!(out.len(), n_delete);
        let available = multiset(&insert);
        for (key, count) in multiset(&out) {
            prop_assert!(available.get(&key).copied().unwrap_or(0) >= count);
        }
    }

    #[test]
    fn shuffle_all_is_a_permutation(
        seed in any::<u64>(),
        insert in prop::collection::vec(any::<i32>(), 0..200),
    ) {
        let out = select_delete_keys(&insert, &mut delete_stream(seed), None, DeletePolicy::ShuffleAll)
            .unwrap();
        prop_assert_eq!(multiset(&out), multiset(&insert));
    }
}
