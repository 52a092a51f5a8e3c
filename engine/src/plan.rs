//! Run orchestration: seed the streams, then insert, delete and search.

use crate::config::GeneratorConfig;
use crate::delete::select_delete_keys;
use crate::error::Result;
use crate::insert::generate_insert_keys;
use crate::keys::Key;
use crate::rng::RngStreams;
use crate::search::{compose_search_keys, MembershipSet};
use std::time::Instant;

/// The three generated sequences of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySets {
    pub insert: Vec<Key>,
    pub delete: Vec<Key>,
    pub search: Vec<Key>,
    /// Targeted hit count of `search`, `round(hit_ratio * n_search)`
    pub expected_hits: usize,
}

impl KeySets {
    /// Number of search queries that are present in the insert sequence
    pub fn realized_hits(&self) -> usize {
        let set = MembershipSet::from_keys(&self.insert);
        self.search.iter().filter(|&&k| set.contains(k)).count()
    }
}

/// Validate `config` and generate all three sequences.
///
/// Nothing is returned unless every stage succeeds.
pub fn generate(config: &GeneratorConfig) -> Result<KeySets> {
    config.validate()?;
    let range = config.key_range()?;
    let started = Instant::now();

    let mut streams = RngStreams::from_seed(config.seed);

    let insert = generate_insert_keys(
        &mut streams.insert,
        config.n_insert,
        range,
        &config.insert_distribution(),
    )?;

    let delete = select_delete_keys(
        &insert,
        &mut streams.delete,
        config.n_delete,
        config.delete_mode,
    )?;

    let search = compose_search_keys(
        &insert,
        &mut streams.search,
        config.n_search,
        config.hit_ratio,
        &config.miss_policy(),
        range,
    )?;

    tracing::info!(
        seed = config.seed,
        range = %range,
        insert_dist = config.insert_dist.as_str(),
        delete_mode = config.delete_mode.as_str(),
        miss_dist = config.search_miss_dist.as_str(),
        n_insert = insert.len(),
        n_delete = delete.len(),
        n_search = search.queries.len(),
        expected_hits = search.expected_hits,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "generated key sets"
    );

    Ok(KeySets {
        insert,
        delete,
        search: search.queries,
        expected_hits: search.expected_hits,
    })
}
