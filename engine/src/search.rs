//! Search query composition.
//!
//! Queries are a shuffled mix of hits (keys drawn with replacement from the
//! insert sequence) and misses (keys absent from the insert sequence). Misses
//! come from one of three policies:
//!
//! - `offset`: shift a base key by a large offset. A collision triggers up to
//!   [`OFFSET_RETRY_CAP`] draws from the full key range; if all of them
//!   collide the [`OffsetFallback`] decides between keeping the colliding
//!   value and failing with `RetryBudgetExceeded`.
//! - `uniform_retry`: up to [`MISS_RETRY_CAP`] uniform draws in the key
//!   range, then unbounded draws from the full key range.
//! - `normal_retry`: like `uniform_retry` with clamped Gaussian draws.
//!
//! The unbounded phase only fails to terminate if the insert sequence covers
//! every representable key.

use crate::error::{invalid, KeyGenError, Result};
use crate::keys::{clamp_key, Key, KeyRange, KEY_MAX_REPR, KEY_MIN_REPR};
use crate::sampler::{clamped_gaussian, gaussian};
use ahash::AHashSet;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum shift applied by the offset policy
pub const OFFSET_MIN: i64 = 1_000_003;
/// Added to the range width when it exceeds `OFFSET_MIN`
pub const OFFSET_PAD: i64 = 12_345;
/// Full-range retries after an offset collision
pub const OFFSET_RETRY_CAP: usize = 1000;
/// In-range retries per miss for the retry policies
pub const MISS_RETRY_CAP: usize = 2000;

/// Miss policy names as accepted by configuration and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissDistKind {
    #[default]
    Offset,
    UniformRetry,
    NormalRetry,
}

impl MissDistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissDistKind::Offset => "offset",
            MissDistKind::UniformRetry => "uniform_retry",
            MissDistKind::NormalRetry => "normal_retry",
        }
    }
}

impl FromStr for MissDistKind {
    type Err = KeyGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "offset" => Ok(MissDistKind::Offset),
            "uniform_retry" => Ok(MissDistKind::UniformRetry),
            "normal_retry" => Ok(MissDistKind::NormalRetry),
            other => Err(invalid(format!(
                "Unknown miss distribution: {}. Use 'offset', 'uniform_retry', or 'normal_retry'",
                other
            ))),
        }
    }
}

impl fmt::Display for MissDistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the offset policy does when its retry budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OffsetFallback {
    /// Keep the colliding candidate; the query may turn out to be a hit
    #[default]
    Accept,
    /// Fail with `RetryBudgetExceeded`
    Fail,
}

impl OffsetFallback {
    pub fn as_str(&self) -> &'static str {
        match self {
            OffsetFallback::Accept => "accept",
            OffsetFallback::Fail => "fail",
        }
    }
}

impl FromStr for OffsetFallback {
    type Err = KeyGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "accept" => Ok(OffsetFallback::Accept),
            "fail" => Ok(OffsetFallback::Fail),
            other => Err(invalid(format!(
                "Unknown offset fallback: {}. Use 'accept' or 'fail'",
                other
            ))),
        }
    }
}

impl fmt::Display for OffsetFallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parameterised miss policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissPolicy {
    Offset { fallback: OffsetFallback },
    UniformRetry,
    NormalRetry { mean: f64, std: f64 },
}

impl MissPolicy {
    pub fn kind(&self) -> MissDistKind {
        match self {
            MissPolicy::Offset { .. } => MissDistKind::Offset,
            MissPolicy::UniformRetry => MissDistKind::UniformRetry,
            MissPolicy::NormalRetry { .. } => MissDistKind::NormalRetry,
        }
    }
}

/// Read-only set of inserted keys
#[derive(Debug, Clone, Default)]
pub struct MembershipSet {
    keys: AHashSet<Key>,
}

impl MembershipSet {
    pub fn from_keys(keys: &[Key]) -> Self {
        Self {
            keys: keys.iter().copied().collect(),
        }
    }

    #[inline]
    pub fn contains(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Outcome of one capped retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Found(Key),
    Exhausted,
}

/// Call `draw` up to `cap` times and return the first key not in `set`.
pub fn retry_until_miss<F>(cap: usize, set: &MembershipSet, mut draw: F) -> RetryOutcome
where
    F: FnMut() -> Key,
{
    for _ in 0..cap {
        let key = draw();
        if !set.contains(key) {
            return RetryOutcome::Found(key);
        }
    }
    RetryOutcome::Exhausted
}

/// Composed queries plus the targeted hit count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchKeys {
    pub queries: Vec<Key>,
    /// `round(hit_ratio * n)`; a target, realized exactly whenever the insert
    /// sequence is non-empty and no offset collision was accepted
    pub expected_hits: usize,
}

/// `hit_ratio * n` rounded half-to-even
pub fn expected_hit_count(hit_ratio: f64, n: usize) -> usize {
    (hit_ratio * n as f64).round_ties_even() as usize
}

/// Shift used by the offset policy: `max(1_000_003, width + 12_345)`
pub fn offset_distance(range: KeyRange) -> i64 {
    OFFSET_MIN.max(range.width() as i64 + OFFSET_PAD)
}

#[derive(Debug, Default)]
struct MissStats {
    full_range_fallbacks: usize,
    accepted_collisions: usize,
}

/// Build `n` queries against `insert` with the requested hit ratio.
pub fn compose_search_keys<R: Rng + ?Sized>(
    insert: &[Key],
    rng: &mut R,
    n: usize,
    hit_ratio: f64,
    policy: &MissPolicy,
    range: KeyRange,
) -> Result<SearchKeys> {
    if !(hit_ratio.is_finite() && (0.0..=1.0).contains(&hit_ratio)) {
        return Err(invalid(format!(
            "hit_ratio must be a finite value in [0, 1], got {}",
            hit_ratio
        )));
    }

    let expected_hits = expected_hit_count(hit_ratio, n);
    let hits = if insert.is_empty() { 0 } else { expected_hits };
    let misses = n - hits;

    let set = MembershipSet::from_keys(insert);
    let mut queries = Vec::with_capacity(n);
    for _ in 0..hits {
        queries.push(insert[rng.gen_range(0..insert.len())]);
    }

    let mut stats = MissStats::default();
    match *policy {
        MissPolicy::Offset { fallback } => {
            let offset = offset_distance(range);
            for _ in 0..misses {
                queries.push(offset_miss(rng, insert, &set, range, offset, fallback, &mut stats)?);
            }
        }
        MissPolicy::UniformRetry => {
            for _ in 0..misses {
                let found = retry_until_miss(MISS_RETRY_CAP, &set, || {
                    rng.gen_range(range.lo()..=range.hi())
                });
                queries.push(settle_retry(rng, &set, found, &mut stats));
            }
        }
        MissPolicy::NormalRetry { mean, std } => {
            let dist = gaussian(mean, std)?;
            for _ in 0..misses {
                let found =
                    retry_until_miss(MISS_RETRY_CAP, &set, || clamped_gaussian(rng, &dist, range));
                queries.push(settle_retry(rng, &set, found, &mut stats));
            }
        }
    }

    if stats.full_range_fallbacks > 0 {
        tracing::warn!(
            count = stats.full_range_fallbacks,
            cap = MISS_RETRY_CAP,
            "miss retries exhausted the key range; drew from the full key range instead"
        );
    }
    if stats.accepted_collisions > 0 {
        tracing::warn!(
            count = stats.accepted_collisions,
            "offset misses accepted after retry budget ran out; they may be hits"
        );
    }

    queries.shuffle(rng);
    tracing::debug!(
        policy = policy.kind().as_str(),
        n = queries.len(),
        hits,
        misses,
        "composed search keys"
    );

    Ok(SearchKeys {
        queries,
        expected_hits,
    })
}

fn full_range_key<R: Rng + ?Sized>(rng: &mut R) -> Key {
    rng.gen_range(KEY_MIN_REPR..=KEY_MAX_REPR)
}

fn offset_miss<R: Rng + ?Sized>(
    rng: &mut R,
    insert: &[Key],
    set: &MembershipSet,
    range: KeyRange,
    offset: i64,
    fallback: OffsetFallback,
    stats: &mut MissStats,
) -> Result<Key> {
    let base = if insert.is_empty() {
        rng.gen_range(range.lo()..=range.hi())
    } else {
        insert[rng.gen_range(0..insert.len())]
    };
    let candidate = clamp_key(base as i64 + offset, KEY_MIN_REPR, KEY_MAX_REPR);
    if !set.contains(candidate) {
        return Ok(candidate);
    }

    let retry = retry_until_miss(OFFSET_RETRY_CAP, set, || full_range_key(rng));
    let key = settle_offset(candidate, retry, fallback)?;
    if retry == RetryOutcome::Exhausted {
        stats.accepted_collisions += 1;
    }
    Ok(key)
}

/// Resolve an offset collision from the outcome of its retry loop.
pub fn settle_offset(candidate: Key, retry: RetryOutcome, fallback: OffsetFallback) -> Result<Key> {
    match (retry, fallback) {
        (RetryOutcome::Found(key), _) => Ok(key),
        (RetryOutcome::Exhausted, OffsetFallback::Accept) => Ok(candidate),
        (RetryOutcome::Exhausted, OffsetFallback::Fail) => Err(KeyGenError::RetryBudgetExceeded {
            attempts: OFFSET_RETRY_CAP,
        }),
    }
}

fn settle_retry<R: Rng + ?Sized>(
    rng: &mut R,
    set: &MembershipSet,
    found: RetryOutcome,
    stats: &mut MissStats,
) -> Key {
    match found {
        RetryOutcome::Found(key) => key,
        RetryOutcome::Exhausted => {
            stats.full_range_fallbacks += 1;
            loop {
                let key = full_range_key(rng);
                if !set.contains(key) {
                    break key;
                }
            }
        }
    }
}
