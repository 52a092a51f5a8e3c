//! Seed-derived RNG streams.
//!
//! Each run uses three independent generators:
//! - insert: seeded with the raw seed
//! - delete: seeded with `seed ^ DELETE_STREAM_XOR`
//! - search: seeded with `seed ^ SEARCH_STREAM_XOR`
//!
//! Streams are separate `StdRng` instances and never share state, so the
//! order in which stages advance them cannot change any stage's output.
//!
//! Output for a seed is stable only for a pinned `rand` version and a fixed
//! pointer width: index draws such as `gen_range(0..len)` over `usize`
//! consume the stream differently on 32-bit and 64-bit targets.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub const DELETE_STREAM_XOR: u64 = 0xC801_3EA4;
pub const SEARCH_STREAM_XOR: u64 = 0x9E37_79B9;

/// The three per-run generators
#[derive(Debug, Clone)]
pub struct RngStreams {
    pub insert: StdRng,
    pub delete: StdRng,
    pub search: StdRng,
}

impl RngStreams {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            insert: insert_stream(seed),
            delete: delete_stream(seed),
            search: search_stream(seed),
        }
    }
}

pub fn insert_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn delete_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ DELETE_STREAM_XOR)
}

pub fn search_stream(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ SEARCH_STREAM_XOR)
}
