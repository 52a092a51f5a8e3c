//! Key-Set Generation Engine
//!
//! Produces the insert, delete and search key sequences that drive an
//! insert/search/delete benchmark of a key-indexed structure. Output is fully
//! determined by the configuration and its seed.
//!
//! # Architecture
//!
//! ```text
//! engine
//! ├── keys      # Key type, ranges, clamping
//! ├── rng       # Seed-derived insert/delete/search streams
//! ├── sampler   # uniform, unique, normal, exp, pareto, clusters
//! ├── order     # sorted / reverse / nearly-sorted transforms
//! ├── insert    # insert distribution selection
//! ├── delete    # delete policies
//! ├── search    # hit/miss query composition
//! ├── plan      # end-to-end run
//! └── config    # layered configuration
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use keyset_engine::{generate, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     seed: 1,
//!     key_min: 0,
//!     key_max: 99,
//!     n_insert: 10,
//!     n_search: 10,
//!     ..Default::default()
//! };
//! let sets = generate(&config)?;
//! assert_eq!(sets.search.len(), 10);
//! # Ok::<(), keyset_engine::KeyGenError>(())
//! ```

pub mod config;
pub mod delete;
pub mod error;
pub mod insert;
pub mod keys;
pub mod order;
pub mod plan;
pub mod rng;
pub mod sampler;
pub mod search;

pub use config::{GeneratorConfig, LogFormat, LogLevel, LoggingConfig, OutputConfig};
pub use delete::{select_delete_keys, DeletePolicy};
pub use error::KeyGenError;
pub use insert::{generate_insert_keys, InsertDistKind, InsertDistribution};
pub use keys::{clamp_key, Key, KeyRange, KEY_MAX_REPR, KEY_MIN_REPR};
pub use plan::{generate, KeySets};
pub use rng::RngStreams;
pub use search::{
    compose_search_keys, MembershipSet, MissDistKind, MissPolicy, OffsetFallback, RetryOutcome,
    SearchKeys,
};
