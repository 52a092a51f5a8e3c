// engine/src/config.rs
//
// Generator Configuration
//
// Priority order (highest to lowest):
// 1. Command-line arguments (applied by the CLI after load())
// 2. Environment variables (KEYSET__* prefix)
// 3. Config file (YAML/TOML/JSON)
// 4. Built-in defaults
//
// Validation happens before any sampling; the engine re-checks
// policy-specific bounds where it uses them.

use crate::delete::DeletePolicy;
use crate::error::{invalid, KeyGenError};
use crate::insert::{InsertDistKind, InsertDistribution};
use crate::keys::{Key, KeyRange};
use crate::search::{MissDistKind, MissPolicy, OffsetFallback};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Main Configuration Structure
// ============================================================================

/// Everything needed to produce one insert/search/delete key set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Master seed; the three RNG streams are derived from it
    pub seed: u64,

    /// Lower bound of the key range (inclusive)
    pub key_min: Key,

    /// Upper bound of the key range (inclusive)
    pub key_max: Key,

    /// Number of insert keys
    pub n_insert: usize,

    /// Number of search queries
    pub n_search: usize,

    /// Number of delete keys (defaults to `n_insert`)
    pub n_delete: Option<usize>,

    /// Insert key distribution
    pub insert_dist: InsertDistKind,

    /// Mean for `normal` inserts and `normal_retry` misses
    pub mean: f64,

    /// Standard deviation for `normal`, `clusters` and `normal_retry`
    pub std: f64,

    /// Rate of the `exp` distribution
    pub lambd: f64,

    /// Shape of the `pareto` distribution
    pub alpha: f64,

    /// Cluster centers for `clusters`
    pub centers: Vec<f64>,

    /// Fraction of swaps for `nearly_sorted_unique`
    pub swap_frac: f64,

    /// Delete key selection policy
    pub delete_mode: DeletePolicy,

    /// Fraction of search queries that hit an inserted key
    pub hit_ratio: f64,

    /// Miss generation policy
    pub search_miss_dist: MissDistKind,

    /// Behaviour of the `offset` policy once its retries are exhausted
    pub offset_fallback: OffsetFallback,

    /// Key file output settings
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            key_min: 0,
            key_max: 1_000_000_000,
            n_insert: 1000,
            n_search: 1000,
            n_delete: None,
            insert_dist: InsertDistKind::UniqueUniform,
            mean: 0.0,
            std: 1000.0,
            lambd: 1.0,
            alpha: 1.5,
            centers: Vec::new(),
            swap_frac: 0.01,
            delete_mode: DeletePolicy::ShuffleAll,
            hit_ratio: 0.5,
            search_miss_dist: MissDistKind::Offset,
            offset_fallback: OffsetFallback::Accept,
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Files are written to `<prefix>_insert.txt`, `<prefix>_search.txt`
    /// and `<prefix>_delete.txt`
    pub out_prefix: String,

    /// Values per output line
    pub per_line: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_prefix: "case1".to_string(),
            per_line: 16,
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format (json or text)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON format (for log aggregation)
    Json,
}

// ============================================================================
// Configuration Loading
// ============================================================================

impl GeneratorConfig {
    /// Load configuration with priority chain:
    /// 1. Environment variables (KEYSET__*; `KEYSET__CENTERS` is comma-separated)
    /// 2. Config file (if provided)
    /// 3. Built-in defaults
    ///
    /// The result is not validated; CLI overrides usually follow, so callers
    /// run [`GeneratorConfig::validate`] once the final values are in place.
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let defaults = Self::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize defaults")?;
        builder = builder.add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("KEYSET")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("centers"),
        );

        let settings = builder.build().context("Failed to build config")?;

        settings
            .try_deserialize()
            .context("Failed to deserialize config")
    }

    /// Validate all parameters. Fails fast, before any sampling.
    pub fn validate(&self) -> std::result::Result<(), KeyGenError> {
        KeyRange::new(self.key_min, self.key_max)?;

        if self.n_insert == 0 {
            return Err(invalid("n_insert must be > 0"));
        }
        if self.n_search == 0 {
            return Err(invalid("n_search must be > 0"));
        }
        if !(self.hit_ratio.is_finite() && (0.0..=1.0).contains(&self.hit_ratio)) {
            return Err(invalid(format!(
                "hit_ratio must be a finite value in [0, 1], got {}",
                self.hit_ratio
            )));
        }

        self.insert_distribution().validate()?;
        if let MissPolicy::NormalRetry { mean, std } = self.miss_policy() {
            crate::sampler::gaussian(mean, std)?;
        }

        if self.output.per_line == 0 {
            return Err(invalid("per_line must be > 0"));
        }
        if self.output.out_prefix.trim().is_empty() {
            return Err(invalid("out_prefix cannot be empty"));
        }
        Ok(())
    }

    pub fn key_range(&self) -> std::result::Result<KeyRange, KeyGenError> {
        KeyRange::new(self.key_min, self.key_max)
    }

    /// The parameterised distribution selected by `insert_dist`
    pub fn insert_distribution(&self) -> InsertDistribution {
        match self.insert_dist {
            InsertDistKind::UniqueUniform => InsertDistribution::UniqueUniform,
            InsertDistKind::Uniform => InsertDistribution::Uniform,
            InsertDistKind::Normal => InsertDistribution::Normal {
                mean: self.mean,
                std: self.std,
            },
            InsertDistKind::Exp => InsertDistribution::Exponential { rate: self.lambd },
            InsertDistKind::Pareto => InsertDistribution::Pareto { alpha: self.alpha },
            InsertDistKind::Clusters => InsertDistribution::Clusters {
                centers: self.centers.clone(),
                std: self.std,
            },
            InsertDistKind::SortedUnique => InsertDistribution::SortedUnique,
            InsertDistKind::ReverseUnique => InsertDistribution::ReverseUnique,
            InsertDistKind::NearlySortedUnique => InsertDistribution::NearlySortedUnique {
                swap_frac: self.swap_frac,
            },
        }
    }

    /// The parameterised policy selected by `search_miss_dist`
    pub fn miss_policy(&self) -> MissPolicy {
        match self.search_miss_dist {
            MissDistKind::Offset => MissPolicy::Offset {
                fallback: self.offset_fallback,
            },
            MissDistKind::UniformRetry => MissPolicy::UniformRetry,
            MissDistKind::NormalRetry => MissPolicy::NormalRetry {
                mean: self.mean,
                std: self.std,
            },
        }
    }

    /// Centers rendered the way they are accepted on the command line
    pub fn centers_csv(&self) -> String {
        self.centers
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Parse a comma-separated center list such as `100,1000,5000`.
/// Blank entries are skipped.
pub fn parse_centers(s: &str) -> std::result::Result<Vec<f64>, KeyGenError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>()
                .map_err(|e| invalid(format!("invalid cluster center '{}': {}", part, e)))
        })
        .collect()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Generate YAML config with default values.
///
/// # Example
/// ```bash
/// keyset-gen print-config yaml > keyset.yaml
/// ```
pub fn generate_example_yaml() -> String {
    let config = GeneratorConfig::default();
    match serde_yaml::to_string(&config) {
        Ok(serialized) => serialized,
        Err(error) => format!("# failed to serialize default config to YAML: {error}\n"),
    }
}

/// Generate TOML config with default values.
pub fn generate_example_toml() -> String {
    let config = GeneratorConfig::default();
    match toml::to_string_pretty(&config) {
        Ok(serialized) => serialized,
        Err(error) => format!("# failed to serialize default config to TOML: {error}\n"),
    }
}
