//! Insert key generation.
//!
//! Selects one sampler, optionally followed by one order transform, and
//! produces the canonical insert sequence. The returned sequence is the only
//! source of the membership set used by search composition.

use crate::error::{invalid, KeyGenError, Result};
use crate::keys::{Key, KeyRange};
use crate::{order, sampler};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Insert distribution names as accepted by configuration and the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InsertDistKind {
    #[default]
    UniqueUniform,
    Uniform,
    Normal,
    #[serde(alias = "exponential")]
    Exp,
    Pareto,
    Clusters,
    SortedUnique,
    ReverseUnique,
    NearlySortedUnique,
}

impl InsertDistKind {
    pub const ALL: [InsertDistKind; 9] = [
        InsertDistKind::UniqueUniform,
        InsertDistKind::Uniform,
        InsertDistKind::Normal,
        InsertDistKind::Exp,
        InsertDistKind::Pareto,
        InsertDistKind::Clusters,
        InsertDistKind::SortedUnique,
        InsertDistKind::ReverseUnique,
        InsertDistKind::NearlySortedUnique,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InsertDistKind::UniqueUniform => "unique_uniform",
            InsertDistKind::Uniform => "uniform",
            InsertDistKind::Normal => "normal",
            InsertDistKind::Exp => "exp",
            InsertDistKind::Pareto => "pareto",
            InsertDistKind::Clusters => "clusters",
            InsertDistKind::SortedUnique => "sorted_unique",
            InsertDistKind::ReverseUnique => "reverse_unique",
            InsertDistKind::NearlySortedUnique => "nearly_sorted_unique",
        }
    }
}

impl FromStr for InsertDistKind {
    type Err = KeyGenError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        if s == "exponential" {
            return Ok(InsertDistKind::Exp);
        }
        InsertDistKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = InsertDistKind::ALL.iter().map(|k| k.as_str()).collect();
                invalid(format!(
                    "Unknown insert distribution: {}. Use one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

impl fmt::Display for InsertDistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully parameterised insert distribution. Exactly one is active per run.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertDistribution {
    Uniform,
    UniqueUniform,
    Normal { mean: f64, std: f64 },
    Exponential { rate: f64 },
    Pareto { alpha: f64 },
    Clusters { centers: Vec<f64>, std: f64 },
    SortedUnique,
    ReverseUnique,
    NearlySortedUnique { swap_frac: f64 },
}

impl InsertDistribution {
    pub fn kind(&self) -> InsertDistKind {
        match self {
            InsertDistribution::Uniform => InsertDistKind::Uniform,
            InsertDistribution::UniqueUniform => InsertDistKind::UniqueUniform,
            InsertDistribution::Normal { .. } => InsertDistKind::Normal,
            InsertDistribution::Exponential { .. } => InsertDistKind::Exp,
            InsertDistribution::Pareto { .. } => InsertDistKind::Pareto,
            InsertDistribution::Clusters { .. } => InsertDistKind::Clusters,
            InsertDistribution::SortedUnique => InsertDistKind::SortedUnique,
            InsertDistribution::ReverseUnique => InsertDistKind::ReverseUnique,
            InsertDistribution::NearlySortedUnique { .. } => InsertDistKind::NearlySortedUnique,
        }
    }

    /// Check numeric parameters without sampling anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            InsertDistribution::Normal { mean, std } => sampler::gaussian(*mean, *std).map(|_| ()),
            InsertDistribution::Exponential { rate } if !(rate.is_finite() && *rate > 0.0) => Err(
                invalid(format!("exponential rate must be finite and > 0, got {}", rate)),
            ),
            InsertDistribution::Pareto { alpha } if !(alpha.is_finite() && *alpha > 0.0) => Err(
                invalid(format!("pareto alpha must be finite and > 0, got {}", alpha)),
            ),
            InsertDistribution::Clusters { centers, .. } if centers.is_empty() => Err(invalid(
                "clusters requires at least one center, e.g. centers=100,1000,5000",
            )),
            InsertDistribution::Clusters { centers, std } => centers
                .iter()
                .try_for_each(|&c| sampler::gaussian(c, *std).map(|_| ())),
            InsertDistribution::NearlySortedUnique { swap_frac }
                if !(0.0..=1.0).contains(swap_frac) =>
            {
                Err(invalid(format!("swap_frac must be in [0, 1], got {}", swap_frac)))
            }
            _ => Ok(()),
        }
    }

    /// Whether the distribution guarantees distinct keys
    pub fn is_unique(&self) -> bool {
        matches!(
            self,
            InsertDistribution::UniqueUniform
                | InsertDistribution::SortedUnique
                | InsertDistribution::ReverseUnique
                | InsertDistribution::NearlySortedUnique { .. }
        )
    }
}

/// Produce the insert sequence of `n` keys in `range`.
pub fn generate_insert_keys<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    range: KeyRange,
    dist: &InsertDistribution,
) -> Result<Vec<Key>> {
    let keys = match dist {
        InsertDistribution::Uniform => sampler::uniform(rng, n, range),
        InsertDistribution::UniqueUniform => sampler::unique_uniform(rng, n, range)?,
        InsertDistribution::Normal { mean, std } => sampler::normal(rng, n, *mean, *std, range)?,
        InsertDistribution::Exponential { rate } => sampler::exponential(rng, n, *rate, range)?,
        InsertDistribution::Pareto { alpha } => sampler::pareto(rng, n, *alpha, range)?,
        InsertDistribution::Clusters { centers, std } => {
            sampler::clusters(rng, n, centers, *std, range)?
        }
        InsertDistribution::SortedUnique => order::sorted(&sampler::unique_uniform(rng, n, range)?),
        InsertDistribution::ReverseUnique => {
            order::reverse_sorted(&sampler::unique_uniform(rng, n, range)?)
        }
        InsertDistribution::NearlySortedUnique { swap_frac } => {
            dist.validate()?;
            let base = sampler::unique_uniform(rng, n, range)?;
            order::nearly_sorted(rng, &base, *swap_frac)
        }
    };

    tracing::debug!(
        dist = dist.kind().as_str(),
        n = keys.len(),
        range = %range,
        "generated insert keys"
    );
    Ok(keys)
}
