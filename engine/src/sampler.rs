//! Distribution samplers.
//!
//! Every sampler produces exactly `n` keys inside the given [`KeyRange`].
//! Continuous distributions are mapped to integers and clamped, so probability
//! mass that falls outside the range accumulates on the bounds. That is an
//! accepted approximation, not a rejection sampler.

use crate::error::{invalid, KeyGenError, Result};
use crate::keys::{round_to_i64, Key, KeyRange};
use ahash::AHashSet;
use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Pareto};

/// Independent uniform draws; duplicates allowed.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, n: usize, range: KeyRange) -> Vec<Key> {
    (0..n)
        .map(|_| rng.gen_range(range.lo()..=range.hi()))
        .collect()
}

/// Uniform draws without replacement until `n` distinct keys are collected.
///
/// Keys come back in first-drawn order. Callers must not rely on any
/// particular order beyond it being reproducible for a seed.
pub fn unique_uniform<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    range: KeyRange,
) -> Result<Vec<Key>> {
    let available = range.width();
    if n as u64 > available {
        return Err(KeyGenError::RangeExhausted {
            requested: n as u64,
            available,
        });
    }

    let mut seen = AHashSet::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let key = rng.gen_range(range.lo()..=range.hi());
        if seen.insert(key) {
            out.push(key);
        }
    }
    Ok(out)
}

/// Build a Gaussian after checking the parameters.
pub(crate) fn gaussian(mean: f64, std: f64) -> Result<Normal<f64>> {
    if !mean.is_finite() {
        return Err(invalid(format!("mean must be finite, got {}", mean)));
    }
    if !(std.is_finite() && std >= 0.0) {
        return Err(invalid(format!("std must be a finite value >= 0, got {}", std)));
    }
    Normal::new(mean, std).map_err(|e| invalid(format!("normal(mean={}, std={}): {}", mean, std, e)))
}

/// One rounded and clamped Gaussian draw
#[inline]
pub(crate) fn clamped_gaussian<R: Rng + ?Sized>(
    rng: &mut R,
    dist: &Normal<f64>,
    range: KeyRange,
) -> Key {
    range.clamp(round_to_i64(dist.sample(rng)))
}

/// Gaussian(mean, std), rounded half-to-even, clamped.
pub fn normal<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    mean: f64,
    std: f64,
    range: KeyRange,
) -> Result<Vec<Key>> {
    let dist = gaussian(mean, std)?;
    Ok((0..n).map(|_| clamped_gaussian(rng, &dist, range)).collect())
}

/// `lo + trunc(Exp(rate))`, clamped.
pub fn exponential<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    rate: f64,
    range: KeyRange,
) -> Result<Vec<Key>> {
    if !(rate.is_finite() && rate > 0.0) {
        return Err(invalid(format!("exponential rate must be finite and > 0, got {}", rate)));
    }
    let dist = Exp::new(rate).map_err(|e| invalid(format!("exp(rate={}): {}", rate, e)))?;

    let lo = range.lo() as i64;
    Ok((0..n)
        .map(|_| {
            let x: f64 = dist.sample(rng);
            range.clamp(lo.saturating_add(x as i64))
        })
        .collect())
}

/// Heavy tail: `lo + trunc(Pareto(1, alpha) * scale)` with
/// `scale = max(1, width / 20)`, clamped.
pub fn pareto<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    alpha: f64,
    range: KeyRange,
) -> Result<Vec<Key>> {
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(invalid(format!("pareto alpha must be finite and > 0, got {}", alpha)));
    }
    let dist =
        Pareto::new(1.0, alpha).map_err(|e| invalid(format!("pareto(alpha={}): {}", alpha, e)))?;
    let scale = pareto_scale(range);

    let lo = range.lo() as i64;
    Ok((0..n)
        .map(|_| {
            let x: f64 = dist.sample(rng);
            range.clamp(lo.saturating_add((x * scale) as i64))
        })
        .collect())
}

pub(crate) fn pareto_scale(range: KeyRange) -> f64 {
    (range.width() / 20).max(1) as f64
}

/// Gaussian mixture: pick a center uniformly, then draw Gaussian(center, std).
pub fn clusters<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    centers: &[f64],
    std: f64,
    range: KeyRange,
) -> Result<Vec<Key>> {
    if centers.is_empty() {
        return Err(invalid(
            "clusters requires at least one center, e.g. centers=100,1000,5000",
        ));
    }
    // One distribution per center; same std for all of them.
    let dists = centers
        .iter()
        .map(|&c| gaussian(c, std))
        .collect::<Result<Vec<_>>>()?;

    Ok((0..n)
        .map(|_| {
            let dist = &dists[rng.gen_range(0..dists.len())];
            clamped_gaussian(rng, dist, range)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn range(lo: Key, hi: Key) -> KeyRange {
        KeyRange::new(lo, hi).unwrap()
    }

    #[test]
    fn uniform_stays_in_range() {
        let keys = uniform(&mut rng(), 5000, range(-10, 10));
        assert_eq!(keys.len(), 5000);
        assert!(keys.iter().all(|k| (-10..=10).contains(k)));
        // 21 values, 5000 draws: every value should show up.
        let distinct: HashSet<_> = keys.iter().collect();
        assert_eq!(distinct.len(), 21);
    }

    #[test]
    fn uniform_handles_full_range() {
        let keys = uniform(&mut rng(), 100, KeyRange::full());
        assert_eq!(keys.len(), 100);
    }

    #[test]
    fn unique_uniform_is_distinct() {
        let keys = unique_uniform(&mut rng(), 500, range(0, 999)).unwrap();
        assert_eq!(keys.len(), 500);
        let distinct: HashSet<_> = keys.iter().collect();
        assert_eq!(distinct.len(), 500);
        assert!(keys.iter().all(|k| (0..=999).contains(k)));
    }

    #[test]
    fn unique_uniform_can_fill_the_range() {
        let mut keys = unique_uniform(&mut rng(), 64, range(100, 163)).unwrap();
        keys.sort_unstable();
        assert_eq!(keys, (100..=163).collect::<Vec<_>>());
    }

    #[test]
    fn unique_uniform_rejects_oversized_request() {
        let err = unique_uniform(&mut rng(), 5, range(0, 3)).unwrap_err();
        assert_eq!(
            err,
            KeyGenError::RangeExhausted {
                requested: 5,
                available: 4
            }
        );
    }

    #[test]
    fn normal_piles_up_at_bounds() {
        let keys = normal(&mut rng(), 2000, 0.0, 1000.0, range(-5, 5)).unwrap();
        assert!(keys.iter().all(|k| (-5..=5).contains(k)));
        let at_lo = keys.iter().filter(|&&k| k == -5).count();
        let at_hi = keys.iter().filter(|&&k| k == 5).count();
        assert!(at_lo > 500 && at_hi > 500, "lo={} hi={}", at_lo, at_hi);
    }

    #[test]
    fn normal_with_zero_std_is_constant() {
        let keys = normal(&mut rng(), 10, 42.0, 0.0, range(0, 100)).unwrap();
        assert!(keys.iter().all(|&k| k == 42));
    }

    #[test]
    fn normal_rejects_negative_std() {
        assert!(matches!(
            normal(&mut rng(), 1, 0.0, -1.0, range(0, 1)),
            Err(KeyGenError::InvalidConfig(_))
        ));
    }

    #[test]
    fn exponential_starts_at_lo() {
        let keys = exponential(&mut rng(), 1000, 1.0, range(1000, 2000)).unwrap();
        assert!(keys.iter().all(|k| (1000..=2000).contains(k)));
        // Mean of Exp(1) is 1, so most draws truncate to lo or lo + 1.
        let near_lo = keys.iter().filter(|&&k| k <= 1001).count();
        assert!(near_lo > 700, "near_lo={}", near_lo);
    }

    #[test]
    fn exponential_rejects_non_positive_rate() {
        assert!(exponential(&mut rng(), 1, 0.0, range(0, 1)).is_err());
        assert!(exponential(&mut rng(), 1, f64::NAN, range(0, 1)).is_err());
    }

    #[test]
    fn pareto_scale_follows_width() {
        assert_eq!(pareto_scale(range(0, 9)), 1.0);
        assert_eq!(pareto_scale(range(0, 999)), 50.0);
    }

    #[test]
    fn pareto_is_heavy_tailed_above_lo() {
        let keys = pareto(&mut rng(), 2000, 1.5, range(0, 9999)).unwrap();
        assert!(keys.iter().all(|k| (0..=9999).contains(k)));
        // Pareto(1, a) >= 1, so every key is at least lo + scale.
        assert!(keys.iter().all(|&k| k >= 500));
        assert!(keys.iter().any(|&k| k > 2000));
    }

    #[test]
    fn clusters_concentrate_around_centers() {
        let centers = [100.0, 5000.0];
        let keys = clusters(&mut rng(), 1000, &centers, 10.0, range(0, 10_000)).unwrap();
        assert_eq!(keys.len(), 1000);
        let near = keys
            .iter()
            .filter(|&&k| (k - 100).abs() <= 60 || (k - 5000).abs() <= 60)
            .count();
        assert_eq!(near, 1000);
    }

    #[test]
    fn clusters_require_centers() {
        assert!(matches!(
            clusters(&mut rng(), 10, &[], 1.0, range(0, 10)),
            Err(KeyGenError::InvalidConfig(_))
        ));
    }
}
