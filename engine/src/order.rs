//! Order transforms applied to an already sampled base sequence.

use crate::keys::Key;
use rand::Rng;

/// Ascending copy of `base`.
pub fn sorted(base: &[Key]) -> Vec<Key> {
    let mut out = base.to_vec();
    out.sort_unstable();
    out
}

/// Descending copy of `base`.
pub fn reverse_sorted(base: &[Key]) -> Vec<Key> {
    let mut out = base.to_vec();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out
}

/// Number of swaps applied by [`nearly_sorted`]: `swap_frac * n`, rounded
/// half-to-even.
pub fn swap_count(swap_frac: f64, n: usize) -> usize {
    let k = (swap_frac * n as f64).round_ties_even();
    if k > 0.0 {
        k as usize
    } else {
        0
    }
}

/// Sorted copy of `base` with `swap_count(swap_frac, n)` random index-pair
/// swaps. Indices are drawn independently, so a swap may be a no-op.
pub fn nearly_sorted<R: Rng + ?Sized>(rng: &mut R, base: &[Key], swap_frac: f64) -> Vec<Key> {
    let mut out = sorted(base);
    let n = out.len();
    let k = swap_count(swap_frac, n);
    if n <= 1 || k == 0 {
        return out;
    }
    for _ in 0..k {
        let i = rng.gen_range(0..n);
        let j = rng.gen_range(0..n);
        out.swap(i, j);
    }
    out
}
