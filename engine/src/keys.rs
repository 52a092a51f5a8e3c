//! Key type, key ranges and clamping.
//!
//! Keys are 32-bit signed integers. A user-chosen `KeyRange` always lies inside
//! the representable range `[KEY_MIN_REPR, KEY_MAX_REPR]`. Arithmetic that can
//! leave the range (widths, offsets, distribution shifts) is carried out in
//! `i64` and brought back with [`clamp_key`].

use crate::error::KeyGenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A benchmark key
pub type Key = i32;

/// Smallest representable key
pub const KEY_MIN_REPR: Key = i32::MIN;

/// Largest representable key
pub const KEY_MAX_REPR: Key = i32::MAX;

/// Clamp a wide intermediate value into `[lo, hi]`.
#[inline]
pub fn clamp_key(x: i64, lo: Key, hi: Key) -> Key {
    debug_assert!(lo <= hi);
    x.clamp(lo as i64, hi as i64) as Key
}

/// Convert a float sample to the nearest integer, ties to even, saturating
/// at the `i64` bounds (NaN maps to 0).
#[inline]
pub(crate) fn round_to_i64(x: f64) -> i64 {
    x.round_ties_even() as i64
}

/// Inclusive key range `[lo, hi]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRange {
    lo: Key,
    hi: Key,
}

impl KeyRange {
    /// Create a range, rejecting `hi < lo`.
    pub fn new(lo: Key, hi: Key) -> Result<Self, KeyGenError> {
        if hi < lo {
            return Err(KeyGenError::InvalidConfig(format!(
                "key range is empty: key_min={} > key_max={}",
                lo, hi
            )));
        }
        Ok(Self { lo, hi })
    }

    /// The whole representable range
    pub fn full() -> Self {
        Self {
            lo: KEY_MIN_REPR,
            hi: KEY_MAX_REPR,
        }
    }

    pub fn lo(&self) -> Key {
        self.lo
    }

    pub fn hi(&self) -> Key {
        self.hi
    }

    /// Number of distinct keys in the range (`hi - lo + 1`, at most 2^32).
    pub fn width(&self) -> u64 {
        (self.hi as i64 - self.lo as i64 + 1) as u64
    }

    pub fn contains(&self, key: Key) -> bool {
        (self.lo..=self.hi).contains(&key)
    }

    #[inline]
    pub fn clamp(&self, x: i64) -> Key {
        clamp_key(x, self.lo, self.hi)
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.lo, self.hi)
    }
}
