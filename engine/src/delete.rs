//! Delete key selection.
//!
//! `shuffle_all` and `in_order` assume every inserted key is eventually
//! deleted, which suits exhaustive correctness runs. `random_subset` leaves
//! part of the structure populated to exercise mixed-state behaviour.

use crate::error::{invalid, KeyGenError, Result};
use crate::keys::Key;
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Every inserted key in random order
    #[default]
    ShuffleAll,
    /// Inserted keys in insertion order
    InOrder,
    /// Distinct positions of the insert sequence, shuffled
    RandomSubset,
}

impl DeletePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletePolicy::ShuffleAll => "shuffle_all",
            DeletePolicy::InOrder => "in_order",
            DeletePolicy::RandomSubset => "random_subset",
        }
    }
}

impl FromStr for DeletePolicy {
    type Err = KeyGenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "shuffle_all" => Ok(DeletePolicy::ShuffleAll),
            "in_order" => Ok(DeletePolicy::InOrder),
            "random_subset" => Ok(DeletePolicy::RandomSubset),
            other => Err(invalid(format!(
                "Unknown delete mode: {}. Use 'shuffle_all', 'in_order', or 'random_subset'",
                other
            ))),
        }
    }
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Derive the delete sequence from `insert`.
///
/// `n_delete` defaults to `insert.len()`. For `shuffle_all` and `in_order` a
/// larger request is capped at the insert length; `random_subset` rejects it.
pub fn select_delete_keys<R: Rng + ?Sized>(
    insert: &[Key],
    rng: &mut R,
    n_delete: Option<usize>,
    policy: DeletePolicy,
) -> Result<Vec<Key>> {
    let n = n_delete.unwrap_or(insert.len());

    let keys = match policy {
        DeletePolicy::ShuffleAll => {
            let mut keys = insert.to_vec();
            keys.shuffle(rng);
            keys.truncate(n);
            keys
        }
        DeletePolicy::InOrder => insert[..n.min(insert.len())].to_vec(),
        DeletePolicy::RandomSubset => {
            if n > insert.len() {
                return Err(invalid(format!(
                    "delete_mode=random_subset requires n_delete <= n_insert ({} > {})",
                    n,
                    insert.len()
                )));
            }
            let mut keys: Vec<Key> = index::sample(rng, insert.len(), n)
                .iter()
                .map(|i| insert[i])
                .collect();
            keys.shuffle(rng);
            keys
        }
    };

    tracing::debug!(policy = policy.as_str(), n = keys.len(), "selected delete keys");
    Ok(keys)
}
