//! Engine error type

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum KeyGenError {
    /// Structurally invalid parameters (bad names, empty ranges, out-of-range ratios, ...)
    InvalidConfig(String),
    /// A uniqueness requirement cannot be met by the population
    RangeExhausted { requested: u64, available: u64 },
    /// Offset miss generation ran out of retries under the strict fallback
    RetryBudgetExceeded { attempts: usize },
}

impl fmt::Display for KeyGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyGenError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            KeyGenError::RangeExhausted {
                requested,
                available,
            } => write!(
                f,
                "Range exhausted: need {} distinct keys but the range holds only {}",
                requested, available
            ),
            KeyGenError::RetryBudgetExceeded { attempts } => write!(
                f,
                "Retry budget exceeded: no non-member key found after {} attempts",
                attempts
            ),
        }
    }
}

impl std::error::Error for KeyGenError {}

/// Shorthand for engine results
pub type Result<T> = std::result::Result<T, KeyGenError>;

pub(crate) fn invalid(msg: impl Into<String>) -> KeyGenError {
    KeyGenError::InvalidConfig(msg.into())
}
