//! Error types for the MPS simulator.

use thiserror::Error;

/// Unified error type for the MPS simulator.
///
/// Variants are grouped by the component that raises them; see
/// the error-handling table in the design notes for which condition
/// raises which variant.
#[derive(Error, Debug)]
pub enum MpsError {
    // ============ Construction / shape errors ============
    /// Chain or tensor construction parameters are not representable.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A gate tensor's rank/edge count does not match its declared arity.
    #[error("invalid gate shape: expected {expected} dangling edges, got {got}")]
    InvalidGateShape { expected: usize, got: usize },

    // ============ Indexing errors ============
    /// A target index is outside `[0, num_sites)`.
    #[error("index {index} out of range for chain of {num_sites} sites")]
    IndexOutOfRange { index: usize, num_sites: usize },

    /// Two-site gate or swap range supplied with the indices in the wrong order.
    #[error("invalid index order: expected {left} < {right}")]
    InvalidIndexOrder { left: usize, right: usize },

    /// A two-site gate targeted sites that are not adjacent and no router was used.
    #[error("sites {a} and {b} are not adjacent; route them first")]
    NonAdjacentSites { a: usize, b: usize },

    // ============ Option errors ============
    /// Both `max_svals` and `fraction` were supplied for the same call.
    #[error("conflicting truncation options: both an absolute cap and a fractional cap were given")]
    ConflictingOptions,

    /// An option value fell outside its valid domain.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    // ============ Chain-state errors ============
    /// The chain's §3 invariants do not hold for an operation that requires them.
    #[error("invalid chain: {0}")]
    InvalidChain(String),

    /// A numeric computation produced a result outside its expected tolerance.
    #[error("numeric error: {0}")]
    NumericError(String),

    // ============ Dispatch errors ============
    /// An operation's arity was neither 1 nor 2.
    #[error("unsupported arity {0}, only 1 and 2 are supported")]
    UnsupportedArity(usize),

    // ============ Serialization errors ============
    /// Config (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for MPS simulator operations.
pub type Result<T> = std::result::Result<T, MpsError>;

impl MpsError {
    /// Creates an [`MpsError::InvalidShape`] with the given message.
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidShape(msg.into())
    }

    /// Creates an [`MpsError::InvalidChain`] with the given message.
    pub fn invalid_chain(msg: impl Into<String>) -> Self {
        Self::InvalidChain(msg.into())
    }

    /// Creates an [`MpsError::NumericError`] with the given message.
    pub fn numeric(msg: impl Into<String>) -> Self {
        Self::NumericError(msg.into())
    }

    /// Creates an [`MpsError::InvalidOption`] with the given message.
    pub fn invalid_option(msg: impl Into<String>) -> Self {
        Self::InvalidOption(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MpsError::IndexOutOfRange {
            index: 5,
            num_sites: 3,
        };
        assert!(err.to_string().contains('5'));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_result_type() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(MpsError::invalid_shape("test error"))
        }

        assert!(returns_ok().is_ok());
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_invalid_index_order_display() {
        let err = MpsError::InvalidIndexOrder { left: 3, right: 1 };
        assert!(err.to_string().contains("3 < 1") || err.to_string().contains('<'));
    }

    #[test]
    fn test_conflicting_options_is_unit_variant() {
        let err = MpsError::ConflictingOptions;
        assert!(err.to_string().contains("conflicting"));
    }
}
