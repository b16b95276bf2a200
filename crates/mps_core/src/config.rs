//! Configuration for the MPS simulator.

use serde::{Deserialize, Serialize};

/// Numeric tolerances used by the MPS chain and its SVD/truncation kernel.
///
/// These replace the hard-coded constants of the original implementation
/// with overridable fields, following the same `Default`-plus-builder
/// shape as the rest of the workspace's config structs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MpsConfig {
    /// Singular values smaller than this fraction of the largest singular
    /// value in a split are treated as structural zeros when accounting
    /// for dropped weight. Does not affect which values are kept when a
    /// `max_rank` is given explicitly.
    pub svd_epsilon: f64,
    /// Maximum tolerated magnitude of the imaginary residual of
    /// `⟨ψ|ψ⟩` before [`norm`](../struct.Mps.html#method.norm) reports a
    /// `NumericError`.
    pub norm_imag_tolerance: f64,
}

impl Default for MpsConfig {
    fn default() -> Self {
        Self {
            svd_epsilon: 1e-12,
            norm_imag_tolerance: 1e-6,
        }
    }
}

impl MpsConfig {
    /// Creates a configuration with default tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with `svd_epsilon` overridden.
    pub fn with_svd_epsilon(mut self, svd_epsilon: f64) -> Self {
        self.svd_epsilon = svd_epsilon;
        self
    }

    /// Returns a copy with `norm_imag_tolerance` overridden.
    pub fn with_norm_imag_tolerance(mut self, tolerance: f64) -> Self {
        self.norm_imag_tolerance = tolerance;
        self
    }

    /// Loads a configuration from a JSON string.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Serializes this configuration to a pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }
}
