//! # mps_core
//!
//! Shared scalar type, error taxonomy and configuration for the MPS
//! (Matrix Product State) quantum circuit simulator.
//!
//! This crate provides:
//! - `C64`: the complex scalar type used throughout the workspace
//! - Standard gate matrices (Pauli, Clifford, rotation gates) as plain
//!   dense-matrix constants, consumed by `mps_gates` to build tensors
//! - `MpsError`: the unified error taxonomy
//! - `MpsConfig`: numeric tolerances for the chain and SVD kernel
//!
//! ## Example
//!
//! ```rust
//! use mps_core::prelude::*;
//!
//! let config = MpsConfig::default();
//! assert_eq!(config.svd_epsilon, 1e-12);
//! ```

pub mod config;
pub mod error;
pub mod physics;
pub mod prelude;

pub use config::MpsConfig;
pub use error::{MpsError, Result};
pub use physics::C64;
