//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust
//! use mps_core::prelude::*;
//! ```

pub use crate::config::MpsConfig;
pub use crate::error::{MpsError, Result};
pub use crate::physics::{Matrix2x2, Matrix4x4, C64};
