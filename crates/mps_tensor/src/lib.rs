//! # mps_tensor
//!
//! Labeled-edge dense tensor primitive and SVD/truncation kernel that the
//! MPS chain (`mps_sim`) builds on. Two layers:
//!
//! - [`tensor`]: [`Tensor`], a dense array plus one [`tensor::EdgeId`] per
//!   axis, with `contract_between`/`flatten_edges_between` as the only
//!   ways two tensors interact.
//! - [`svd`]: [`svd::split`], the thin-SVD truncation kernel used to
//!   reassemble canonical form after a two-site gate.

pub mod svd;
pub mod tensor;

pub use svd::{diagonal_tensor, dropped_weight, split, structural_rank, SplitError, SplitResult};
pub use tensor::{contract_self_loop, fresh_edge_id, EdgeId, Tensor, TensorError};
