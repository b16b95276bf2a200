//! Labeled-edge dense tensor primitive (component C1).
//!
//! A [`Tensor`] is a dense complex array plus one [`EdgeId`] per axis.
//! Edges are transient contraction instructions, not a persistent graph:
//! two tensors "share" an edge simply by carrying the same [`EdgeId`] on
//! one of their axes, and contraction consumes that id. There is no
//! back-reference from an edge to a node; callers identify axes purely
//! by the integer ids they were constructed with.

use mps_core::C64;
use ndarray::{ArrayD, IxDyn};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Identifies one axis of a [`Tensor`]. Two tensors share a bond by
/// carrying the same `EdgeId` on one of their respective axes.
pub type EdgeId = u64;

static NEXT_EDGE_ID: AtomicU64 = AtomicU64::new(0);

/// Allocates a fresh, globally unique [`EdgeId`].
///
/// Used whenever a new bond needs a name that cannot collide with any
/// other edge in flight (e.g. the merged edge produced by
/// [`Tensor::flatten_edges_between`]).
pub fn fresh_edge_id() -> EdgeId {
    NEXT_EDGE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Errors raised by the tensor primitive.
#[derive(Error, Debug)]
pub enum TensorError {
    /// The number of edge labels did not match the array's rank.
    #[error("tensor has rank {rank} but {num_edges} edge labels were given")]
    RankMismatch { rank: usize, num_edges: usize },

    /// An operation required a specific edge that the tensor does not carry.
    #[error("edge {0} not found on tensor")]
    EdgeNotFound(EdgeId),

    /// Shared edges between two tensors did not have matching dimensions.
    #[error("edge {edge} has dimension {dim_a} on one tensor and {dim_b} on the other")]
    DimensionMismatch {
        edge: EdgeId,
        dim_a: usize,
        dim_b: usize,
    },
}

type Result<T> = std::result::Result<T, TensorError>;

/// A dense complex tensor with one [`EdgeId`] per axis.
#[derive(Clone, Debug)]
pub struct Tensor {
    data: ArrayD<C64>,
    edges: Vec<EdgeId>,
}

impl Tensor {
    /// Constructs a tensor from a dense array and its edge labels.
    ///
    /// Fails if `edges.len()` does not equal the array's rank.
    pub fn new(data: ArrayD<C64>, edges: Vec<EdgeId>) -> Result<Self> {
        if data.ndim() != edges.len() {
            return Err(TensorError::RankMismatch {
                rank: data.ndim(),
                num_edges: edges.len(),
            });
        }
        Ok(Self { data, edges })
    }

    /// The tensor's rank (number of axes).
    pub fn rank(&self) -> usize {
        self.edges.len()
    }

    /// The edge labels, in axis order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// The dense array shape, in axis order.
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// A read-only view of the underlying dense array.
    pub fn data(&self) -> &ArrayD<C64> {
        &self.data
    }

    /// Consumes the tensor and returns its underlying dense array.
    pub fn into_data(self) -> ArrayD<C64> {
        self.data
    }

    /// Position of `edge` among this tensor's axes, if present.
    pub fn position_of(&self, edge: EdgeId) -> Option<usize> {
        self.edges.iter().position(|&e| e == edge)
    }

    /// Dimension of the given edge, if this tensor carries it.
    pub fn dim_of(&self, edge: EdgeId) -> Option<usize> {
        self.position_of(edge).map(|ax| self.data.shape()[ax])
    }

    /// Renames one of this tensor's edges in place. Used after a
    /// contraction to restore a caller-chosen identity for an axis that
    /// the generic contraction machinery relabeled.
    pub fn rename_edge(&mut self, old: EdgeId, new: EdgeId) -> Result<()> {
        let pos = self
            .position_of(old)
            .ok_or(TensorError::EdgeNotFound(old))?;
        self.edges[pos] = new;
        Ok(())
    }

    /// Reorders axes (and their edge labels) to match `order`, where
    /// `order[i]` is the current axis index that should become axis `i`.
    pub fn permuted(&self, order: &[usize]) -> Tensor {
        let data = self.data.clone().permuted_axes(IxDyn(order));
        let edges = order.iter().map(|&i| self.edges[i]).collect();
        Tensor { data, edges }
    }

    /// Merges the edges shared between `a` and `b` into a single edge
    /// (of dimension equal to the product of the merged edges') on
    /// each side, assigning it the given fresh id.
    ///
    /// Edges are merged in the order they first appear on `a`. If `a`
    /// and `b` share no edges this is a no-op that still relabels
    /// nothing (returns clones).
    pub fn flatten_edges_between(a: &Tensor, b: &Tensor, merged: EdgeId) -> Result<(Tensor, Tensor)> {
        let shared: Vec<EdgeId> = a
            .edges
            .iter()
            .copied()
            .filter(|e| b.edges.contains(e))
            .collect();

        if shared.len() <= 1 {
            return Ok((a.clone(), b.clone()));
        }

        for &e in &shared {
            let da = a.dim_of(e).ok_or(TensorError::EdgeNotFound(e))?;
            let db = b.dim_of(e).ok_or(TensorError::EdgeNotFound(e))?;
            if da != db {
                return Err(TensorError::DimensionMismatch {
                    edge: e,
                    dim_a: da,
                    dim_b: db,
                });
            }
        }

        let a_merged = merge_axes(a, &shared, merged);
        let b_merged = merge_axes(b, &shared, merged);
        Ok((a_merged, b_merged))
    }

    /// Contracts all edges shared between `a` and `b`, producing one
    /// tensor whose edges are `a`'s free edges (in their relative
    /// order) followed by `b`'s free edges (in their relative order).
    ///
    /// If `a` and `b` share no edges, the result is their outer
    /// product; the engine never relies on this path, but it is
    /// handled rather than rejected so the primitive stays total.
    pub fn contract_between(a: &Tensor, b: &Tensor) -> Result<Tensor> {
        let shared: Vec<EdgeId> = a
            .edges
            .iter()
            .copied()
            .filter(|e| b.edges.contains(e))
            .collect();

        if shared.is_empty() {
            return Ok(outer_product(a, b));
        }

        for &e in &shared {
            let da = a.dim_of(e).ok_or(TensorError::EdgeNotFound(e))?;
            let db = b.dim_of(e).ok_or(TensorError::EdgeNotFound(e))?;
            if da != db {
                return Err(TensorError::DimensionMismatch {
                    edge: e,
                    dim_a: da,
                    dim_b: db,
                });
            }
        }

        let a_free: Vec<EdgeId> = a.edges.iter().copied().filter(|e| !shared.contains(e)).collect();
        let b_free: Vec<EdgeId> = b.edges.iter().copied().filter(|e| !shared.contains(e)).collect();

        let a_order: Vec<usize> = a_free
            .iter()
            .chain(shared.iter())
            .map(|e| a.position_of(*e).unwrap())
            .collect();
        let b_order: Vec<usize> = shared
            .iter()
            .chain(b_free.iter())
            .map(|e| b.position_of(*e).unwrap())
            .collect();

        let a_perm = a.permuted(&a_order);
        let b_perm = b.permuted(&b_order);

        let a_free_dim: usize = a_free.iter().map(|e| a.dim_of(*e).unwrap()).product();
        let shared_dim: usize = shared.iter().map(|e| a.dim_of(*e).unwrap()).product();
        let b_free_dim: usize = b_free.iter().map(|e| b.dim_of(*e).unwrap()).product();

        let a_mat = a_perm
            .data
            .as_standard_layout()
            .to_owned()
            .into_shape((a_free_dim.max(1), shared_dim))
            .expect("contiguous reshape into matrix");
        let b_mat = b_perm
            .data
            .as_standard_layout()
            .to_owned()
            .into_shape((shared_dim, b_free_dim.max(1)))
            .expect("contiguous reshape into matrix");

        let product = a_mat.dot(&b_mat);

        let mut out_shape: Vec<usize> = a_free.iter().map(|e| a.dim_of(*e).unwrap()).collect();
        out_shape.extend(b_free.iter().map(|e| b.dim_of(*e).unwrap()));
        if out_shape.is_empty() {
            // Fully contracted to a scalar: ndarray still needs a 0-d shape.
            let scalar = product[[0, 0]];
            return Ok(Tensor {
                data: ArrayD::from_elem(IxDyn(&[]), scalar),
                edges: vec![],
            });
        }

        let data = product
            .into_shape(IxDyn(&out_shape))
            .expect("reshape contraction result");

        let mut edges = a_free;
        edges.extend(b_free);
        Ok(Tensor { data, edges })
    }
}

fn merge_axes(t: &Tensor, shared: &[EdgeId], merged_id: EdgeId) -> Tensor {
    let shared_positions: Vec<usize> = shared.iter().map(|e| t.position_of(*e).unwrap()).collect();
    let other_positions: Vec<usize> = (0..t.rank()).filter(|p| !shared_positions.contains(p)).collect();

    // Shared axes are moved to the end (in `shared` order), then flattened.
    let order: Vec<usize> = other_positions
        .iter()
        .copied()
        .chain(shared_positions.iter().copied())
        .collect();
    let permuted = t.permuted(&order);

    let other_dim: usize = other_positions.iter().map(|&p| t.data.shape()[p]).product();
    let shared_dim: usize = shared_positions.iter().map(|&p| t.data.shape()[p]).product();

    let mut new_shape: Vec<usize> = other_positions.iter().map(|&p| t.data.shape()[p]).collect();
    new_shape.push(shared_dim);
    let data = permuted
        .data
        .as_standard_layout()
        .to_owned()
        .into_shape(IxDyn(&new_shape))
        .unwrap_or_else(|_| panic!("reshape during edge flatten ({other_dim} x {shared_dim})"));

    let mut edges: Vec<EdgeId> = other_positions.iter().map(|&p| t.edges[p]).collect();
    edges.push(merged_id);
    Tensor { data, edges }
}

fn outer_product(a: &Tensor, b: &Tensor) -> Tensor {
    let a_len: usize = a.data.len();
    let b_len: usize = b.data.len();
    let a_flat = a.data.as_standard_layout().to_owned().into_shape((a_len, 1)).unwrap();
    let b_flat = b.data.as_standard_layout().to_owned().into_shape((1, b_len)).unwrap();
    let product = a_flat.dot(&b_flat);

    let mut shape: Vec<usize> = a.shape().to_vec();
    shape.extend(b.shape());
    let data = product
        .into_shape(IxDyn(&shape))
        .expect("reshape outer product");

    let mut edges = a.edges.clone();
    edges.extend(b.edges.iter().copied());
    Tensor { data, edges }
}

/// Sums axis `edge` against itself, for the self-loop case described in
/// spec component C1 (`contract(edge)` on a single tensor). Not used by
/// the gate-application engine, which only ever contracts *between*
/// distinct tensors, but kept for primitive completeness.
pub fn contract_self_loop(t: &Tensor, edge: EdgeId) -> Result<Tensor> {
    let positions: Vec<usize> = t
        .edges
        .iter()
        .enumerate()
        .filter(|(_, &e)| e == edge)
        .map(|(i, _)| i)
        .collect();
    if positions.len() != 2 {
        return Err(TensorError::EdgeNotFound(edge));
    }
    let (i, j) = (positions[0], positions[1]);
    let dim = t.data.shape()[i];
    if t.data.shape()[j] != dim {
        return Err(TensorError::DimensionMismatch {
            edge,
            dim_a: dim,
            dim_b: t.data.shape()[j],
        });
    }

    let keep: Vec<usize> = (0..t.rank()).filter(|&a| a != i && a != j).collect();
    let keep_dim: usize = keep.iter().map(|&a| t.data.shape()[a]).product();

    let order: Vec<usize> = keep.iter().copied().chain([i, j]).collect();
    let permuted = t.permuted(&order);
    let blocks = permuted
        .data
        .as_standard_layout()
        .to_owned()
        .into_shape((keep_dim.max(1), dim, dim))
        .expect("reshape for self-loop trace");

    let mut out = ndarray::Array1::<C64>::zeros(keep_dim.max(1));
    for (k, slot) in out.iter_mut().enumerate() {
        let mut sum = C64::new(0.0, 0.0);
        for d in 0..dim {
            sum += blocks[[k, d, d]];
        }
        *slot = sum;
    }

    let out_shape: Vec<usize> = keep.iter().map(|&a| t.data.shape()[a]).collect();
    let data = if out_shape.is_empty() {
        ArrayD::from_elem(IxDyn(&[]), out[0])
    } else {
        out.into_shape(IxDyn(&out_shape))
            .expect("reshape trace result")
    };
    let edges: Vec<EdgeId> = keep.iter().map(|&a| t.edges[a]).collect();
    Ok(Tensor { data, edges })
}
