//! SVD / truncation kernel (component C2).

use crate::tensor::{EdgeId, Tensor, TensorError};
use mps_core::C64;
use nalgebra::DMatrix;
use ndarray::IxDyn;
use thiserror::Error;

/// Errors raised by the SVD/truncation kernel.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error(transparent)]
    Tensor(#[from] TensorError),

    /// `left_edges`/`right_edges` did not exactly partition the input's edges.
    #[error("left/right edges do not partition the tensor's {rank} edges")]
    BadPartition { rank: usize },
}

type Result<T> = std::result::Result<T, SplitError>;

/// The result of [`split`]: a thin SVD `T = U · diag(S) · V†` of a
/// bipartitioned tensor, with `U` and `V†` each carrying a fresh bond
/// edge, plus the singular values that were discarded by `max_rank`.
pub struct SplitResult {
    /// Left factor; edges = `left_edges` followed by the new `u_bond` edge.
    pub u: Tensor,
    /// Singular values kept, in non-increasing order.
    pub s: Vec<f64>,
    /// Right factor; edges = the new `v_bond` edge followed by `right_edges`.
    pub vt: Tensor,
    /// Singular values dropped by `max_rank`, in non-increasing order.
    pub dropped: Vec<f64>,
}

/// Splits `t` into `U · diag(S) · V†` across the bipartition
/// `(left_edges, right_edges)`, which together must contain every edge
/// of `t` exactly once (order within each side is preserved).
///
/// `max_rank`, if given, caps the number of singular values kept; any
/// beyond the true rank of the reshaped matrix are reported in
/// [`SplitResult::dropped`]. Singular values are always returned in
/// non-increasing order; ties at the truncation boundary keep the
/// earlier-indexed value (the sort below is stable, and values are
/// compared by descending magnitude before relabeling by index, so an
/// exact tie preserves input order).
pub fn split(
    t: &Tensor,
    left_edges: &[EdgeId],
    right_edges: &[EdgeId],
    max_rank: Option<usize>,
    u_bond: EdgeId,
    v_bond: EdgeId,
) -> Result<SplitResult> {
    if left_edges.len() + right_edges.len() != t.rank()
        || !t
            .edges()
            .iter()
            .all(|e| left_edges.contains(e) ^ right_edges.contains(e))
    {
        return Err(SplitError::BadPartition { rank: t.rank() });
    }

    let order: Vec<usize> = left_edges
        .iter()
        .chain(right_edges.iter())
        .map(|e| t.position_of(*e).expect("edge validated by partition check"))
        .collect();
    let permuted = t.permuted(&order);

    let rows: usize = left_edges.iter().map(|e| t.dim_of(*e).unwrap()).product();
    let cols: usize = right_edges.iter().map(|e| t.dim_of(*e).unwrap()).product();
    let rows = rows.max(1);
    let cols = cols.max(1);

    let flat = permuted
        .data()
        .as_standard_layout()
        .to_owned()
        .into_shape((rows, cols))
        .expect("reshape into matrix for SVD");

    let mut m = DMatrix::<C64>::zeros(rows, cols);
    for r in 0..rows {
        for c in 0..cols {
            m[(r, c)] = flat[[r, c]];
        }
    }

    let svd = m.svd(true, true);
    let u_full = svd.u.expect("requested U from SVD");
    let vt_full = svd.v_t.expect("requested V^T from SVD");
    let sigma = svd.singular_values;

    let true_rank = sigma.len();
    let mut order: Vec<usize> = (0..true_rank).collect();
    order.sort_by(|&a, &b| sigma[b].partial_cmp(&sigma[a]).unwrap());

    let kept = max_rank.map(|r| r.min(true_rank)).unwrap_or(true_rank);

    let s_kept: Vec<f64> = order[..kept].iter().map(|&i| sigma[i]).collect();
    let dropped: Vec<f64> = order[kept..].iter().map(|&i| sigma[i]).collect();

    let mut u_data = ndarray::Array2::<C64>::zeros((rows, kept));
    for (col, &i) in order[..kept].iter().enumerate() {
        for row in 0..rows {
            u_data[[row, col]] = u_full[(row, i)];
        }
    }
    let mut vt_data = ndarray::Array2::<C64>::zeros((kept, cols));
    for (row, &i) in order[..kept].iter().enumerate() {
        for col in 0..cols {
            vt_data[[row, col]] = vt_full[(i, col)];
        }
    }

    let mut u_shape: Vec<usize> = left_edges.iter().map(|e| t.dim_of(*e).unwrap()).collect();
    u_shape.push(kept);
    let mut u_edges: Vec<EdgeId> = left_edges.to_vec();
    u_edges.push(u_bond);
    let u_tensor = Tensor::new(
        u_data.into_shape(IxDyn(&u_shape)).expect("reshape U"),
        u_edges,
    )?;

    let mut vt_shape: Vec<usize> = vec![kept];
    vt_shape.extend(right_edges.iter().map(|e| t.dim_of(*e).unwrap()));
    let mut vt_edges: Vec<EdgeId> = vec![v_bond];
    vt_edges.extend(right_edges.iter().copied());
    let vt_tensor = Tensor::new(
        vt_data.into_shape(IxDyn(&vt_shape)).expect("reshape V^T"),
        vt_edges,
    )?;

    Ok(SplitResult {
        u: u_tensor,
        s: s_kept,
        vt: vt_tensor,
        dropped,
    })
}

/// Builds the diagonal tensor `S` (edges `u_bond`, `v_bond`) from the
/// kept singular values, so it can be contracted into `U` or `V†` with
/// the same [`Tensor::contract_between`] machinery as any other step.
pub fn diagonal_tensor(values: &[f64], u_bond: EdgeId, v_bond: EdgeId) -> Tensor {
    let k = values.len();
    let mut data = ndarray::Array2::<C64>::zeros((k, k));
    for (i, &v) in values.iter().enumerate() {
        data[[i, i]] = C64::new(v, 0.0);
    }
    Tensor::new(data.into_dyn(), vec![u_bond, v_bond]).expect("diagonal tensor has matching rank")
}

/// Sum of squared magnitudes of `dropped` — the truncated weight /
/// infidelity contribution of a single split.
pub fn dropped_weight(dropped: &[f64]) -> f64 {
    dropped.iter().map(|s| s * s).sum()
}

/// Number of kept singular values still above `epsilon` times the
/// largest kept value. Per spec this never changes which values are
/// kept (that is `max_rank`'s job); it is purely a diagnostic count of
/// how many of the kept values are numerically non-structural-zero.
pub fn structural_rank(kept: &[f64], epsilon: f64) -> usize {
    match kept.first() {
        None => 0,
        Some(&largest) if largest <= 0.0 => 0,
        Some(&largest) => kept.iter().filter(|&&s| s >= epsilon * largest).count(),
    }
}
