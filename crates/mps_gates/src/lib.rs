//! # mps_gates
//!
//! Gate-library collaborator. spec.md treats gate libraries as an
//! external source of "opaque tensor operators with declared edge
//! semantics" (out of the simulator core's scope), but the engine's
//! own test suites need concrete gates, so this crate supplies exactly
//! the set the original Python gate module did: `identity`,
//! `pauli_x/y/z`, `hadamard`, `s_gate`, `t_gate`, `cnot`, `swap`, a
//! seeded single-qubit Bloch-rotation gate, and a seeded random
//! two-qubit unitary.
//!
//! Every gate is returned as an [`mps_tensor::Tensor`] with the fixed
//! edge-role convention: rank-2 gates carry `[input, output]`; rank-4
//! gates carry `[input_a, input_b, output_a, output_b]`. Edge *ids* are
//! freshly allocated per call — callers connect a gate's input edge(s)
//! to site physical edges via `Tensor::rename_edge` before contracting.

use mps_core::physics::{
    bloch_rotation, CNOT, HADAMARD, IDENTITY, PAULI_X, PAULI_Y, PAULI_Z, S_GATE, SWAP, T_GATE,
};
use mps_core::{Matrix2x2, Matrix4x4, C64};
use mps_tensor::{fresh_edge_id, EdgeId, Tensor};
use nalgebra::DMatrix;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::f64::consts::TAU;

fn matrix2x2_to_tensor(m: Matrix2x2) -> Tensor {
    let input = fresh_edge_id();
    let output = fresh_edge_id();
    let mut data = ndarray::Array2::<C64>::zeros((2, 2));
    for i in 0..2 {
        for o in 0..2 {
            data[[i, o]] = m[o][i];
        }
    }
    Tensor::new(data.into_dyn(), vec![input, output]).expect("2x2 gate tensor has matching rank")
}

fn matrix4x4_to_tensor(m: Matrix4x4) -> Tensor {
    let (in_a, in_b, out_a, out_b) = (
        fresh_edge_id(),
        fresh_edge_id(),
        fresh_edge_id(),
        fresh_edge_id(),
    );
    let mut data = ndarray::Array4::<C64>::zeros((2, 2, 2, 2));
    for ia in 0..2 {
        for ib in 0..2 {
            for oa in 0..2 {
                for ob in 0..2 {
                    let row = oa * 2 + ob;
                    let col = ia * 2 + ib;
                    data[[ia, ib, oa, ob]] = m[row][col];
                }
            }
        }
    }
    Tensor::new(data.into_dyn(), vec![in_a, in_b, out_a, out_b])
        .expect("4x4 gate tensor has matching rank")
}

/// The identity gate, `[input, output]`.
pub fn identity() -> Tensor {
    matrix2x2_to_tensor(IDENTITY)
}

/// The Pauli-X (NOT) gate.
pub fn pauli_x() -> Tensor {
    matrix2x2_to_tensor(PAULI_X)
}

/// The Pauli-Y gate.
pub fn pauli_y() -> Tensor {
    matrix2x2_to_tensor(PAULI_Y)
}

/// The Pauli-Z gate.
pub fn pauli_z() -> Tensor {
    matrix2x2_to_tensor(PAULI_Z)
}

/// The Hadamard gate.
pub fn hadamard() -> Tensor {
    matrix2x2_to_tensor(HADAMARD)
}

/// The S (phase) gate.
pub fn s_gate() -> Tensor {
    matrix2x2_to_tensor(S_GATE)
}

/// The T (π/8) gate.
pub fn t_gate() -> Tensor {
    matrix2x2_to_tensor(T_GATE)
}

/// The CNOT gate, edges `[input_control, input_target, output_control, output_target]`.
pub fn cnot() -> Tensor {
    matrix4x4_to_tensor(CNOT)
}

/// The SWAP gate.
pub fn swap() -> Tensor {
    matrix4x4_to_tensor(SWAP)
}

/// A random single-qubit rotation gate, `exp(-iθ(mx·X + my·Y + mz·Z))`
/// for a uniformly sampled rotation axis and angle. `angle_scale`
/// multiplies the sampled `θ ∈ [0, 2π)` before building the unitary;
/// pass `1.0` to reproduce the angle distribution used upstream.
///
/// Unlike the module this gate is grounded on, this constructor never
/// silently drops `angle_scale` — every caller that wants a scaled
/// rotation passes it here, not to a constructor that ignores it.
pub fn random_single_qubit(seed: Option<u64>, angle_scale: f64) -> Tensor {
    let mut rng = seeded_rng(seed);
    let theta = rng.gen::<f64>() * TAU * angle_scale;
    let alpha = rng.gen::<f64>() * TAU;
    let phi = rng.gen::<f64>() * TAU;

    let mx = alpha.sin() * phi.cos();
    let my = alpha.sin() * phi.sin();
    let mz = alpha.cos();

    matrix2x2_to_tensor(bloch_rotation(theta, mx, my, mz))
}

/// A Haar-random two-qubit unitary gate, via QR decomposition of a
/// complex Ginibre random matrix with a diagonal phase correction
/// (the standard recipe for sampling uniformly from U(4)).
pub fn random_two_qubit(seed: Option<u64>) -> Tensor {
    let mut rng = seeded_rng(seed);
    let g = DMatrix::<C64>::from_fn(4, 4, |_, _| {
        C64::new(
            rng.sample::<f64, _>(StandardNormal),
            rng.sample::<f64, _>(StandardNormal),
        )
    });

    let qr = g.qr();
    let mut q = qr.q();
    let r = qr.r();
    for col in 0..4 {
        let phase = r[(col, col)];
        let norm = phase.norm();
        if norm > 1e-15 {
            let correction = phase / norm;
            for row in 0..4 {
                q[(row, col)] /= correction;
            }
        }
    }

    let mut m = [[C64::new(0.0, 0.0); 4]; 4];
    for row in 0..4 {
        for col in 0..4 {
            m[row][col] = q[(row, col)];
        }
    }
    matrix4x4_to_tensor(m)
}

fn seeded_rng(seed: Option<u64>) -> rand::rngs::StdRng {
    match seed {
        Some(s) => rand::rngs::StdRng::seed_from_u64(s),
        None => rand::rngs::StdRng::from_entropy(),
    }
}

/// Position of `edge` among a gate tensor's edges, purely for
/// readability at call sites (`input_of(&g, 0)` instead of a bare
/// index into [`mps_tensor::Tensor::edges`]).
pub fn edge_at(gate: &Tensor, position: usize) -> Option<EdgeId> {
    gate.edges().get(position).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mps_core::physics::is_unitary_2x2;

    fn as_matrix2x2(t: &Tensor) -> Matrix2x2 {
        let data = t.data();
        [
            [data[[0, 0]], data[[1, 0]]],
            [data[[0, 1]], data[[1, 1]]],
        ]
    }

    #[test]
    fn test_pauli_x_edges_and_shape() {
        let x = pauli_x();
        assert_eq!(x.rank(), 2);
        assert_eq!(x.shape(), &[2, 2]);
    }

    #[test]
    fn test_cnot_shape_and_arity() {
        let g = cnot();
        assert_eq!(g.rank(), 4);
        assert_eq!(g.shape(), &[2, 2, 2, 2]);
    }

    #[test]
    fn test_random_single_qubit_is_unitary() {
        let g = random_single_qubit(Some(42), 1.0);
        assert!(is_unitary_2x2(&as_matrix2x2(&g), 1e-9));
    }

    #[test]
    fn test_random_single_qubit_deterministic_for_seed() {
        let a = random_single_qubit(Some(7), 1.0);
        let b = random_single_qubit(Some(7), 1.0);
        assert_eq!(as_matrix2x2(&a), as_matrix2x2(&b));
    }

    #[test]
    fn test_random_two_qubit_is_unitary() {
        let g = random_two_qubit(Some(11));
        let data = g.data();
        // U^dagger U = I: check column norms and orthogonality directly
        // via the flattened 4x4 view implied by the edge convention.
        let mut m = [[C64::new(0.0, 0.0); 4]; 4];
        for ia in 0..2 {
            for ib in 0..2 {
                for oa in 0..2 {
                    for ob in 0..2 {
                        m[oa * 2 + ob][ia * 2 + ib] = data[[ia, ib, oa, ob]];
                    }
                }
            }
        }
        for c1 in 0..4 {
            for c2 in 0..4 {
                let mut dot = C64::new(0.0, 0.0);
                for r in 0..4 {
                    dot += m[r][c1].conj() * m[r][c2];
                }
                let expected = if c1 == c2 { 1.0 } else { 0.0 };
                assert!((dot.re - expected).abs() < 1e-8);
                assert!(dot.im.abs() < 1e-8);
            }
        }
    }
}
